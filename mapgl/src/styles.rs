//! Well-known basemap styles.

/// Predefined Mapbox styles.
/// <https://docs.mapbox.com/api/maps/styles/#classic-mapbox-styles>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapboxStyle {
    #[default]
    Standard,
    StandardSatellite,
    Streets,
    Outdoors,
    Light,
    Dark,
    Satellite,
    SatelliteStreets,
    NavigationDay,
    NavigationNight,
}

impl MapboxStyle {
    fn api_slug(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::StandardSatellite => "standard-satellite",
            Self::Streets => "streets-v12",
            Self::Outdoors => "outdoors-v12",
            Self::Light => "light-v11",
            Self::Dark => "dark-v11",
            Self::Satellite => "satellite-v9",
            Self::SatelliteStreets => "satellite-streets-v12",
            Self::NavigationDay => "navigation-day-v1",
            Self::NavigationNight => "navigation-night-v1",
        }
    }

    pub fn url(self) -> String {
        format!("mapbox://styles/mapbox/{}", self.api_slug())
    }
}

/// Free CARTO basemaps, usable with MapLibre without a key.
/// <https://github.com/CartoDB/basemap-styles>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CartoStyle {
    #[default]
    Voyager,
    Positron,
    DarkMatter,
    VoyagerNoLabels,
    PositronNoLabels,
    DarkMatterNoLabels,
}

impl CartoStyle {
    fn slug(self) -> &'static str {
        match self {
            Self::Voyager => "voyager-gl-style",
            Self::Positron => "positron-gl-style",
            Self::DarkMatter => "dark-matter-gl-style",
            Self::VoyagerNoLabels => "voyager-nolabels-gl-style",
            Self::PositronNoLabels => "positron-nolabels-gl-style",
            Self::DarkMatterNoLabels => "dark-matter-nolabels-gl-style",
        }
    }

    pub fn url(self) -> String {
        format!("https://basemaps.cartocdn.com/gl/{}/style.json", self.slug())
    }
}

/// MapTiler hosted styles. Require an API key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaptilerStyle {
    #[default]
    Streets,
    Basic,
    Bright,
    Dataviz,
    Outdoor,
    Satellite,
    Topo,
    Winter,
}

impl MaptilerStyle {
    fn slug(self) -> &'static str {
        match self {
            Self::Streets => "streets-v2",
            Self::Basic => "basic-v2",
            Self::Bright => "bright-v2",
            Self::Dataviz => "dataviz",
            Self::Outdoor => "outdoor-v2",
            Self::Satellite => "hybrid",
            Self::Topo => "topo-v2",
            Self::Winter => "winter-v2",
        }
    }

    pub fn url(self, api_key: &str) -> String {
        format!(
            "https://api.maptiler.com/maps/{}/style.json?key={api_key}",
            self.slug()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapbox_style_urls() {
        assert_eq!(
            MapboxStyle::default().url(),
            "mapbox://styles/mapbox/standard"
        );
        assert_eq!(
            MapboxStyle::SatelliteStreets.url(),
            "mapbox://styles/mapbox/satellite-streets-v12"
        );
    }

    #[test]
    fn carto_and_maptiler_urls() {
        assert_eq!(
            CartoStyle::DarkMatter.url(),
            "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json"
        );
        assert_eq!(
            MaptilerStyle::Topo.url("abc"),
            "https://api.maptiler.com/maps/topo-v2/style.json?key=abc"
        );
    }
}
