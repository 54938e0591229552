//! Data sources referenced by layers.
//! <https://docs.mapbox.com/style-spec/reference/sources/>

use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::geojson::{Feature, FeatureCollection};
use crate::handle::Target;
use crate::message::Message;

/// GeoJSON payload of a source: a URL or inline data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoJsonData {
    Url(String),
    Inline(Value),
}

impl From<&FeatureCollection> for GeoJsonData {
    fn from(collection: &FeatureCollection) -> Self {
        Self::Inline(collection.to_value())
    }
}

impl From<Vec<Feature>> for GeoJsonData {
    fn from(features: Vec<Feature>) -> Self {
        Self::from(&features.into_iter().collect::<FeatureCollection>())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemEncoding {
    Mapbox,
    Terrarium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    Geojson {
        data: GeoJsonData,
        generate_id: bool,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        cluster: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster_radius: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cluster_max_zoom: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        promote_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Vector {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tiles: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        promote_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        minzoom: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        maxzoom: Option<u8>,
    },
    #[serde(rename_all = "camelCase")]
    Raster {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tiles: Option<Vec<String>>,
        tile_size: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        minzoom: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        maxzoom: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RasterDem {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tiles: Option<Vec<String>>,
        tile_size: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        maxzoom: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        encoding: Option<DemEncoding>,
    },
    Image {
        url: String,
        coordinates: [[f64; 2]; 4],
    },
    Video {
        urls: Vec<String>,
        coordinates: [[f64; 2]; 4],
    },
}

/// Tiles come either from a TileJSON `url` or from a list of tile URL templates.
fn url_or_tiles(
    operation: &'static str,
    url: Option<String>,
    tiles: Option<Vec<String>>,
) -> Result<(Option<String>, Option<Vec<String>>), Error> {
    match (&url, &tiles) {
        (Some(_), None) | (None, Some(_)) => Ok((url, tiles)),
        _ => Err(Error::ExclusiveArguments {
            operation,
            arguments: &["url", "tiles"],
        }),
    }
}

impl Source {
    pub fn geojson(data: impl Into<GeoJsonData>) -> Self {
        Self::Geojson {
            data: data.into(),
            generate_id: true,
            cluster: false,
            cluster_radius: None,
            cluster_max_zoom: None,
            promote_id: None,
        }
    }

    /// GeoJSON source with point clustering enabled.
    pub fn clustered_geojson(data: impl Into<GeoJsonData>, radius: u32, max_zoom: u8) -> Self {
        Self::Geojson {
            data: data.into(),
            generate_id: true,
            cluster: true,
            cluster_radius: Some(radius),
            cluster_max_zoom: Some(max_zoom),
            promote_id: None,
        }
    }

    /// # Errors
    ///
    /// Fails unless exactly one of `url` and `tiles` is given.
    pub fn vector(url: Option<String>, tiles: Option<Vec<String>>) -> Result<Self, Error> {
        let (url, tiles) = url_or_tiles("vector source", url, tiles)?;
        Ok(Self::Vector {
            url,
            tiles,
            promote_id: None,
            minzoom: None,
            maxzoom: None,
        })
    }

    /// # Errors
    ///
    /// Fails unless exactly one of `url` and `tiles` is given.
    pub fn raster(
        url: Option<String>,
        tiles: Option<Vec<String>>,
        tile_size: u32,
    ) -> Result<Self, Error> {
        let (url, tiles) = url_or_tiles("raster source", url, tiles)?;
        Ok(Self::Raster {
            url,
            tiles,
            tile_size,
            minzoom: None,
            maxzoom: None,
            attribution: None,
        })
    }

    /// Elevation data for terrain and hillshading.
    ///
    /// # Errors
    ///
    /// Fails unless exactly one of `url` and `tiles` is given.
    pub fn raster_dem(
        url: Option<String>,
        tiles: Option<Vec<String>>,
        tile_size: u32,
    ) -> Result<Self, Error> {
        let (url, tiles) = url_or_tiles("raster-dem source", url, tiles)?;
        Ok(Self::RasterDem {
            url,
            tiles,
            tile_size,
            maxzoom: None,
            encoding: None,
        })
    }

    /// Image stretched over four corners, clockwise from the top left.
    pub fn image(url: impl Into<String>, coordinates: [[f64; 2]; 4]) -> Self {
        Self::Image {
            url: url.into(),
            coordinates,
        }
    }

    /// # Errors
    ///
    /// Fails if no URL is given.
    pub fn video(urls: Vec<String>, coordinates: [[f64; 2]; 4]) -> Result<Self, Error> {
        if urls.is_empty() {
            return Err(Error::MissingIdentifier("urls"));
        }
        Ok(Self::Video { urls, coordinates })
    }

    /// Use a feature property as the feature id, for vector and GeoJSON sources.
    pub fn with_promote_id(mut self, id: impl Into<String>) -> Self {
        match &mut self {
            Self::Geojson { promote_id, .. } | Self::Vector { promote_id, .. } => {
                *promote_id = Some(id.into());
            }
            _ => log::warn!("promoteId is only supported by vector and GeoJSON sources."),
        }
        self
    }
}

impl Target<'_> {
    /// # Errors
    ///
    /// Fails if `id` is empty, or if the session refuses the message.
    pub fn add_source(&mut self, id: &str, source: Source) -> Result<(), Error> {
        if id.is_empty() {
            return Err(Error::MissingIdentifier("id"));
        }
        match self {
            Self::Unrendered(map) => {
                map.insert_source(id.to_owned(), source);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddSource {
                id: id.to_owned(),
                source,
            }),
        }
    }

    /// Replace the data of a GeoJSON source.
    ///
    /// # Errors
    ///
    /// Fails if the source is unknown or not GeoJSON (unrendered maps only), or if the session
    /// refuses the message.
    pub fn set_source(&mut self, id: &str, data: GeoJsonData) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => match map.source_mut(id) {
                Some(Source::Geojson { data: current, .. }) => {
                    *current = data;
                    Ok(())
                }
                _ => Err(Error::InvalidArgument {
                    argument: "id",
                    reason: format!("'{id}' is not a GeoJSON source of this map"),
                }),
            },
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetSource {
                source: id.to_owned(),
                data: serde_json::to_value(data)?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vector_source_needs_url_or_tiles() {
        assert!(matches!(
            Source::vector(None, None),
            Err(Error::ExclusiveArguments { .. })
        ));
        assert!(matches!(
            Source::vector(Some("a".to_owned()), Some(vec!["b".to_owned()])),
            Err(Error::ExclusiveArguments { .. })
        ));

        let source = Source::vector(Some("mapbox://mapbox.mapbox-streets-v8".to_owned()), None)
            .unwrap()
            .with_promote_id("osm_id");
        assert_eq!(
            serde_json::to_value(source).unwrap(),
            json!({
                "type": "vector",
                "url": "mapbox://mapbox.mapbox-streets-v8",
                "promoteId": "osm_id",
            })
        );
    }

    #[test]
    fn raster_dem_serialization() {
        let source = Source::raster_dem(
            Some("mapbox://mapbox.mapbox-terrain-dem-v1".to_owned()),
            None,
            512,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(source).unwrap(),
            json!({
                "type": "raster-dem",
                "url": "mapbox://mapbox.mapbox-terrain-dem-v1",
                "tileSize": 512,
            })
        );
    }

    #[test]
    fn clustered_geojson_serialization() {
        let source = Source::clustered_geojson(
            GeoJsonData::Url("https://example.com/points.geojson".to_owned()),
            50,
            14,
        );
        assert_eq!(
            serde_json::to_value(source).unwrap(),
            json!({
                "type": "geojson",
                "data": "https://example.com/points.geojson",
                "generateId": true,
                "cluster": true,
                "clusterRadius": 50,
                "clusterMaxZoom": 14,
            })
        );
    }

    #[test]
    fn video_needs_urls() {
        assert!(Source::video(Vec::new(), [[0.0; 2]; 4]).is_err());
    }
}
