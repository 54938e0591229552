use serde::Serialize;
use serde_json::{Map as JsonMap, Value, json};

use crate::Error;
use crate::camera::{CameraOptions, FitBounds, Terrain};
use crate::control::{Control, Orientation};
use crate::handle::{Flavor, Target};
use crate::layer::Layer;
use crate::legend::Legend;
use crate::lut::ColorTheme;
use crate::marker::Marker;
use crate::options::MapOptions;
use crate::source::Source;
use crate::turf::TurfRequest;

/// Configuration of a map which has not been rendered yet.
///
/// Everything added here is kept in typed form and serialized only by [`Map::into_payload`],
/// which produces the blob the rendering host instantiates the JavaScript library with. Use
/// [`Map::target`] to apply the same operations a [`crate::MapProxy`] accepts.
///
/// # Examples
///
/// ```
/// use mapgl::{Layer, Map, Source, GeoJsonData};
///
/// let mut map = Map::maplibre().with_center([17.03, 51.1]).with_zoom(10.0);
/// let mut target = map.target();
/// target.add_source("parks", Source::geojson(GeoJsonData::Url("parks.geojson".to_owned())))?;
/// target.add_layer(Layer::fill("parks", "parks").fill_color("green"))?;
///
/// let payload = map.into_payload()?;
/// assert_eq!(payload.name, "maplibregl");
/// # Ok::<(), mapgl::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub(crate) flavor: Flavor,
    pub options: MapOptions,
    pub(crate) sources: Vec<(String, Source)>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) controls: Vec<Control>,
    pub(crate) legends: Vec<Legend>,
    pub(crate) markers: Vec<Marker>,
    pub(crate) turf_operations: Vec<TurfRequest>,
    pub(crate) fit_bounds: Option<FitBounds>,
    pub(crate) terrain: Option<Terrain>,
    pub(crate) fog: Option<Value>,
    pub(crate) color_theme: Option<ColorTheme>,
    pub(crate) images: Vec<Value>,
    pub(crate) popup_options: Option<Value>,
    pub(crate) tooltip_options: Option<Value>,
}

impl Map {
    pub fn new(flavor: Flavor, options: MapOptions) -> Self {
        Self {
            flavor,
            options,
            sources: Vec::new(),
            layers: Vec::new(),
            controls: Vec::new(),
            legends: Vec::new(),
            markers: Vec::new(),
            turf_operations: Vec::new(),
            fit_bounds: None,
            terrain: None,
            fog: None,
            color_theme: None,
            images: Vec::new(),
            popup_options: None,
            tooltip_options: None,
        }
    }

    /// Map rendered by Mapbox GL JS. Needs an access token, see [`MapOptions::access_token`].
    pub fn mapbox() -> Self {
        Self::new(Flavor::Mapbox, MapOptions::default())
    }

    /// Map rendered by MapLibre GL JS.
    pub fn maplibre() -> Self {
        Self::new(Flavor::Maplibre, MapOptions::default())
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Apply operations to this configuration.
    pub fn target(&mut self) -> Target<'_> {
        Target::Unrendered(self)
    }

    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    /// Style URL, e.g. one of [`crate::styles`].
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.options.style = Some(Value::String(style.into()));
        self
    }

    pub fn with_center(mut self, center: [f64; 2]) -> Self {
        self.options.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.options.zoom = zoom;
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.options.bearing = bearing;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.options.pitch = pitch;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.options.projection = Some(projection.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.options.access_token = Some(token.into());
        self
    }

    /// CSS size of the widget, e.g. `100%` and `400px`.
    pub fn with_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.options.width = Some(width.into());
        self.options.height = Some(height.into());
        self
    }

    pub fn with_color_theme(mut self, theme: ColorTheme) -> Self {
        self.color_theme = Some(theme);
        self
    }

    /// Styling of popups, passed to the popup constructor of the JavaScript library.
    pub fn with_popup_options(mut self, options: Value) -> Self {
        self.popup_options = Some(options);
        self
    }

    pub fn with_tooltip_options(mut self, options: Value) -> Self {
        self.tooltip_options = Some(options);
        self
    }

    /// # Errors
    ///
    /// See [`Target::add_source`].
    pub fn with_source(mut self, id: &str, source: Source) -> Result<Self, Error> {
        self.target().add_source(id, source)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`Target::add_layer`].
    pub fn with_layer(mut self, layer: Layer) -> Result<Self, Error> {
        self.target().add_layer(layer)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`Target::add_control`].
    pub fn with_control(mut self, control: Control) -> Result<Self, Error> {
        self.target().add_control(control)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// See [`Target::add_legend`].
    pub fn with_legend(mut self, legend: Legend) -> Result<Self, Error> {
        self.target().add_legend(legend, true)?;
        Ok(self)
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.sources.iter().map(|(id, source)| (id.as_str(), source))
    }

    /// Layers from bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn turf_operations(&self) -> &[TurfRequest] {
        &self.turf_operations
    }

    pub(crate) fn insert_source(&mut self, id: String, source: Source) {
        if let Some((_, existing)) = self.sources.iter_mut().find(|(other, _)| *other == id) {
            log::warn!("Source '{id}' already exists, replacing it.");
            *existing = source;
        } else {
            self.sources.push((id, source));
        }
    }

    pub(crate) fn source_mut(&mut self, id: &str) -> Option<&mut Source> {
        self.sources
            .iter_mut()
            .find(|(other, _)| other == id)
            .map(|(_, source)| source)
    }

    /// Add a layer on top, or below its `before_id` if that layer is known.
    pub(crate) fn insert_layer(&mut self, layer: Layer) -> Result<(), Error> {
        if self.layer(&layer.id).is_some() {
            return Err(Error::InvalidArgument {
                argument: "id",
                reason: format!("layer '{}' already exists", layer.id),
            });
        }
        let index = layer
            .before_id
            .as_deref()
            .and_then(|before| self.layers.iter().position(|other| other.id == before));
        match index {
            Some(index) => self.layers.insert(index, layer),
            None => self.layers.push(layer),
        }
        Ok(())
    }

    pub(crate) fn layer_mut(&mut self, id: &str) -> Result<&mut Layer, Error> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| Error::UnknownLayer(id.to_owned()))
    }

    pub(crate) fn remove_layer(&mut self, id: &str) -> Result<Layer, Error> {
        let index = self
            .layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| Error::UnknownLayer(id.to_owned()))?;
        Ok(self.layers.remove(index))
    }

    /// Camera moves before rendering simply become the initial camera.
    pub(crate) fn apply_camera(&mut self, camera: &CameraOptions) {
        let options = &mut self.options;
        if let Some(center) = camera.center {
            options.center = center;
        }
        if let Some(zoom) = camera.zoom {
            options.zoom = zoom;
        }
        if let Some(bearing) = camera.bearing {
            options.bearing = bearing;
        }
        if let Some(pitch) = camera.pitch {
            options.pitch = pitch;
        }
    }

    fn options_value(&self) -> Result<JsonMap<String, Value>, Error> {
        let options = &self.options;
        let mut x = JsonMap::new();
        x.insert("style".to_owned(), options.style_or_default(self.flavor));
        x.insert("center".to_owned(), json!(options.center));
        x.insert("zoom".to_owned(), json!(options.zoom));
        x.insert("bearing".to_owned(), json!(options.bearing));
        x.insert("pitch".to_owned(), json!(options.pitch));
        x.insert("hash".to_owned(), json!(options.hash));
        x.insert(
            "attributionControl".to_owned(),
            json!(options.attribution_control),
        );
        if let Some(projection) = &options.projection {
            x.insert("projection".to_owned(), json!(projection));
        }
        if self.flavor == Flavor::Mapbox {
            let token = options
                .resolve_access_token()
                .ok_or(Error::MissingAccessToken)?;
            x.insert("access_token".to_owned(), json!(token));
        }
        for (key, value) in &options.extra {
            x.insert(key.clone(), value.clone());
        }
        Ok(x)
    }

    fn into_value(self) -> Result<Value, Error> {
        let mut x = self.options_value()?;

        let sources = self
            .sources
            .iter()
            .map(|(id, source)| serde_json::to_value(NamedSource { id, source }))
            .collect::<Result<Vec<_>, _>>()?;
        insert_list(&mut x, "sources", sources);
        insert_list(&mut x, "layers", to_values(&self.layers)?);
        insert_list(&mut x, "controls", to_values(&self.controls)?);
        insert_list(&mut x, "legends", to_values(&self.legends)?);
        insert_list(&mut x, "markers", to_values(&self.markers)?);
        insert_list(&mut x, "turf_operations", to_values(&self.turf_operations)?);
        insert_list(&mut x, "images", self.images);

        if let Some(fit_bounds) = self.fit_bounds {
            x.insert("fitBounds".to_owned(), serde_json::to_value(fit_bounds)?);
        }
        if let Some(terrain) = self.terrain {
            x.insert("terrain".to_owned(), serde_json::to_value(terrain)?);
        }
        if let Some(fog) = self.fog {
            x.insert("fog".to_owned(), fog);
        }
        if let Some(theme) = self.color_theme {
            x.insert("color_theme".to_owned(), serde_json::to_value(theme)?);
        }
        if let Some(popup_options) = self.popup_options {
            x.insert("popup_options".to_owned(), popup_options);
        }
        if let Some(tooltip_options) = self.tooltip_options {
            x.insert("tooltip_options".to_owned(), tooltip_options);
        }
        Ok(Value::Object(x))
    }

    /// Consume the configuration and produce what the rendering host needs to instantiate it.
    ///
    /// # Errors
    ///
    /// Fails for a Mapbox map without an access token, or if something does not serialize.
    pub fn into_payload(self) -> Result<WidgetPayload, Error> {
        let name = self.flavor.widget_name();
        let width = self.options.width.clone();
        let height = self.options.height.clone();
        log::debug!(
            "Rendering {name} with {} sources and {} layers.",
            self.sources.len(),
            self.layers.len()
        );
        Ok(WidgetPayload {
            name,
            x: self.into_value()?,
            width,
            height,
        })
    }
}

#[derive(Serialize)]
struct NamedSource<'a> {
    id: &'a str,
    #[serde(flatten)]
    source: &'a Source,
}

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>, Error> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Error::from))
        .collect()
}

fn insert_list(x: &mut JsonMap<String, Value>, key: &str, values: Vec<Value>) {
    if !values.is_empty() {
        x.insert(key.to_owned(), Value::Array(values));
    }
}

/// Blob handed to the rendering host: the widget to instantiate and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetPayload {
    pub name: &'static str,
    pub x: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// A slider reveals one map over the other.
    #[default]
    Swipe,
    /// Maps are shown side by side with synchronized cameras.
    Sync,
}

/// Two maps compared with a swipe slider or side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    before: Map,
    after: Map,
    mode: CompareMode,
    orientation: Orientation,
    swiper_color: Option<String>,
}

impl Compare {
    /// # Errors
    ///
    /// Fails if the maps are rendered by different libraries.
    pub fn new(before: Map, after: Map) -> Result<Self, Error> {
        if before.flavor != after.flavor {
            return Err(Error::InvalidArgument {
                argument: "after",
                reason: "both maps must use the same library".to_owned(),
            });
        }
        Ok(Self {
            before,
            after,
            mode: CompareMode::default(),
            orientation: Orientation::Vertical,
            swiper_color: None,
        })
    }

    pub fn with_mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_swiper_color(mut self, color: impl Into<String>) -> Self {
        self.swiper_color = Some(color.into());
        self
    }

    /// # Errors
    ///
    /// See [`Map::into_payload`].
    pub fn into_payload(self) -> Result<WidgetPayload, Error> {
        let name = self.before.flavor.compare_widget_name();
        let width = self.before.options.width.clone();
        let height = self.before.options.height.clone();
        let mut x = json!({
            "map1": self.before.into_value()?,
            "map2": self.after.into_value()?,
            "mode": self.mode,
            "orientation": self.orientation,
        });
        if let Some(color) = self.swiper_color {
            x["swiper_color"] = json!(color);
        }
        Ok(WidgetPayload {
            name,
            x,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::GeoJsonData;

    fn parks() -> Source {
        Source::geojson(GeoJsonData::Url("parks.geojson".to_owned()))
    }

    #[test]
    fn maplibre_payload() {
        let map = Map::maplibre()
            .with_center([17.03, 51.1])
            .with_zoom(10.0)
            .with_source("parks", parks())
            .unwrap()
            .with_layer(Layer::fill("parks", "parks").fill_color("green"))
            .unwrap();

        let payload = map.into_payload().unwrap();
        assert_eq!(payload.name, "maplibregl");
        assert_eq!(payload.x["center"], json!([17.03, 51.1]));
        assert_eq!(payload.x["sources"][0]["id"], "parks");
        assert_eq!(payload.x["sources"][0]["type"], "geojson");
        assert_eq!(payload.x["layers"][0]["paint"]["fill-color"], "green");
        assert!(payload.x.get("access_token").is_none());
        assert!(payload.x.get("markers").is_none());
    }

    #[test]
    fn mapbox_payload_carries_token() {
        let payload = Map::mapbox()
            .with_access_token("pk.test")
            .into_payload()
            .unwrap();
        assert_eq!(payload.name, "mapboxgl");
        assert_eq!(payload.x["access_token"], "pk.test");
        assert_eq!(payload.x["style"], "mapbox://styles/mapbox/standard");
    }

    #[test]
    fn layers_are_ordered_by_before_id() {
        let mut map = Map::maplibre();
        let mut target = map.target();
        target.add_layer(Layer::fill("water", "src")).unwrap();
        target.add_layer(Layer::line("roads", "src")).unwrap();
        target
            .add_layer(Layer::fill("parks", "src").before("roads"))
            .unwrap();
        target.move_layer("water", None).unwrap();

        let ids: Vec<_> = map.layers().iter().map(|layer| layer.id.as_str()).collect();
        assert_eq!(ids, ["parks", "roads", "water"]);
    }

    #[test]
    fn unknown_layers_are_reported() {
        let mut map = Map::maplibre();
        let mut target = map.target();
        assert!(matches!(
            target.set_filter("nope", json!(["==", "a", 1])),
            Err(Error::UnknownLayer(id)) if id == "nope"
        ));
        assert!(matches!(
            target.remove_layer("nope"),
            Err(Error::UnknownLayer(_))
        ));
    }

    #[test]
    fn duplicate_layer_is_rejected() {
        let mut map = Map::maplibre();
        let mut target = map.target();
        target.add_layer(Layer::fill("water", "src")).unwrap();
        assert!(target.add_layer(Layer::fill("water", "src")).is_err());
    }

    #[test]
    fn paint_property_must_match_layer() {
        let mut map = Map::maplibre();
        let mut target = map.target();
        target.add_layer(Layer::circle("points", "src")).unwrap();
        target
            .set_paint_property("points", "circle-radius", json!(4))
            .unwrap();
        assert!(matches!(
            target.set_paint_property("points", "fill-color", json!("red")),
            Err(Error::PropertyMismatch { .. })
        ));
        assert_eq!(map.layer("points").unwrap().paint["circle-radius"], 4);
    }

    #[test]
    fn compare_requires_same_flavor() {
        assert!(Compare::new(Map::maplibre(), Map::mapbox()).is_err());

        let payload = Compare::new(Map::maplibre(), Map::maplibre().with_zoom(3.0))
            .unwrap()
            .with_mode(CompareMode::Sync)
            .into_payload()
            .unwrap();
        assert_eq!(payload.name, "maplibre_compare");
        assert_eq!(payload.x["mode"], "sync");
        assert_eq!(payload.x["map2"]["zoom"], 3.0);
    }
}
