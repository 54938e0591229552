//! Style layers.
//! <https://docs.mapbox.com/style-spec/reference/layers/>

use serde::Serialize;
use serde_json::{Map as JsonMap, Value, json};

use crate::Error;
use crate::handle::Target;
use crate::message::Message;
use crate::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Fill,
    Line,
    Circle,
    Symbol,
    Heatmap,
    FillExtrusion,
    Raster,
    Hillshade,
    Background,
    Sky,
    Model,
}

impl LayerType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Symbol => "symbol",
            Self::Heatmap => "heatmap",
            Self::FillExtrusion => "fill-extrusion",
            Self::Raster => "raster",
            Self::Hillshade => "hillshade",
            Self::Background => "background",
            Self::Sky => "sky",
            Self::Model => "model",
        }
    }

    fn property_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Fill => &["fill-"],
            Self::Line => &["line-"],
            Self::Circle => &["circle-"],
            Self::Symbol => &["symbol-", "icon-", "text-"],
            Self::Heatmap => &["heatmap-"],
            Self::FillExtrusion => &["fill-extrusion-"],
            Self::Raster => &["raster-"],
            Self::Hillshade => &["hillshade-"],
            Self::Background => &["background-"],
            Self::Sky => &["sky-"],
            Self::Model => &["model-"],
        }
    }

    /// Whether a paint or layout property belongs to this layer type.
    pub fn accepts(self, property: &str) -> bool {
        if property == "visibility" {
            return true;
        }
        if self == Self::Fill && property.starts_with("fill-extrusion-") {
            return false;
        }
        self.property_prefixes()
            .iter()
            .any(|prefix| property.starts_with(prefix))
    }

    fn needs_source(self) -> bool {
        !matches!(self, Self::Background | Self::Sky)
    }
}

/// Source of a layer: the id of a source added to the map, or a source defined inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceRef {
    Id(String),
    Inline(Source),
}

impl From<&str> for SourceRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<String> for SourceRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Source> for SourceRef {
    fn from(source: Source) -> Self {
        Self::Inline(source)
    }
}

/// A style layer, plus the interactivity the browser runtime adds on top of it (popups,
/// tooltips and hover effects).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(rename = "source-layer", skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub paint: JsonMap<String, Value>,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub layout: JsonMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    /// Mapbox Standard slot the layer is placed in, e.g. `middle`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    /// Column (or expression) shown in a popup on click.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
    /// Column (or expression) shown in a tooltip on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Paint properties applied while a feature is hovered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover_options: Option<JsonMap<String, Value>>,
    /// Styling of cluster circles and counts for clustered GeoJSON sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_options: Option<ClusterOptions>,
}

/// How clusters of a clustered GeoJSON source are drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterOptions {
    pub max_zoom: u8,
    pub radius: u32,
    /// Colors of the cluster circles, one more than there are `color_stops`.
    pub colors: Vec<String>,
    pub color_stops: Vec<f64>,
    /// Circle radii, one more than there are `radius_stops`.
    pub radius_values: Vec<f64>,
    pub radius_stops: Vec<f64>,
    pub count_label: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_zoom: 14,
            radius: 50,
            colors: vec!["#51bbd6".to_owned(), "#f1f075".to_owned(), "#f28cb1".to_owned()],
            color_stops: vec![100.0, 750.0],
            radius_values: vec![20.0, 30.0, 40.0],
            radius_stops: vec![100.0, 750.0],
            count_label: true,
        }
    }
}

impl Layer {
    pub fn new(id: impl Into<String>, kind: LayerType) -> Self {
        Self {
            id: id.into(),
            kind,
            source: None,
            source_layer: None,
            paint: JsonMap::new(),
            layout: JsonMap::new(),
            filter: None,
            minzoom: None,
            maxzoom: None,
            slot: None,
            before_id: None,
            popup: None,
            tooltip: None,
            hover_options: None,
            cluster_options: None,
        }
    }

    fn with_source(id: impl Into<String>, kind: LayerType, source: impl Into<SourceRef>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(id, kind)
        }
    }

    pub fn fill(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Fill, source)
    }

    pub fn line(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Line, source)
    }

    pub fn circle(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Circle, source)
    }

    pub fn symbol(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Symbol, source)
    }

    pub fn heatmap(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Heatmap, source)
    }

    pub fn fill_extrusion(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::FillExtrusion, source)
    }

    pub fn raster(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Raster, source)
    }

    pub fn hillshade(id: impl Into<String>, source: impl Into<SourceRef>) -> Self {
        Self::with_source(id, LayerType::Hillshade, source)
    }

    pub fn background(id: impl Into<String>) -> Self {
        Self::new(id, LayerType::Background)
    }

    pub fn sky(id: impl Into<String>) -> Self {
        Self::new(id, LayerType::Sky)
    }

    /// Set any paint property, keeping its style-spec name, e.g. `fill-color`.
    pub fn paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_owned(), value.into());
        self
    }

    /// Set any layout property, keeping its style-spec name, e.g. `line-cap`.
    pub fn layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_owned(), value.into());
        self
    }

    pub fn source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn zoom_range(mut self, minzoom: f64, maxzoom: f64) -> Self {
        self.minzoom = Some(minzoom);
        self.maxzoom = Some(maxzoom);
        self
    }

    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Insert the layer below `layer_id` instead of on top.
    pub fn before(mut self, layer_id: impl Into<String>) -> Self {
        self.before_id = Some(layer_id.into());
        self
    }

    pub fn popup(mut self, column: impl Into<String>) -> Self {
        self.popup = Some(column.into());
        self
    }

    pub fn tooltip(mut self, column: impl Into<String>) -> Self {
        self.tooltip = Some(column.into());
        self
    }

    pub fn hover(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.hover_options
            .get_or_insert_with(JsonMap::new)
            .insert(name.to_owned(), value.into());
        self
    }

    /// Draw the layer's points as clusters.
    pub fn cluster(mut self, options: ClusterOptions) -> Self {
        self.cluster_options = Some(options);
        self
    }

    pub fn visible(self, visible: bool) -> Self {
        self.layout("visibility", if visible { "visible" } else { "none" })
    }

    /// Check the layer before it is handed to the map.
    ///
    /// # Errors
    ///
    /// Fails for a missing id or source, properties of another layer type, or an inverted zoom
    /// range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::MissingIdentifier("id"));
        }
        if self.kind.needs_source() && self.source.is_none() {
            return Err(Error::MissingIdentifier("source"));
        }
        for property in self.paint.keys().chain(self.layout.keys()) {
            check_property(self.kind, property)?;
        }
        if let Some(cluster) = &self.cluster_options {
            if cluster.colors.len() != cluster.color_stops.len() + 1
                || cluster.radius_values.len() != cluster.radius_stops.len() + 1
            {
                return Err(Error::InvalidArgument {
                    argument: "cluster_options",
                    reason: "expected one more color and radius than there are stops".to_owned(),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.minzoom, self.maxzoom) {
            if min > max {
                return Err(Error::InvalidArgument {
                    argument: "minzoom",
                    reason: format!("minzoom {min} is above maxzoom {max}"),
                });
            }
        }
        Ok(())
    }
}

fn check_property(kind: LayerType, property: &str) -> Result<(), Error> {
    if kind.accepts(property) {
        Ok(())
    } else {
        Err(Error::PropertyMismatch {
            layer_type: kind.name(),
            property: property.to_owned(),
        })
    }
}

/// Shorthands for the most common properties.
macro_rules! properties {
    ($group:ident { $($method:ident => $name:literal),* $(,)? }) => {
        impl Layer {
            $(
                #[doc = concat!("Set `", $name, "`.")]
                pub fn $method(self, value: impl Into<Value>) -> Self {
                    self.$group($name, value)
                }
            )*
        }
    };
}

properties!(paint {
    fill_color => "fill-color",
    fill_opacity => "fill-opacity",
    fill_outline_color => "fill-outline-color",
    fill_pattern => "fill-pattern",
    fill_antialias => "fill-antialias",
    fill_emissive_strength => "fill-emissive-strength",
    line_color => "line-color",
    line_width => "line-width",
    line_opacity => "line-opacity",
    line_dasharray => "line-dasharray",
    line_blur => "line-blur",
    line_gap_width => "line-gap-width",
    line_offset => "line-offset",
    circle_color => "circle-color",
    circle_radius => "circle-radius",
    circle_opacity => "circle-opacity",
    circle_blur => "circle-blur",
    circle_stroke_color => "circle-stroke-color",
    circle_stroke_width => "circle-stroke-width",
    heatmap_color => "heatmap-color",
    heatmap_intensity => "heatmap-intensity",
    heatmap_radius => "heatmap-radius",
    heatmap_weight => "heatmap-weight",
    heatmap_opacity => "heatmap-opacity",
    fill_extrusion_color => "fill-extrusion-color",
    fill_extrusion_height => "fill-extrusion-height",
    fill_extrusion_base => "fill-extrusion-base",
    fill_extrusion_opacity => "fill-extrusion-opacity",
    raster_opacity => "raster-opacity",
    raster_hue_rotate => "raster-hue-rotate",
    raster_saturation => "raster-saturation",
    raster_contrast => "raster-contrast",
    raster_brightness_min => "raster-brightness-min",
    raster_brightness_max => "raster-brightness-max",
    hillshade_exaggeration => "hillshade-exaggeration",
    hillshade_shadow_color => "hillshade-shadow-color",
    hillshade_highlight_color => "hillshade-highlight-color",
    hillshade_accent_color => "hillshade-accent-color",
    text_color => "text-color",
    text_opacity => "text-opacity",
    text_halo_color => "text-halo-color",
    text_halo_width => "text-halo-width",
    icon_color => "icon-color",
    icon_opacity => "icon-opacity",
    background_color => "background-color",
    background_opacity => "background-opacity",
    sky_type => "sky-type",
    sky_atmosphere_sun => "sky-atmosphere-sun",
});

properties!(layout {
    line_cap => "line-cap",
    line_join => "line-join",
    fill_sort_key => "fill-sort-key",
    symbol_placement => "symbol-placement",
    symbol_sort_key => "symbol-sort-key",
    icon_image => "icon-image",
    icon_size => "icon-size",
    icon_rotate => "icon-rotate",
    icon_allow_overlap => "icon-allow-overlap",
    text_field => "text-field",
    text_font => "text-font",
    text_size => "text-size",
    text_anchor => "text-anchor",
    text_offset => "text-offset",
    text_allow_overlap => "text-allow-overlap",
});

impl Target<'_> {
    /// # Errors
    ///
    /// Fails if the layer does not validate, its id is already taken (unrendered maps only), or
    /// the session refuses the message.
    pub fn add_layer(&mut self, layer: Layer) -> Result<(), Error> {
        layer.validate()?;
        match self {
            Self::Unrendered(map) => map.insert_layer(layer),
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddLayer { layer }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown (unrendered maps only), or if the session refuses the
    /// message.
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => map.remove_layer(layer_id).map(drop),
            Self::Live(_) | Self::Paired(..) => self.send(&Message::RemoveLayer {
                layer: layer_id.to_owned(),
            }),
        }
    }

    /// Move a layer below `before`, or to the top when `before` is `None`.
    ///
    /// # Errors
    ///
    /// Fails if a layer is unknown (unrendered maps only), or if the session refuses the message.
    pub fn move_layer(&mut self, layer_id: &str, before: Option<&str>) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                let mut layer = map.remove_layer(layer_id)?;
                layer.before_id = before.map(str::to_owned);
                map.insert_layer(layer)
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::MoveLayer {
                layer: layer_id.to_owned(),
                before: before.map(str::to_owned),
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown (unrendered maps only), or if the session refuses the
    /// message.
    pub fn set_filter(&mut self, layer_id: &str, filter: Value) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.layer_mut(layer_id)?.filter = Some(filter).filter(|f| !f.is_null());
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetFilter {
                layer: layer_id.to_owned(),
                filter,
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown or the property does not belong to it (unrendered maps
    /// only), or if the session refuses the message.
    pub fn set_paint_property(
        &mut self,
        layer_id: &str,
        name: &str,
        value: Value,
    ) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                let layer = map.layer_mut(layer_id)?;
                check_property(layer.kind, name)?;
                layer.paint.insert(name.to_owned(), value);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetPaintProperty {
                layer: layer_id.to_owned(),
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown or the property does not belong to it (unrendered maps
    /// only), or if the session refuses the message.
    pub fn set_layout_property(
        &mut self,
        layer_id: &str,
        name: &str,
        value: Value,
    ) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                let layer = map.layer_mut(layer_id)?;
                check_property(layer.kind, name)?;
                layer.layout.insert(name.to_owned(), value);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetLayoutProperty {
                layer: layer_id.to_owned(),
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown (unrendered maps only), or if the session refuses the
    /// message.
    pub fn set_tooltip(&mut self, layer_id: &str, tooltip: &str) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.layer_mut(layer_id)?.tooltip = Some(tooltip.to_owned());
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetTooltip {
                layer: layer_id.to_owned(),
                tooltip: tooltip.to_owned(),
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the layer is unknown (unrendered maps only), or if the session refuses the
    /// message.
    pub fn set_popup(&mut self, layer_id: &str, popup: &str) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.layer_mut(layer_id)?.popup = Some(popup.to_owned());
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetPopup {
                layer: layer_id.to_owned(),
                popup: popup.to_owned(),
            }),
        }
    }

    /// Register an image usable as `icon-image` or `fill-pattern`. `sdf` images can be
    /// recolored with `icon-color`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is empty, or if the session refuses the message.
    pub fn add_image(&mut self, id: &str, url: &str, sdf: bool) -> Result<(), Error> {
        if id.is_empty() {
            return Err(Error::MissingIdentifier("id"));
        }
        match self {
            Self::Unrendered(map) => {
                map.images.push(json!({"id": id, "url": url, "sdf": sdf}));
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddImage {
                id: id.to_owned(),
                url: url.to_owned(),
                sdf,
            }),
        }
    }
}
