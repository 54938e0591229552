//! Messages understood by the browser runtime.
//!
//! Each message serializes to a JSON object with a `type` discriminator, followed by fields
//! specific to the operation. Style property names keep their hyphenated form.

use serde::Serialize;
use serde_json::Value;

use crate::camera::CameraOptions;
use crate::control::Control;
use crate::layer::Layer;
use crate::legend::Legend;
use crate::marker::Marker;
use crate::source::Source;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    AddSource {
        id: String,
        source: Source,
    },
    SetSource {
        source: String,
        data: Value,
    },
    AddLayer {
        layer: Layer,
    },
    RemoveLayer {
        layer: String,
    },
    MoveLayer {
        layer: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        before: Option<String>,
    },
    SetFilter {
        layer: String,
        filter: Value,
    },
    SetPaintProperty {
        layer: String,
        name: String,
        value: Value,
    },
    SetLayoutProperty {
        layer: String,
        name: String,
        value: Value,
    },
    SetTooltip {
        layer: String,
        tooltip: String,
    },
    SetPopup {
        layer: String,
        popup: String,
    },
    AddImage {
        id: String,
        url: String,
        sdf: bool,
    },
    AddControl {
        control: Control,
    },
    ClearControls {
        #[serde(skip_serializing_if = "Option::is_none")]
        controls: Option<Vec<String>>,
    },
    AddLegend {
        legend: Legend,
        add: bool,
    },
    ClearLegend,
    AddMarkers {
        markers: Vec<Marker>,
    },
    ClearMarkers,
    FlyTo {
        #[serde(flatten)]
        camera: CameraOptions,
    },
    EaseTo {
        #[serde(flatten)]
        camera: CameraOptions,
    },
    JumpTo {
        #[serde(flatten)]
        camera: CameraOptions,
    },
    SetView {
        center: [f64; 2],
        zoom: f64,
    },
    FitBounds {
        bounds: [f64; 4],
        animate: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        padding: Option<f64>,
    },
    SetProjection {
        projection: String,
    },
    SetTerrain {
        source: String,
        exaggeration: f64,
    },
    SetFog {
        fog: Value,
    },
    SetStyle {
        style: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config: Option<Value>,
        diff: bool,
    },
    SetConfigProperty {
        import_id: String,
        config_name: String,
        value: Value,
    },
    SetColorTheme {
        data: String,
    },
    QueryRenderedFeatures {
        #[serde(skip_serializing_if = "Option::is_none")]
        geometry: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        layers: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<Value>,
    },
    GetDrawnFeatures,
    ClearDrawnFeatures,
}

impl Message {
    /// Value of the `type` discriminator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddSource { .. } => "add_source",
            Self::SetSource { .. } => "set_source",
            Self::AddLayer { .. } => "add_layer",
            Self::RemoveLayer { .. } => "remove_layer",
            Self::MoveLayer { .. } => "move_layer",
            Self::SetFilter { .. } => "set_filter",
            Self::SetPaintProperty { .. } => "set_paint_property",
            Self::SetLayoutProperty { .. } => "set_layout_property",
            Self::SetTooltip { .. } => "set_tooltip",
            Self::SetPopup { .. } => "set_popup",
            Self::AddImage { .. } => "add_image",
            Self::AddControl { .. } => "add_control",
            Self::ClearControls { .. } => "clear_controls",
            Self::AddLegend { .. } => "add_legend",
            Self::ClearLegend => "clear_legend",
            Self::AddMarkers { .. } => "add_markers",
            Self::ClearMarkers => "clear_markers",
            Self::FlyTo { .. } => "fly_to",
            Self::EaseTo { .. } => "ease_to",
            Self::JumpTo { .. } => "jump_to",
            Self::SetView { .. } => "set_view",
            Self::FitBounds { .. } => "fit_bounds",
            Self::SetProjection { .. } => "set_projection",
            Self::SetTerrain { .. } => "set_terrain",
            Self::SetFog { .. } => "set_fog",
            Self::SetStyle { .. } => "set_style",
            Self::SetConfigProperty { .. } => "set_config_property",
            Self::SetColorTheme { .. } => "set_color_theme",
            Self::QueryRenderedFeatures { .. } => "query_rendered_features",
            Self::GetDrawnFeatures => "get_drawn_features",
            Self::ClearDrawnFeatures => "clear_drawn_features",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tag_matches_name() {
        let messages = [
            Message::RemoveLayer {
                layer: "roads".to_owned(),
            },
            Message::ClearLegend,
            Message::SetView {
                center: [17.0, 51.1],
                zoom: 9.0,
            },
            Message::GetDrawnFeatures,
        ];

        for message in messages {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["type"], message.name());
        }
    }

    #[test]
    fn hyphenated_property_names_survive() {
        let message = Message::SetPaintProperty {
            layer: "parks".to_owned(),
            name: "fill-opacity".to_owned(),
            value: json!(0.4),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "set_paint_property",
                "layer": "parks",
                "name": "fill-opacity",
                "value": 0.4,
            })
        );
    }

    #[test]
    fn move_layer_without_anchor_omits_it() {
        let value = serde_json::to_value(Message::MoveLayer {
            layer: "labels".to_owned(),
            before: None,
        })
        .unwrap();

        assert_eq!(value, json!({"type": "move_layer", "layer": "labels"}));
    }
}
