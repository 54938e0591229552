//! Map controls.

use serde::Serialize;

use crate::Error;
use crate::handle::Target;
use crate::message::Message;

/// Corner of the map a control or legend is placed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Drawing tools offered by the draw control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawTool {
    Point,
    LineString,
    Polygon,
    Trash,
    CombineFeatures,
    UncombineFeatures,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    #[default]
    Metric,
    Imperial,
    Nautical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    Navigation {
        position: Position,
        show_compass: bool,
        show_zoom: bool,
        visualize_pitch: bool,
    },
    Fullscreen {
        position: Position,
    },
    Scale {
        position: Position,
        unit: ScaleUnit,
        max_width: u32,
    },
    Geolocate {
        position: Position,
        track_user_location: bool,
        show_accuracy_circle: bool,
    },
    Draw {
        position: Position,
        freehand: bool,
        simplify_freehand: bool,
        tools: Vec<DrawTool>,
        orientation: Orientation,
    },
    Layers {
        position: Position,
        /// Layer ids to toggle, all layers when `None`.
        #[serde(skip_serializing_if = "Option::is_none")]
        layers: Option<Vec<String>>,
        collapsible: bool,
    },
    Reset {
        position: Position,
        animate: bool,
    },
    Geocoder {
        position: Position,
        placeholder: String,
        collapsed: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Control {
    pub fn navigation() -> Self {
        Self::Navigation {
            position: Position::TopRight,
            show_compass: true,
            show_zoom: true,
            visualize_pitch: false,
        }
    }

    pub fn fullscreen() -> Self {
        Self::Fullscreen {
            position: Position::TopRight,
        }
    }

    pub fn scale() -> Self {
        Self::Scale {
            position: Position::BottomLeft,
            unit: ScaleUnit::Metric,
            max_width: 100,
        }
    }

    pub fn geolocate() -> Self {
        Self::Geolocate {
            position: Position::TopRight,
            track_user_location: false,
            show_accuracy_circle: true,
        }
    }

    pub fn draw() -> Self {
        Self::Draw {
            position: Position::TopLeft,
            freehand: false,
            simplify_freehand: false,
            tools: vec![DrawTool::Point, DrawTool::LineString, DrawTool::Polygon, DrawTool::Trash],
            orientation: Orientation::Vertical,
        }
    }

    pub fn layers(layers: Option<Vec<String>>) -> Self {
        Self::Layers {
            position: Position::TopLeft,
            layers,
            collapsible: true,
        }
    }

    pub fn reset() -> Self {
        Self::Reset {
            position: Position::TopRight,
            animate: true,
        }
    }

    pub fn geocoder(placeholder: impl Into<String>) -> Self {
        Self::Geocoder {
            position: Position::TopRight,
            placeholder: placeholder.into(),
            collapsed: false,
        }
    }

    /// Move the control to another corner.
    pub fn at(mut self, corner: Position) -> Self {
        match &mut self {
            Self::Navigation { position, .. }
            | Self::Fullscreen { position }
            | Self::Scale { position, .. }
            | Self::Geolocate { position, .. }
            | Self::Draw { position, .. }
            | Self::Layers { position, .. }
            | Self::Reset { position, .. }
            | Self::Geocoder { position, .. } => *position = corner,
        }
        self
    }

    /// Name of the control type, e.g. `navigation`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigation { .. } => "navigation",
            Self::Fullscreen { .. } => "fullscreen",
            Self::Scale { .. } => "scale",
            Self::Geolocate { .. } => "geolocate",
            Self::Draw { .. } => "draw",
            Self::Layers { .. } => "layers",
            Self::Reset { .. } => "reset",
            Self::Geocoder { .. } => "geocoder",
        }
    }
}

impl Target<'_> {
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn add_control(&mut self, control: Control) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.controls.push(control);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddControl { control }),
        }
    }

    /// Remove controls of the given types, or all of them when `names` is `None`.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn clear_controls(&mut self, names: Option<&[&str]>) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                match names {
                    Some(names) => map
                        .controls
                        .retain(|control| !names.contains(&control.name())),
                    None => map.controls.clear(),
                }
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::ClearControls {
                controls: names.map(|names| names.iter().map(|&name| name.to_owned()).collect()),
            }),
        }
    }
}
