//! Legends rendered next to the map.

use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::control::Position;
use crate::handle::Target;
use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendKind {
    Categorical,
    Continuous,
}

/// Shape of the color patches of a categorical legend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchShape {
    #[default]
    Square,
    Circle,
    Line,
    Hexagon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LegendKind,
    pub values: Vec<Value>,
    pub colors: Vec<String>,
    pub position: Position,
    pub patch_shape: PatchShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
}

impl Legend {
    /// One labeled patch per value.
    ///
    /// # Errors
    ///
    /// Fails if `values` and `colors` differ in length or are empty.
    pub fn categorical(
        title: impl Into<String>,
        values: Vec<Value>,
        colors: Vec<String>,
    ) -> Result<Self, Error> {
        if values.is_empty() || values.len() != colors.len() {
            return Err(Error::InvalidArgument {
                argument: "colors",
                reason: format!(
                    "{} colors given for {} values, one color per value expected",
                    colors.len(),
                    values.len()
                ),
            });
        }
        Ok(Self::from_parts_unchecked(
            title.into(),
            LegendKind::Categorical,
            values,
            colors,
        ))
    }

    /// Gradient bar with `values` as tick labels.
    ///
    /// # Errors
    ///
    /// Fails if there are fewer than two colors or no values.
    pub fn continuous(
        title: impl Into<String>,
        values: Vec<Value>,
        colors: Vec<String>,
    ) -> Result<Self, Error> {
        if colors.len() < 2 {
            return Err(Error::InvalidArgument {
                argument: "colors",
                reason: "a gradient needs at least two colors".to_owned(),
            });
        }
        if values.is_empty() {
            return Err(Error::InvalidArgument {
                argument: "values",
                reason: "at least one value expected".to_owned(),
            });
        }
        Ok(Self::from_parts_unchecked(
            title.into(),
            LegendKind::Continuous,
            values,
            colors,
        ))
    }

    pub(crate) fn from_parts_unchecked(
        title: String,
        kind: LegendKind,
        values: Vec<Value>,
        colors: Vec<String>,
    ) -> Self {
        Self {
            title,
            kind,
            values,
            colors,
            position: Position::TopLeft,
            patch_shape: PatchShape::default(),
            width: None,
            unique_id: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_patch_shape(mut self, patch_shape: PatchShape) -> Self {
        self.patch_shape = patch_shape;
        self
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_unique_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }
}

impl Target<'_> {
    /// Show a legend. With `add` set, existing legends are kept, otherwise replaced.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn add_legend(&mut self, legend: Legend, add: bool) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                if !add {
                    map.legends.clear();
                }
                map.legends.push(legend);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddLegend { legend, add }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn clear_legend(&mut self) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.legends.clear();
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::ClearLegend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn categorical_needs_a_color_per_value() {
        assert!(Legend::categorical("Land use", vec![json!("park")], Vec::new()).is_err());

        let legend = Legend::categorical(
            "Land use",
            vec![json!("park"), json!("water")],
            vec!["green".to_owned(), "blue".to_owned()],
        )
        .unwrap()
        .with_patch_shape(PatchShape::Circle);

        assert_eq!(
            serde_json::to_value(&legend).unwrap(),
            json!({
                "title": "Land use",
                "type": "categorical",
                "values": ["park", "water"],
                "colors": ["green", "blue"],
                "position": "top-left",
                "patch_shape": "circle",
            })
        );
    }

    #[test]
    fn continuous_needs_two_colors() {
        assert!(Legend::continuous("Density", vec![json!(0)], vec!["red".to_owned()]).is_err());
        assert!(
            Legend::continuous(
                "Density",
                vec![json!(0), json!(100)],
                vec!["white".to_owned(), "red".to_owned()]
            )
            .is_ok()
        );
    }
}
