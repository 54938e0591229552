//! Geospatial operations run by turf.js in the browser.
//!
//! Nothing is computed here: a [`TurfRequest`] names the operation, its input and where the
//! browser should put the result, either a new GeoJSON source (`source_id`) or an input the
//! host can read (`input_id`).

use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::geojson::FeatureCollection;
use crate::handle::Target;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Meters,
    Kilometers,
    Miles,
    Feet,
    Degrees,
    Radians,
}

/// Features an operation works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurfInput {
    /// Features of a layer already on the map.
    LayerId(String),
    /// Inline GeoJSON.
    Data(Value),
    /// Bare `[lng, lat]` positions.
    Coordinates(Vec<[f64; 2]>),
}

impl TurfInput {
    /// Build the input from the three ways of passing it, exactly one of which must be given.
    ///
    /// # Errors
    ///
    /// Fails when none or more than one is given.
    pub fn from_parts(
        operation: &'static str,
        layer_id: Option<&str>,
        data: Option<Value>,
        coordinates: Option<Vec<[f64; 2]>>,
    ) -> Result<Self, Error> {
        match (layer_id, data, coordinates) {
            (Some(layer_id), None, None) if !layer_id.is_empty() => {
                Ok(Self::LayerId(layer_id.to_owned()))
            }
            (None, Some(data), None) => Ok(Self::Data(data)),
            (None, None, Some(coordinates)) if !coordinates.is_empty() => {
                Ok(Self::Coordinates(coordinates))
            }
            _ => Err(Error::ExclusiveArguments {
                operation,
                arguments: &["layer_id", "data", "coordinates"],
            }),
        }
    }

    pub fn features(collection: &FeatureCollection) -> Self {
        Self::Data(collection.to_value())
    }
}

/// Second input of binary operations, sent next to the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OtherInput {
    #[serde(rename = "layer_id_2")]
    LayerId(String),
    #[serde(rename = "data_2")]
    Data(Value),
    #[serde(rename = "coordinates_2")]
    Coordinates(Vec<[f64; 2]>),
}

impl From<TurfInput> for OtherInput {
    fn from(input: TurfInput) -> Self {
        match input {
            TurfInput::LayerId(id) => Self::LayerId(id),
            TurfInput::Data(data) => Self::Data(data),
            TurfInput::Coordinates(coordinates) => Self::Coordinates(coordinates),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TurfRequest {
    #[serde(rename = "turf_buffer")]
    Buffer {
        #[serde(flatten)]
        input: TurfInput,
        radius: f64,
        units: Units,
        source_id: String,
    },
    #[serde(rename = "turf_union")]
    Union {
        #[serde(flatten)]
        input: TurfInput,
        source_id: String,
    },
    #[serde(rename = "turf_intersect")]
    Intersect {
        #[serde(flatten)]
        input: TurfInput,
        #[serde(flatten)]
        other: OtherInput,
        source_id: String,
    },
    #[serde(rename = "turf_difference")]
    Difference {
        #[serde(flatten)]
        input: TurfInput,
        #[serde(flatten)]
        other: OtherInput,
        source_id: String,
    },
    #[serde(rename = "turf_convex_hull")]
    ConvexHull {
        #[serde(flatten)]
        input: TurfInput,
        source_id: String,
    },
    #[serde(rename = "turf_concave_hull")]
    ConcaveHull {
        #[serde(flatten)]
        input: TurfInput,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_edge: Option<f64>,
        units: Units,
        source_id: String,
    },
    #[serde(rename = "turf_voronoi")]
    Voronoi {
        #[serde(flatten)]
        input: TurfInput,
        /// `[west, south, east, north]` clipping box.
        #[serde(skip_serializing_if = "Option::is_none")]
        bbox: Option<[f64; 4]>,
        source_id: String,
    },
    #[serde(rename = "turf_centroid")]
    Centroid {
        #[serde(flatten)]
        input: TurfInput,
        source_id: String,
    },
    #[serde(rename = "turf_center_of_mass")]
    CenterOfMass {
        #[serde(flatten)]
        input: TurfInput,
        source_id: String,
    },
    #[serde(rename = "turf_distance")]
    Distance {
        #[serde(flatten)]
        input: TurfInput,
        #[serde(flatten)]
        other: OtherInput,
        units: Units,
        input_id: String,
    },
    #[serde(rename = "turf_area")]
    Area {
        #[serde(flatten)]
        input: TurfInput,
        input_id: String,
    },
}

fn output_id(argument: &'static str, id: &str) -> Result<String, Error> {
    if id.is_empty() {
        Err(Error::MissingIdentifier(argument))
    } else {
        Ok(id.to_owned())
    }
}

impl TurfRequest {
    /// # Errors
    ///
    /// Fails for a negative or non-finite radius, or an empty `source_id`.
    pub fn buffer(
        input: TurfInput,
        radius: f64,
        units: Units,
        source_id: &str,
    ) -> Result<Self, Error> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidArgument {
                argument: "radius",
                reason: format!("{radius} is not a non-negative distance"),
            });
        }
        Ok(Self::Buffer {
            input,
            radius,
            units,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn union(input: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::Union {
            input,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn intersect(input: TurfInput, other: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::Intersect {
            input,
            other: other.into(),
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// Parts of `input` not covered by `other`.
    ///
    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn difference(input: TurfInput, other: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::Difference {
            input,
            other: other.into(),
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn convex_hull(input: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::ConvexHull {
            input,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn concave_hull(
        input: TurfInput,
        max_edge: Option<f64>,
        units: Units,
        source_id: &str,
    ) -> Result<Self, Error> {
        Ok(Self::ConcaveHull {
            input,
            max_edge,
            units,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn voronoi(
        input: TurfInput,
        bbox: Option<[f64; 4]>,
        source_id: &str,
    ) -> Result<Self, Error> {
        Ok(Self::Voronoi {
            input,
            bbox,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn centroid(input: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::Centroid {
            input,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// # Errors
    ///
    /// Fails for an empty `source_id`.
    pub fn center_of_mass(input: TurfInput, source_id: &str) -> Result<Self, Error> {
        Ok(Self::CenterOfMass {
            input,
            source_id: output_id("source_id", source_id)?,
        })
    }

    /// Distance between two points, reported through the `input_id` input.
    ///
    /// # Errors
    ///
    /// Fails for an empty `input_id`.
    pub fn distance(
        input: TurfInput,
        other: TurfInput,
        units: Units,
        input_id: &str,
    ) -> Result<Self, Error> {
        Ok(Self::Distance {
            input,
            other: other.into(),
            units,
            input_id: output_id("input_id", input_id)?,
        })
    }

    /// Area in square meters, reported through the `input_id` input.
    ///
    /// # Errors
    ///
    /// Fails for an empty `input_id`.
    pub fn area(input: TurfInput, input_id: &str) -> Result<Self, Error> {
        Ok(Self::Area {
            input,
            input_id: output_id("input_id", input_id)?,
        })
    }

    /// Value of the `type` discriminator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Buffer { .. } => "turf_buffer",
            Self::Union { .. } => "turf_union",
            Self::Intersect { .. } => "turf_intersect",
            Self::Difference { .. } => "turf_difference",
            Self::ConvexHull { .. } => "turf_convex_hull",
            Self::ConcaveHull { .. } => "turf_concave_hull",
            Self::Voronoi { .. } => "turf_voronoi",
            Self::Centroid { .. } => "turf_centroid",
            Self::CenterOfMass { .. } => "turf_center_of_mass",
            Self::Distance { .. } => "turf_distance",
            Self::Area { .. } => "turf_area",
        }
    }
}

impl Target<'_> {
    /// Run a turf.js operation. Before rendering, the request is kept and run once the map loads.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn turf(&mut self, request: TurfRequest) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.turf_operations.push(request);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;
    use serde_json::json;

    #[test]
    fn input_needs_exactly_one_part() {
        assert!(matches!(
            TurfInput::from_parts("turf_buffer", None, None, None),
            Err(Error::ExclusiveArguments { operation: "turf_buffer", .. })
        ));
        assert!(matches!(
            TurfInput::from_parts("turf_buffer", Some("parks"), Some(json!({})), None),
            Err(Error::ExclusiveArguments { .. })
        ));
        assert_eq!(
            TurfInput::from_parts("turf_buffer", Some("parks"), None, None).unwrap(),
            TurfInput::LayerId("parks".to_owned())
        );
    }

    #[test]
    fn buffer_message() {
        let input = TurfInput::from_parts("turf_buffer", None, None, Some(vec![[17.0, 51.0]]))
            .unwrap();
        let request = TurfRequest::buffer(input, 1000.0, Units::Meters, "buf").unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], request.name());
        assert_eq!(value["type"], "turf_buffer");
        assert_eq!(value["radius"].as_f64(), Some(1000.0));
        assert_eq!(value["units"], "meters");
        assert_eq!(value["source_id"], "buf");
        assert_eq!(value["coordinates"], json!([[17.0, 51.0]]));
    }

    #[test]
    fn binary_operations_carry_both_inputs() {
        let request = TurfRequest::intersect(
            TurfInput::LayerId("a".to_owned()),
            TurfInput::LayerId("b".to_owned()),
            "both",
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "type": "turf_intersect",
                "layer_id": "a",
                "layer_id_2": "b",
                "source_id": "both",
            })
        );
    }

    #[test]
    fn empty_output_ids_are_rejected() {
        let input = TurfInput::LayerId("a".to_owned());
        assert!(matches!(
            TurfRequest::area(input.clone(), ""),
            Err(Error::MissingIdentifier("input_id"))
        ));
        assert!(TurfRequest::buffer(input, -1.0, Units::Meters, "buf").is_err());
    }

    #[test]
    fn unrendered_map_keeps_requests() {
        let mut map = Map::maplibre();
        map.target()
            .turf(TurfRequest::centroid(TurfInput::LayerId("a".to_owned()), "c").unwrap())
            .unwrap();

        assert_eq!(map.turf_operations().len(), 1);
        let payload = map.into_payload().unwrap();
        assert_eq!(payload.x["turf_operations"][0]["type"], "turf_centroid");
    }
}
