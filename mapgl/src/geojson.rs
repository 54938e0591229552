//! Conversion between GeoJSON and [`geo_types`].
//! <https://datatracker.ietf.org/doc/html/rfc7946>

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde_json::{Map as JsonMap, Value, json};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid GeoJSON text: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Expected a GeoJSON object, got: {0}")]
    ExpectedObject(Value),
    #[error("Unsupported GeoJSON type: {0}")]
    UnsupportedType(String),
    #[error("Member '{0}' missing")]
    MissingMember(&'static str),
    #[error("Invalid position: {0}")]
    InvalidPosition(Value),
}

/// GeoJSON feature with its geometry converted to [`geo_types`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<Value>,
    pub geometry: Option<Geometry<f64>>,
    pub properties: JsonMap<String, Value>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            id: None,
            geometry: Some(geometry.into()),
            properties: JsonMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut feature = json!({
            "type": "Feature",
            "geometry": self.geometry.as_ref().map_or(Value::Null, geometry_to_value),
            "properties": self.properties,
        });
        if let Some(id) = &self.id {
            feature["id"] = id.clone();
        }
        feature
    }

    fn from_object(object: &JsonMap<String, Value>) -> Result<Self, Error> {
        let geometry = match object.get("geometry") {
            None | Some(Value::Null) => None,
            Some(geometry) => Some(geometry_from_value(geometry)?),
        };
        let properties = match object.get("properties") {
            Some(Value::Object(properties)) => properties.clone(),
            _ => JsonMap::new(),
        };
        Ok(Self {
            id: object.get("id").cloned(),
            geometry,
            properties,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse GeoJSON text. `null` and blank text yield an empty collection.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or GeoJSON.
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_value(&serde_json::from_str(text)?)
    }

    /// Accepts a `FeatureCollection`, a single `Feature` or a bare geometry.
    ///
    /// # Errors
    ///
    /// Fails on malformed GeoJSON.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let object = match value {
            Value::Null => return Ok(Self::default()),
            // Inputs sometimes carry GeoJSON as a JSON string.
            Value::String(text) => return Self::parse(text),
            Value::Object(object) => object,
            other => return Err(Error::ExpectedObject(other.clone())),
        };

        match type_member(object)? {
            "FeatureCollection" => {
                let features = match object.get("features") {
                    Some(Value::Array(features)) => features,
                    _ => return Err(Error::MissingMember("features")),
                };
                let features = features
                    .iter()
                    .map(|feature| match feature {
                        Value::Object(feature) => Feature::from_object(feature),
                        other => Err(Error::ExpectedObject(other.clone())),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Self { features })
            }
            "Feature" => Ok(Self {
                features: vec![Feature::from_object(object)?],
            }),
            _ => Ok(Self {
                features: vec![Feature {
                    id: None,
                    geometry: Some(geometry_from_value(value)?),
                    properties: JsonMap::new(),
                }],
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(Feature::to_value).collect::<Vec<_>>(),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

fn type_member(object: &JsonMap<String, Value>) -> Result<&str, Error> {
    object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Error::MissingMember("type"))
}

fn position(coord: Coord<f64>) -> Value {
    json!([coord.x, coord.y])
}

fn positions(line: &LineString<f64>) -> Value {
    Value::Array(line.coords().copied().map(position).collect())
}

fn rings(polygon: &Polygon<f64>) -> Value {
    Value::Array(
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(positions)
            .collect(),
    )
}

/// Serialize a geometry as a GeoJSON geometry object.
pub fn geometry_to_value(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(point) => {
            json!({"type": "Point", "coordinates": position(point.0)})
        }
        Geometry::Line(line) => {
            json!({"type": "LineString", "coordinates": [position(line.start), position(line.end)]})
        }
        Geometry::LineString(line) => {
            json!({"type": "LineString", "coordinates": positions(line)})
        }
        Geometry::Polygon(polygon) => {
            json!({"type": "Polygon", "coordinates": rings(polygon)})
        }
        Geometry::MultiPoint(points) => json!({
            "type": "MultiPoint",
            "coordinates": points.iter().map(|p| position(p.0)).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(lines) => json!({
            "type": "MultiLineString",
            "coordinates": lines.iter().map(positions).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(polygons) => json!({
            "type": "MultiPolygon",
            "coordinates": polygons.iter().map(rings).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(collection) => json!({
            "type": "GeometryCollection",
            "geometries": collection.iter().map(geometry_to_value).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => {
            json!({"type": "Polygon", "coordinates": rings(&rect.to_polygon())})
        }
        Geometry::Triangle(triangle) => {
            json!({"type": "Polygon", "coordinates": rings(&triangle.to_polygon())})
        }
    }
}

/// Parse a GeoJSON geometry object.
///
/// # Errors
///
/// Fails on unknown geometry types and malformed coordinates.
pub fn geometry_from_value(value: &Value) -> Result<Geometry<f64>, Error> {
    let Value::Object(object) = value else {
        return Err(Error::ExpectedObject(value.clone()));
    };

    let kind = type_member(object)?;
    if kind == "GeometryCollection" {
        let Some(Value::Array(geometries)) = object.get("geometries") else {
            return Err(Error::MissingMember("geometries"));
        };
        let geometries = geometries
            .iter()
            .map(geometry_from_value)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(geometries)));
    }

    let coordinates = object
        .get("coordinates")
        .ok_or(Error::MissingMember("coordinates"))?;

    Ok(match kind {
        "Point" => Point(parse_position(coordinates)?).into(),
        "MultiPoint" => MultiPoint(
            parse_positions(coordinates)?
                .into_iter()
                .map(Point)
                .collect(),
        )
        .into(),
        "LineString" => LineString(parse_positions(coordinates)?).into(),
        "MultiLineString" => MultiLineString(
            array(coordinates)?
                .iter()
                .map(|line| parse_positions(line).map(LineString))
                .collect::<Result<_, _>>()?,
        )
        .into(),
        "Polygon" => parse_polygon(coordinates)?.into(),
        "MultiPolygon" => MultiPolygon(
            array(coordinates)?
                .iter()
                .map(parse_polygon)
                .collect::<Result<_, _>>()?,
        )
        .into(),
        other => return Err(Error::UnsupportedType(other.to_owned())),
    })
}

fn array(value: &Value) -> Result<&Vec<Value>, Error> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidPosition(value.clone()))
}

fn parse_position(value: &Value) -> Result<Coord<f64>, Error> {
    match array(value)?.as_slice() {
        [x, y, ..] => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(Error::InvalidPosition(value.clone())),
        },
        _ => Err(Error::InvalidPosition(value.clone())),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<Coord<f64>>, Error> {
    array(value)?.iter().map(parse_position).collect()
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>, Error> {
    let mut rings = array(value)?
        .iter()
        .map(|ring| parse_positions(ring).map(LineString));
    let exterior = rings
        .next()
        .transpose()?
        .unwrap_or_else(|| LineString(Vec::new()));
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon};

    #[test]
    fn parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 7,
                 "geometry": {"type": "Point", "coordinates": [17.03, 51.1]},
                 "properties": {"name": "Wrocław"}},
                {"type": "Feature", "geometry": null, "properties": null}
            ]
        }"#;

        let collection = FeatureCollection::parse(text).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].id, Some(json!(7)));
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point(point!(x: 17.03, y: 51.1)))
        );
        assert_eq!(collection.features[0].properties["name"], "Wrocław");
        assert_eq!(collection.features[1].geometry, None);
    }

    #[test]
    fn null_and_blank_are_empty() {
        assert!(FeatureCollection::parse("null").unwrap().is_empty());
        assert!(FeatureCollection::parse("  ").unwrap().is_empty());
        assert!(FeatureCollection::from_value(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn geojson_as_json_string() {
        let value = json!(r#"{"type": "Point", "coordinates": [1, 2]}"#);
        let collection = FeatureCollection::from_value(&value).unwrap();
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point(point!(x: 1.0, y: 2.0)))
        );
    }

    #[test]
    fn polygon_with_hole() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]
            ]
        });

        let Geometry::Polygon(parsed) = geometry_from_value(&value).unwrap() else {
            panic!("polygon expected");
        };
        assert_eq!(parsed.interiors().len(), 1);
        assert_eq!(geometry_to_value(&Geometry::Polygon(parsed)), value);
    }

    #[test]
    fn serialize_line_and_polygon() {
        let line: Geometry<f64> = line_string![(x: 0., y: 0.), (x: 1., y: 1.)].into();
        assert_eq!(
            geometry_to_value(&line),
            json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]})
        );

        let square: Geometry<f64> =
            polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 0., y: 0.)].into();
        assert_eq!(geometry_to_value(&square)["type"], "Polygon");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let value = json!({"type": "Circle", "coordinates": [0, 0]});
        assert!(matches!(
            geometry_from_value(&value),
            Err(Error::UnsupportedType(kind)) if kind == "Circle"
        ));
    }

    #[test]
    fn feature_round_trip_keeps_properties() {
        let feature = Feature::new(point!(x: 1.0, y: 2.0)).with_property("population", 120);
        let parsed = FeatureCollection::from_value(&feature.to_value()).unwrap();
        assert_eq!(parsed.features, vec![feature]);
    }
}
