//! Build Mapbox/MapLibre style expressions.
//! <https://docs.mapbox.com/style-spec/reference/expressions/>

use serde_json::{Value, json};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("Expected as many values as stops, got {values} values and {stops} stops")]
    LengthMismatch { values: usize, stops: usize },
    #[error("At least one stop expected")]
    NoStops,
    #[error("Unknown interpolation type: {0}")]
    UnknownInterpolation(String),
}

/// Interpolation between the stops of an `interpolate` expression.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Interpolation {
    #[default]
    Linear,
    Exponential(f64),
    CubicBezier([f64; 4]),
}

impl Interpolation {
    fn to_value(self) -> Value {
        match self {
            Self::Linear => json!(["linear"]),
            Self::Exponential(base) => json!(["exponential", base]),
            Self::CubicBezier([x1, y1, x2, y2]) => json!(["cubic-bezier", x1, y1, x2, y2]),
        }
    }
}

impl std::str::FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "exponential" => Ok(Self::Exponential(1.0)),
            other => Err(Error::UnknownInterpolation(other.to_owned())),
        }
    }
}

/// `["get", column]`
pub fn get(column: &str) -> Value {
    json!(["get", column])
}

/// Interpolate `column` (or `["zoom"]` when `column` is `None`) between `values`, producing
/// `stops`.
///
/// # Errors
///
/// Fails if `values` and `stops` differ in length or are empty.
pub fn interpolate(
    column: Option<&str>,
    interpolation: Interpolation,
    values: &[f64],
    stops: &[Value],
) -> Result<Value, Error> {
    same_length(values.len(), stops.len())?;

    let input = column.map_or_else(|| json!(["zoom"]), get);
    let mut expression = vec![json!("interpolate"), interpolation.to_value(), input];
    for (value, stop) in values.iter().zip(stops) {
        expression.push(json!(value));
        expression.push(stop.clone());
    }
    Ok(Value::Array(expression))
}

/// Categorical mapping of `column` values to `stops`, falling back to `default`.
///
/// # Errors
///
/// Fails if `values` and `stops` differ in length or are empty.
pub fn match_expr(
    column: &str,
    values: &[Value],
    stops: &[Value],
    default: Value,
) -> Result<Value, Error> {
    same_length(values.len(), stops.len())?;

    let mut expression = vec![json!("match"), get(column)];
    for (value, stop) in values.iter().zip(stops) {
        expression.push(value.clone());
        expression.push(stop.clone());
    }
    expression.push(default);
    Ok(Value::Array(expression))
}

/// Piecewise constant mapping: `base` below `values[0]`, then `stops[i]` from `values[i]` on.
///
/// # Errors
///
/// Fails if `values` and `stops` differ in length or are empty.
pub fn step_expr(
    column: &str,
    base: Value,
    values: &[f64],
    stops: &[Value],
) -> Result<Value, Error> {
    same_length(values.len(), stops.len())?;

    let mut expression = vec![json!("step"), get(column), base];
    for (value, stop) in values.iter().zip(stops) {
        expression.push(json!(value));
        expression.push(stop.clone());
    }
    Ok(Value::Array(expression))
}

/// Concatenate strings and expressions, e.g. for tooltips.
pub fn concat(parts: impl IntoIterator<Item = Value>) -> Value {
    Value::Array(std::iter::once(json!("concat")).chain(parts).collect())
}

/// Options of [`number_format`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberFormat {
    pub locale: Option<String>,
    pub currency: Option<String>,
    pub min_fraction_digits: Option<u8>,
    pub max_fraction_digits: Option<u8>,
}

/// Format a numeric column according to the browser's `Intl.NumberFormat`.
pub fn number_format(column: &str, format: &NumberFormat) -> Value {
    let mut options = serde_json::Map::new();
    if let Some(locale) = &format.locale {
        options.insert("locale".to_owned(), json!(locale));
    }
    if let Some(currency) = &format.currency {
        options.insert("currency".to_owned(), json!(currency));
    }
    if let Some(digits) = format.min_fraction_digits {
        options.insert("min-fraction-digits".to_owned(), json!(digits));
    }
    if let Some(digits) = format.max_fraction_digits {
        options.insert("max-fraction-digits".to_owned(), json!(digits));
    }
    json!(["number-format", get(column), options])
}

fn same_length(values: usize, stops: usize) -> Result<(), Error> {
    if values != stops {
        Err(Error::LengthMismatch { values, stops })
    } else if values == 0 {
        Err(Error::NoStops)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        assert_eq!(get("name"), json!(["get", "name"]));
    }

    #[test]
    fn test_interpolate_column() {
        assert_eq!(
            interpolate(
                Some("population"),
                Interpolation::Linear,
                &[0.0, 1000.0],
                &[json!("#ffffff"), json!("#ff0000")],
            )
            .unwrap(),
            json!([
                "interpolate",
                ["linear"],
                ["get", "population"],
                0.0,
                "#ffffff",
                1000.0,
                "#ff0000"
            ])
        );
    }

    #[test]
    fn test_interpolate_zoom() {
        let expression = interpolate(
            None,
            Interpolation::Exponential(1.5),
            &[5.0, 12.0],
            &[json!(1), json!(4)],
        )
        .unwrap();
        assert_eq!(expression[1], json!(["exponential", 1.5]));
        assert_eq!(expression[2], json!(["zoom"]));
    }

    #[test]
    fn test_interpolate_length_mismatch() {
        assert_eq!(
            interpolate(Some("x"), Interpolation::Linear, &[1.0], &[]),
            Err(Error::LengthMismatch {
                values: 1,
                stops: 0
            })
        );
        assert_eq!(
            interpolate(Some("x"), Interpolation::Linear, &[], &[]),
            Err(Error::NoStops)
        );
    }

    #[test]
    fn test_match_expr() {
        assert_eq!(
            match_expr(
                "type",
                &[json!("park"), json!("forest")],
                &[json!("green"), json!("darkgreen")],
                json!("gray"),
            )
            .unwrap(),
            json!(["match", ["get", "type"], "park", "green", "forest", "darkgreen", "gray"])
        );
    }

    #[test]
    fn test_step_expr() {
        assert_eq!(
            step_expr("count", json!(10), &[5.0, 50.0], &[json!(20), json!(30)]).unwrap(),
            json!(["step", ["get", "count"], 10, 5.0, 20, 50.0, 30])
        );
    }

    #[test]
    fn test_concat() {
        assert_eq!(
            concat([json!("Name: "), get("name")]),
            json!(["concat", "Name: ", ["get", "name"]])
        );
    }

    #[test]
    fn test_number_format() {
        let format = NumberFormat {
            locale: Some("en-US".to_owned()),
            max_fraction_digits: Some(1),
            ..Default::default()
        };
        assert_eq!(
            number_format("rate", &format),
            json!([
                "number-format",
                ["get", "rate"],
                {"locale": "en-US", "max-fraction-digits": 1}
            ])
        );
    }

    #[test]
    fn test_interpolation_from_str() {
        assert_eq!("linear".parse(), Ok(Interpolation::Linear));
        assert!("smooth".parse::<Interpolation>().is_err());
    }
}
