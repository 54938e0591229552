//! Classify numeric data into colored classes for choropleth maps.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::expression;
use crate::legend::Legend;
use crate::palette::{self, Palette};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No data to classify")]
    Empty,
    #[error("All values are missing")]
    AllMissing,
    #[error("Number of classes must be at least 1")]
    NoClasses,
    #[error(transparent)]
    Palette(#[from] palette::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    EqualInterval,
    Quantile,
    Jenks,
}

/// Graceful degradation that happened while classifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Data had a single unique value, so there is a single class.
    SingleValue,
    /// Fewer classes than requested could be formed.
    ReducedClasses { requested: usize, actual: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleValue => write!(f, "data has a single unique value, using one class"),
            Self::ReducedClasses { requested, actual } => {
                write!(f, "requested {requested} classes, but only {actual} can be formed")
            }
        }
    }
}

/// Result of a classification: `n + 1` breaks delimiting `n` classes, one color and one label per
/// class.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub method: Method,
    pub breaks: Vec<f64>,
    pub colors: Vec<String>,
    pub labels: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl Classification {
    pub fn n_classes(&self) -> usize {
        self.colors.len()
    }

    /// Rewrite labels rounding to `digits` decimal places.
    pub fn with_label_digits(mut self, digits: usize) -> Self {
        self.labels = labels(&self.breaks, digits);
        self
    }

    /// `step` expression coloring features by `column`.
    pub fn step_expression(&self, column: &str) -> Value {
        let mut expression = vec![json!("step"), expression::get(column)];
        for (i, color) in self.colors.iter().enumerate() {
            if i > 0 {
                expression.push(json!(self.breaks[i]));
            }
            expression.push(json!(color));
        }
        Value::Array(expression)
    }

    /// Categorical legend listing the classes.
    pub fn legend(&self, title: impl Into<String>) -> Legend {
        Legend::from_parts_unchecked(
            title.into(),
            crate::legend::LegendKind::Categorical,
            self.labels.iter().map(|label| json!(label)).collect(),
            self.colors.clone(),
        )
    }
}

/// Classes of equal width spanning `[min, max]`.
///
/// # Errors
///
/// Fails when there is no usable data, `n` is zero, or the palette is invalid.
pub fn equal_interval(data: &[f64], n: usize, palette: &Palette) -> Result<Classification, Error> {
    classify(data, n, Method::EqualInterval, palette)
}

/// Classes holding (roughly) the same number of observations.
///
/// # Errors
///
/// Fails when there is no usable data, `n` is zero, or the palette is invalid.
pub fn quantile(data: &[f64], n: usize, palette: &Palette) -> Result<Classification, Error> {
    classify(data, n, Method::Quantile, palette)
}

/// Jenks natural breaks, minimizing the variance within classes.
///
/// # Errors
///
/// Fails when there is no usable data, `n` is zero, or the palette is invalid.
pub fn jenks(data: &[f64], n: usize, palette: &Palette) -> Result<Classification, Error> {
    classify(data, n, Method::Jenks, palette)
}

/// Classify `data` into at most `n` classes. Non-finite values count as missing.
///
/// # Errors
///
/// Fails when there is no usable data, `n` is zero, or the palette is invalid.
pub fn classify(
    data: &[f64],
    n: usize,
    method: Method,
    palette: &Palette,
) -> Result<Classification, Error> {
    let breaks = breaks(data, n, method)?;
    let mut warnings = Vec::new();

    let unique = breaks.unique;
    let breaks = breaks.values;
    let classes = breaks.len() - 1;

    if unique == 1 {
        warnings.push(Warning::SingleValue);
    } else if classes < n {
        warnings.push(Warning::ReducedClasses {
            requested: n,
            actual: classes,
        });
    }

    for warning in &warnings {
        log::warn!("{method:?} classification: {warning}.");
    }

    Ok(Classification {
        method,
        colors: palette.colors(classes)?,
        labels: labels(&breaks, 2),
        breaks,
        warnings,
    })
}

struct Breaks {
    values: Vec<f64>,
    unique: usize,
}

fn breaks(data: &[f64], n: usize, method: Method) -> Result<Breaks, Error> {
    if data.is_empty() {
        return Err(Error::Empty);
    }
    if n == 0 {
        return Err(Error::NoClasses);
    }

    let mut sorted = data
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>();
    if sorted.is_empty() {
        return Err(Error::AllMissing);
    }
    sorted.sort_by(f64::total_cmp);

    let mut distinct = sorted.clone();
    distinct.dedup();
    let unique = distinct.len();

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if unique == 1 {
        return Ok(Breaks {
            values: vec![min, max],
            unique,
        });
    }

    let n = n.min(unique);
    let mut values = match method {
        Method::EqualInterval => {
            let width = (max - min) / n as f64;
            (0..=n)
                .map(|i| if i == n { max } else { min + i as f64 * width })
                .collect()
        }
        Method::Quantile => (0..=n)
            .map(|i| quantile_type7(&sorted, i as f64 / n as f64))
            .collect(),
        Method::Jenks => jenks_breaks(&sorted, n),
    };
    if method != Method::Jenks {
        values.dedup();
    }

    Ok(Breaks { values, unique })
}

/// Sample quantile with linear interpolation between order statistics (Hyndman and Fan type 7).
fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    sorted[lower] + (h - lower as f64) * (sorted[upper] - sorted[lower])
}

/// Fisher-Jenks optimal classification of sorted data into `k` classes.
fn jenks_breaks(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();

    // Both matrices are 1-based, as in the original formulation.
    let mut lower_limits = vec![vec![0usize; k + 1]; n + 1];
    let mut variances = vec![vec![f64::INFINITY; k + 1]; n + 1];

    for j in 1..=k {
        lower_limits[1][j] = 1;
        variances[1][j] = 0.0;
    }

    for l in 2..=n {
        let mut sum = 0.0;
        let mut sum_squares = 0.0;
        let mut variance = 0.0;

        for m in 1..=l {
            let lower = l - m + 1;
            let value = sorted[lower - 1];
            sum += value;
            sum_squares += value * value;
            variance = sum_squares - sum * sum / m as f64;

            let previous = lower - 1;
            if previous != 0 {
                for j in 2..=k {
                    let candidate = variance + variances[previous][j - 1];
                    if variances[l][j] >= candidate {
                        lower_limits[l][j] = lower;
                        variances[l][j] = candidate;
                    }
                }
            }
        }

        lower_limits[l][1] = 1;
        variances[l][1] = variance;
    }

    // Each break is the lowest value of its class, so `step` colors every value like its label.
    let mut lower_bounds = vec![0.0; k];
    let mut end = n;
    for j in (2..=k).rev() {
        let start = lower_limits[end][j].max(2);
        lower_bounds[j - 1] = sorted[start - 1];
        end = start - 1;
    }

    let mut breaks = vec![sorted[0]];
    for &bound in &lower_bounds[1..] {
        // Empty classes, or a run of equal values split between two classes.
        if breaks.last().is_some_and(|last| bound > *last) {
            breaks.push(bound);
        }
    }
    breaks.push(sorted[n - 1]);
    breaks
}

fn labels(breaks: &[f64], digits: usize) -> Vec<String> {
    breaks
        .windows(2)
        .map(|pair| {
            format!(
                "{} - {}",
                format_number(pair[0], digits),
                format_number(pair[1], digits)
            )
        })
        .collect()
}

/// Round to `digits` decimal places, dropping trailing zeros.
fn format_number(value: f64, digits: usize) -> String {
    let formatted = format!("{value:.digits$}");
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_owned()
    } else {
        formatted
    }
}

/// Continuous color scale built from classification breaks.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousScale {
    pub breaks: Vec<f64>,
    pub colors: Vec<String>,
    pub expression: Value,
    pub warnings: Vec<Warning>,
}

impl ContinuousScale {
    /// Continuous legend spanning the breaks.
    pub fn legend(&self, title: impl Into<String>) -> Legend {
        Legend::from_parts_unchecked(
            title.into(),
            crate::legend::LegendKind::Continuous,
            self.breaks.iter().map(|value| json!(value)).collect(),
            self.colors.clone(),
        )
    }
}

/// Linear `interpolate` expression with one color stop per break.
///
/// # Errors
///
/// Fails when there is no usable data, `n` is zero, or the palette is invalid.
pub fn interpolate_palette(
    data: &[f64],
    column: &str,
    method: Method,
    n: usize,
    palette: &Palette,
) -> Result<ContinuousScale, Error> {
    let classification = classify(data, n, method, &Palette::Viridis)?;
    let breaks = classification.breaks;
    let colors = palette.colors(breaks.len())?;

    let mut expression = vec![json!("interpolate"), json!(["linear"]), expression::get(column)];
    for (stop, color) in breaks.iter().zip(&colors) {
        expression.push(json!(stop));
        expression.push(json!(color));
    }

    Ok(ContinuousScale {
        breaks,
        colors,
        expression: Value::Array(expression),
        warnings: classification.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn equal_interval_on_evenly_spaced_data() {
        let result = equal_interval(&[10., 20., 30., 40., 50.], 4, &Palette::default()).unwrap();

        assert_eq!(result.breaks, vec![10., 20., 30., 40., 50.]);
        assert_eq!(result.n_classes(), 4);
        assert_eq!(result.labels, vec!["10 - 20", "20 - 30", "30 - 40", "40 - 50"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn equal_interval_spans_exactly_min_to_max() {
        let data = [0.3, 7.1, 2.2, 9.9, 4.4, 5.5, 1.0];
        for n in 2..6 {
            let result = equal_interval(&data, n, &Palette::default()).unwrap();
            assert_eq!(result.breaks.len(), n + 1);
            assert_eq!(result.breaks[0], 0.3);
            assert_eq!(result.breaks[n], 9.9);
            assert!(result.breaks.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn quantile_breaks() {
        let result = quantile(&[1., 2., 3., 4., 5., 6., 7., 8., 9.], 4, &Palette::Blues).unwrap();
        assert_eq!(result.breaks, vec![1., 3., 5., 7., 9.]);
    }

    #[test]
    fn quantile_with_duplicates_reduces_classes() {
        let result = quantile(&[1., 1., 1., 1., 1., 1., 2., 3.], 4, &Palette::default()).unwrap();

        assert!(result.n_classes() < 4);
        assert_eq!(result.breaks, vec![1., 3.]);
        assert_eq!(
            result.warnings,
            vec![Warning::ReducedClasses {
                requested: 4,
                actual: 1
            }]
        );
    }

    #[test]
    fn fewer_unique_values_than_classes() {
        let result = equal_interval(&[1., 2., 2., 3.], 5, &Palette::default()).unwrap();
        assert_eq!(result.n_classes(), 3);
        assert_eq!(
            result.warnings,
            vec![Warning::ReducedClasses {
                requested: 5,
                actual: 3
            }]
        );
    }

    #[test]
    fn single_value_degrades_to_one_class() {
        let result = jenks(&[4., 4., 4.], 3, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![4., 4.]);
        assert_eq!(result.labels, vec!["4 - 4"]);
        assert_eq!(result.warnings, vec![Warning::SingleValue]);
    }

    #[test]
    fn missing_values_are_dropped() {
        let result = equal_interval(&[f64::NAN, 1., 3., f64::INFINITY], 2, &Palette::default())
            .unwrap();
        assert_eq!(result.breaks, vec![1., 2., 3.]);
    }

    #[test]
    fn empty_and_missing_input_is_an_error() {
        assert!(matches!(
            quantile(&[], 3, &Palette::default()),
            Err(Error::Empty)
        ));
        assert!(matches!(
            quantile(&[f64::NAN, f64::NAN], 3, &Palette::default()),
            Err(Error::AllMissing)
        ));
        assert!(matches!(
            quantile(&[1., 2.], 0, &Palette::default()),
            Err(Error::NoClasses)
        ));
    }

    #[test]
    fn jenks_finds_natural_groups() {
        let data = [1., 2., 3., 10., 11., 12., 20., 21., 22.];
        let result = jenks(&data, 3, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![1., 10., 20., 22.]);
        assert_eq!(result.labels, vec!["1 - 10", "10 - 20", "20 - 22"]);
        assert!(result.warnings.is_empty());
    }

    /// Color `step` gives to `value`.
    fn step_color(expression: &Value, value: f64) -> &str {
        let stops = expression.as_array().unwrap();
        let mut color = stops[2].as_str().unwrap();
        for pair in stops[3..].chunks(2) {
            if value >= pair[0].as_f64().unwrap() {
                color = pair[1].as_str().unwrap();
            }
        }
        color
    }

    #[test]
    fn jenks_step_colors_match_classes() {
        let data = [1., 2., 3., 10., 11., 12., 20., 21., 22.];
        let result = jenks(&data, 3, &Palette::default()).unwrap();
        let expression = result.step_expression("v");

        for (value, class) in data.iter().zip([0, 0, 0, 1, 1, 1, 2, 2, 2]) {
            assert_eq!(
                step_color(&expression, *value),
                result.colors[class],
                "{value}"
            );
        }
    }

    #[test]
    fn jenks_keeps_single_value_classes() {
        let result = jenks(&[0., 10., 11., 12., 20., 21., 22.], 3, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![0., 10., 20., 22.]);
        assert_eq!(result.n_classes(), 3);
        assert!(result.warnings.is_empty());

        let result = jenks(&[1., 2., 3., 100.], 2, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![1., 100., 100.]);
        assert_eq!(result.n_classes(), 2);
        let expression = result.step_expression("v");
        assert_eq!(step_color(&expression, 3.), result.colors[0]);
        assert_eq!(step_color(&expression, 100.), result.colors[1]);
    }

    #[test]
    fn jenks_on_unordered_visitor_counts() {
        let result = jenks(&[52000., 1200., 31000., 44000.], 3, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![1200., 31000., 44000., 52000.]);
        assert_eq!(result.n_classes(), 3);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn jenks_does_not_split_equal_values() {
        let data = [1., 1., 2., 2., 2., 3., 10., 10.];
        let result = jenks(&data, 3, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![1., 2., 10., 10.]);
        assert!(result.warnings.is_empty());

        let expression = result.step_expression("v");
        for (value, class) in data.iter().zip([0, 0, 1, 1, 1, 1, 2, 2]) {
            assert_eq!(step_color(&expression, *value), result.colors[class]);
        }
    }

    #[test]
    fn jenks_clamps_classes_to_unique_values() {
        let result = jenks(&[1., 1., 2., 2.], 5, &Palette::default()).unwrap();
        assert_eq!(result.breaks, vec![1., 2., 2.]);
        assert_eq!(
            result.warnings,
            vec![Warning::ReducedClasses {
                requested: 5,
                actual: 2
            }]
        );
    }

    #[test]
    fn labels_round_and_trim() {
        let result = equal_interval(&[0., 0.5, 1.], 3, &Palette::default()).unwrap();
        assert_eq!(result.labels, vec!["0 - 0.33", "0.33 - 0.67", "0.67 - 1"]);

        let result = result.with_label_digits(1);
        assert_eq!(result.labels[0], "0 - 0.3");
    }

    #[test]
    fn step_expression_interleaves_breaks_and_colors() {
        let palette = Palette::Colors(vec!["#aaa".to_owned(), "#bbb".to_owned()]);
        let result = equal_interval(&[0., 10.], 2, &palette).unwrap();

        assert_eq!(
            result.step_expression("density"),
            json!(["step", ["get", "density"], "#aaa", 5.0, "#bbb"])
        );
    }

    #[test]
    fn interpolate_palette_has_a_stop_per_break() {
        let scale = interpolate_palette(
            &[0., 5., 10.],
            "value",
            Method::EqualInterval,
            2,
            &Palette::Colors(vec!["white".to_owned(), "gray".to_owned(), "black".to_owned()]),
        )
        .unwrap();

        assert_eq!(scale.breaks.len(), 3);
        assert_relative_eq!(scale.breaks[1], 5.0);
        assert_eq!(
            scale.expression,
            json!([
                "interpolate", ["linear"], ["get", "value"],
                0.0, "white", 5.0, "gray", 10.0, "black"
            ])
        );
        assert_eq!(scale.legend("Value").colors.len(), 3);
    }
}
