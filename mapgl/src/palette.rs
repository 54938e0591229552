//! Color palettes and ramps.

use color::{AlphaColor, Srgb};

/// Anchors of the viridis palette, evenly spaced.
const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4a89", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6dcd59",
    "#b4de2c", "#fde725",
];

const MAGMA: &[&str] = &[
    "#000004", "#1d1147", "#51127c", "#832681", "#b73779", "#e75263", "#fc8961", "#fec287",
    "#fcfdbf",
];

const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Palette has no colors")]
    Empty,
    #[error(transparent)]
    ColorParse(#[from] color::ParseError),
}

/// Sequential palette used to color classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Palette {
    #[default]
    Viridis,
    Magma,
    Blues,
    /// Any CSS colors. Used verbatim when the count matches, interpolated otherwise.
    Colors(Vec<String>),
}

impl Palette {
    fn anchors(&self) -> Vec<&str> {
        match self {
            Self::Viridis => VIRIDIS.to_vec(),
            Self::Magma => MAGMA.to_vec(),
            Self::Blues => BLUES.to_vec(),
            Self::Colors(colors) => colors.iter().map(String::as_str).collect(),
        }
    }

    /// `n` colors spread over the palette, as lowercase hex strings (or verbatim custom colors).
    ///
    /// # Errors
    ///
    /// Fails for an empty custom palette or colors that cannot be parsed.
    pub fn colors(&self, n: usize) -> Result<Vec<String>, Error> {
        if matches!(self, Self::Colors(colors) if colors.is_empty()) {
            return Err(Error::Empty);
        }

        let anchors = self
            .anchors()
            .into_iter()
            .map(parse_color)
            .collect::<Result<Vec<_>, _>>()?;

        if let Self::Colors(colors) = self {
            if colors.len() == n {
                return Ok(colors.clone());
            }
        }

        Ok(ramp(&anchors, n).into_iter().map(to_hex).collect())
    }
}

pub fn parse_color(text: &str) -> Result<AlphaColor<Srgb>, color::ParseError> {
    text.parse()
}

pub fn to_hex(color: AlphaColor<Srgb>) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

/// Linear interpolation of sRGB components.
pub(crate) fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

pub(crate) fn rgb(color: AlphaColor<Srgb>) -> [f32; 3] {
    let [r, g, b, _] = color.components;
    [r, g, b]
}

/// Sample a piecewise linear gradient through `anchors` at `t` in `[0, 1]`.
pub(crate) fn sample(anchors: &[[f32; 3]], t: f32) -> [f32; 3] {
    match anchors {
        [] => [0.0; 3],
        [single] => *single,
        _ => {
            let scaled = t.clamp(0.0, 1.0) * (anchors.len() - 1) as f32;
            let index = (scaled.floor() as usize).min(anchors.len() - 2);
            mix(anchors[index], anchors[index + 1], scaled - index as f32)
        }
    }
}

/// `n` evenly spaced colors from a gradient.
fn ramp(anchors: &[AlphaColor<Srgb>], n: usize) -> Vec<AlphaColor<Srgb>> {
    let anchors = anchors.iter().copied().map(rgb).collect::<Vec<_>>();
    (0..n)
        .map(|i| {
            let t = if n > 1 {
                i as f32 / (n - 1) as f32
            } else {
                0.0
            };
            let [r, g, b] = sample(&anchors, t);
            AlphaColor::new([r, g, b, 1.0])
        })
        .collect()
}
