//! Color look-up tables for theming the basemap.
//!
//! A LUT of size `n` maps every cell of an `n × n × n` RGB grid to a new color. It is stored as
//! an image of `n` tiles laid out horizontally, each `n × n` pixels: the blue channel selects
//! the tile, red grows along x and green along y. Mapbox GL JS reads such an image as the
//! `color-theme` of a style.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use serde::Serialize;

use crate::Error as CrateError;
use crate::handle::Target;
use crate::message::Message;
use crate::palette::{mix, parse_color, rgb, sample};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Intensity must be within [0, 1], got {0}")]
    InvalidIntensity(f32),
    #[error("Unsupported LUT size {0}, expected 16, 32 or 64")]
    UnsupportedSize(u32),
    #[error("Luminosity mapping needs at least one color")]
    EmptyPalette,
    #[error(transparent)]
    ColorParse(#[from] color::ParseError),
    #[error(transparent)]
    Encode(#[from] image::ImageError),
}

/// Cells per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LutSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl LutSize {
    pub fn cells(self) -> u32 {
        match self {
            Self::Small => 16,
            Self::Medium => 32,
            Self::Large => 64,
        }
    }
}

impl TryFrom<u32> for LutSize {
    type Error = Error;

    fn try_from(cells: u32) -> Result<Self, Self::Error> {
        match cells {
            16 => Ok(Self::Small),
            32 => Ok(Self::Medium),
            64 => Ok(Self::Large),
            other => Err(Error::UnsupportedSize(other)),
        }
    }
}

/// How input colors are remapped. `intensity` blends between the input (0) and the fully
/// transformed color (1).
#[derive(Debug, Clone, PartialEq)]
pub enum LutMethod {
    /// Multiply by a color.
    Tint { color: String, intensity: f32 },
    /// Replace the hue with `color`, keeping luminance.
    Replace { color: String, intensity: f32 },
    /// Map luminance onto a gradient between two colors.
    Duotone {
        shadow: String,
        highlight: String,
        intensity: f32,
    },
    Tritone {
        shadow: String,
        midtone: String,
        highlight: String,
        intensity: f32,
    },
    /// Map luminance onto a gradient through any number of colors.
    Luminosity { palette: Vec<String>, intensity: f32 },
}

/// Transform resolved from a [`LutMethod`], with parsed colors.
enum Transform {
    Tint([f32; 3]),
    Replace([f32; 3]),
    Gradient(Vec<[f32; 3]>),
}

fn parse_rgb(text: &str) -> Result<[f32; 3], Error> {
    Ok(rgb(parse_color(text)?))
}

fn luminance([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

impl LutMethod {
    fn intensity(&self) -> f32 {
        match self {
            Self::Tint { intensity, .. }
            | Self::Replace { intensity, .. }
            | Self::Duotone { intensity, .. }
            | Self::Tritone { intensity, .. }
            | Self::Luminosity { intensity, .. } => *intensity,
        }
    }

    fn transform(&self) -> Result<Transform, Error> {
        Ok(match self {
            Self::Tint { color, .. } => Transform::Tint(parse_rgb(color)?),
            Self::Replace { color, .. } => Transform::Replace(parse_rgb(color)?),
            Self::Duotone {
                shadow, highlight, ..
            } => Transform::Gradient(vec![parse_rgb(shadow)?, parse_rgb(highlight)?]),
            Self::Tritone {
                shadow,
                midtone,
                highlight,
                ..
            } => Transform::Gradient(vec![
                parse_rgb(shadow)?,
                parse_rgb(midtone)?,
                parse_rgb(highlight)?,
            ]),
            Self::Luminosity { palette, .. } => {
                if palette.is_empty() {
                    return Err(Error::EmptyPalette);
                }
                Transform::Gradient(
                    palette
                        .iter()
                        .map(|color| parse_rgb(color))
                        .collect::<Result<_, _>>()?,
                )
            }
        })
    }
}

impl Transform {
    fn apply(&self, input: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Tint(color) => [input[0] * color[0], input[1] * color[1], input[2] * color[2]],
            Self::Replace(color) => {
                let target = luminance(*color);
                if target <= f32::EPSILON {
                    *color
                } else {
                    let scale = luminance(input) / target;
                    color.map(|c| c * scale)
                }
            }
            Self::Gradient(anchors) => sample(anchors, luminance(input)),
        }
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Synthesize the LUT image.
///
/// # Errors
///
/// Fails for an intensity outside of `[0, 1]` or colors which cannot be parsed, before any
/// pixel is computed.
pub fn generate_lut_image(method: &LutMethod, size: LutSize) -> Result<RgbImage, Error> {
    let intensity = method.intensity();
    if !(0.0..=1.0).contains(&intensity) {
        return Err(Error::InvalidIntensity(intensity));
    }
    let transform = method.transform()?;

    let n = size.cells();
    let step = 1.0 / (n - 1) as f32;
    let mut image = RgbImage::new(n * n, n);
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                let input = [r as f32 * step, g as f32 * step, b as f32 * step];
                let output = mix(input, transform.apply(input), intensity);
                image.put_pixel(b * n + r, g, Rgb(output.map(channel)));
            }
        }
    }
    Ok(image)
}

/// Synthesize the LUT and encode it as a `data:image/png;base64,` URI.
///
/// # Errors
///
/// See [`generate_lut_image`], plus PNG encoding failures.
pub fn generate_lut(method: &LutMethod, size: LutSize) -> Result<String, Error> {
    let image = generate_lut_image(method, size)?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    log::debug!(
        "Generated {}×{} LUT, {} bytes of PNG.",
        image.width(),
        image.height(),
        png.len()
    );
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

/// A LUT applied to the whole basemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorTheme {
    /// `data:` URI of the LUT image.
    pub data: String,
}

impl ColorTheme {
    /// # Errors
    ///
    /// See [`generate_lut`].
    pub fn new(method: &LutMethod, size: LutSize) -> Result<Self, Error> {
        Ok(Self {
            data: generate_lut(method, size)?,
        })
    }
}

impl Target<'_> {
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_color_theme(&mut self, theme: ColorTheme) -> Result<(), CrateError> {
        match self {
            Self::Unrendered(map) => {
                map.color_theme = Some(theme);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => {
                self.send(&Message::SetColorTheme { data: theme.data })
            }
        }
    }
}
