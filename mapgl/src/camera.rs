//! Camera, projection and style-wide settings.

use serde::Serialize;
use serde_json::{Value, json};

use crate::Error;
use crate::handle::Target;
use crate::message::Message;

/// Camera target of `fly_to`, `ease_to` and `jump_to`. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Animation duration in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl CameraOptions {
    pub fn centered(center: [f64; 2], zoom: f64) -> Self {
        Self {
            center: Some(center),
            zoom: Some(zoom),
            ..Default::default()
        }
    }
}

/// Bounds the map is fitted to on load, as `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitBounds {
    pub bounds: [f64; 4],
    pub animate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Terrain {
    pub source: String,
    pub exaggeration: f64,
}

fn validate_bounds(bounds: [f64; 4]) -> Result<(), Error> {
    let [west, south, east, north] = bounds;
    let valid = [west, east].iter().all(|lng| (-180.0..=180.0).contains(lng))
        && [south, north].iter().all(|lat| (-90.0..=90.0).contains(lat))
        && south <= north;
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument {
            argument: "bounds",
            reason: format!("{bounds:?} is not [west, south, east, north]"),
        })
    }
}

impl Target<'_> {
    /// Animate the camera along a flight path.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn fly_to(&mut self, camera: CameraOptions) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.apply_camera(&camera);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::FlyTo { camera }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn ease_to(&mut self, camera: CameraOptions) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.apply_camera(&camera);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::EaseTo { camera }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn jump_to(&mut self, camera: CameraOptions) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.apply_camera(&camera);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::JumpTo { camera }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_view(&mut self, center: [f64; 2], zoom: f64) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.options.center = center;
                map.options.zoom = zoom;
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetView { center, zoom }),
        }
    }

    /// # Errors
    ///
    /// Fails for invalid bounds, or if the session refuses the message.
    pub fn fit_bounds(
        &mut self,
        bounds: [f64; 4],
        animate: bool,
        padding: Option<f64>,
    ) -> Result<(), Error> {
        validate_bounds(bounds)?;
        match self {
            Self::Unrendered(map) => {
                map.fit_bounds = Some(FitBounds {
                    bounds,
                    animate,
                    padding,
                });
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::FitBounds {
                bounds,
                animate,
                padding,
            }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_projection(&mut self, projection: &str) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.options.projection = Some(projection.to_owned());
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetProjection {
                projection: projection.to_owned(),
            }),
        }
    }

    /// Elevate the map using a `raster-dem` source.
    ///
    /// # Errors
    ///
    /// Fails if `source` is empty, or if the session refuses the message.
    pub fn set_terrain(&mut self, source: &str, exaggeration: f64) -> Result<(), Error> {
        if source.is_empty() {
            return Err(Error::MissingIdentifier("source"));
        }
        match self {
            Self::Unrendered(map) => {
                map.terrain = Some(Terrain {
                    source: source.to_owned(),
                    exaggeration,
                });
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetTerrain {
                source: source.to_owned(),
                exaggeration,
            }),
        }
    }

    /// Atmospheric fog, e.g. `{"range": [1, 10], "color": "white"}`.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_fog(&mut self, fog: Value) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.fog = Some(fog);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetFog { fog }),
        }
    }

    /// Replace the basemap style. `diff` asks the library to apply only the changes.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_style(
        &mut self,
        style: &str,
        config: Option<Value>,
        diff: bool,
    ) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.options.style = Some(json!(style));
                if let Some(config) = config {
                    map.options.extra.insert("config".to_owned(), config);
                }
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetStyle {
                style: style.to_owned(),
                config,
                diff,
            }),
        }
    }

    /// Change a configuration property of an imported style, e.g. `lightPreset` of the
    /// Mapbox Standard `basemap` import.
    ///
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn set_config_property(
        &mut self,
        import_id: &str,
        config_name: &str,
        value: Value,
    ) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                let config = map
                    .options
                    .extra
                    .entry("config")
                    .or_insert_with(|| json!({}));
                if !config.is_object() {
                    *config = json!({});
                }
                let import = &mut config[import_id];
                if !import.is_object() {
                    *import = json!({});
                }
                import[config_name] = value;
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::SetConfigProperty {
                import_id: import_id.to_owned(),
                config_name: config_name.to_owned(),
                value,
            }),
        }
    }
}
