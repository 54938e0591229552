use std::time::Duration;

use serde_json::{Map as JsonMap, Value};

use crate::handle::Flavor;
use crate::styles::{CartoStyle, MapboxStyle};

/// Environment variable consulted when no Mapbox access token is given explicitly.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_PUBLIC_TOKEN";

/// Initial state of a map, passed to the map constructor of the JavaScript library.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Style URL or inline style document. `None` picks a default matching the [`Flavor`].
    pub style: Option<Value>,

    /// Initial center as `[longitude, latitude]`.
    pub center: [f64; 2],

    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,

    /// Map projection, e.g. `globe` or `mercator`.
    pub projection: Option<String>,

    /// Mapbox access token. Ignored by MapLibre.
    ///
    /// If not set, [`ACCESS_TOKEN_ENV`] is read when the map is rendered.
    pub access_token: Option<String>,

    /// CSS width and height of the widget.
    pub width: Option<String>,
    pub height: Option<String>,

    /// Keep the camera in the URL hash.
    pub hash: bool,

    pub attribution_control: bool,

    /// Any other option of the map constructor, passed verbatim.
    pub extra: JsonMap<String, Value>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            style: None,
            center: [0.0, 0.0],
            zoom: 0.0,
            bearing: 0.0,
            pitch: 0.0,
            projection: None,
            access_token: None,
            width: None,
            height: None,
            hash: false,
            attribution_control: true,
            extra: JsonMap::new(),
        }
    }
}

impl MapOptions {
    pub(crate) fn style_or_default(&self, flavor: Flavor) -> Value {
        self.style.clone().unwrap_or_else(|| {
            Value::String(match flavor {
                Flavor::Mapbox => MapboxStyle::default().url(),
                Flavor::Maplibre => CartoStyle::default().url(),
            })
        })
    }

    /// Explicit token, or the one from the environment.
    pub(crate) fn resolve_access_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|token| !token.is_empty())
    }
}

/// Controls how results reported back by the browser are awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadbackOptions {
    /// How long to wait for the browser to answer a query.
    pub timeout: Duration,
}

impl Default for ReadbackOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
        }
    }
}
