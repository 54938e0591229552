//! Addressing maps: a configuration that was not rendered yet, a live map, or one side of a
//! comparison view.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::Error;
use crate::map::Map;
use crate::session::Session;

/// Which JavaScript library renders the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[default]
    Mapbox,
    Maplibre,
}

impl Flavor {
    /// Name of the widget the rendering host instantiates.
    pub fn widget_name(self) -> &'static str {
        match self {
            Self::Mapbox => "mapboxgl",
            Self::Maplibre => "maplibregl",
        }
    }

    pub fn compare_widget_name(self) -> &'static str {
        match self {
            Self::Mapbox => "mapboxgl_compare",
            Self::Maplibre => "maplibre_compare",
        }
    }

    fn proxy_channel(self) -> &'static str {
        match self {
            Self::Mapbox => "mapboxgl-proxy",
            Self::Maplibre => "maplibre-proxy",
        }
    }

    fn compare_proxy_channel(self) -> &'static str {
        match self {
            Self::Mapbox => "mapboxgl-compare-proxy",
            Self::Maplibre => "maplibre-compare-proxy",
        }
    }
}

/// One of the two maps in a comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
        })
    }
}

/// Handle to a map which has already been rendered by the browser.
#[derive(Clone)]
pub struct MapProxy {
    map_id: String,
    flavor: Flavor,
    session: Arc<dyn Session>,
}

impl MapProxy {
    /// # Errors
    ///
    /// Fails if `map_id` is empty.
    pub fn new(
        map_id: impl Into<String>,
        flavor: Flavor,
        session: Arc<dyn Session>,
    ) -> Result<Self, Error> {
        let map_id = map_id.into();
        if map_id.is_empty() {
            return Err(Error::MissingIdentifier("map_id"));
        }
        Ok(Self {
            map_id,
            flavor,
            session,
        })
    }

    /// Proxy for a Mapbox GL JS map.
    ///
    /// # Errors
    ///
    /// Fails if `map_id` is empty.
    pub fn mapbox(map_id: impl Into<String>, session: Arc<dyn Session>) -> Result<Self, Error> {
        Self::new(map_id, Flavor::Mapbox, session)
    }

    /// Proxy for a MapLibre GL JS map.
    ///
    /// # Errors
    ///
    /// Fails if `map_id` is empty.
    pub fn maplibre(map_id: impl Into<String>, session: Arc<dyn Session>) -> Result<Self, Error> {
        Self::new(map_id, Flavor::Maplibre, session)
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub(crate) fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    fn send(&self, message: Value) -> Result<(), Error> {
        log::debug!(
            "Sending '{}' to map '{}'.",
            message["type"].as_str().unwrap_or_default(),
            self.map_id
        );
        let envelope = json!({ "id": self.map_id, "message": message });
        log::trace!("{envelope}");
        self.session
            .send_custom_message(self.flavor.proxy_channel(), envelope)?;
        Ok(())
    }
}

impl fmt::Debug for MapProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapProxy")
            .field("map_id", &self.map_id)
            .field("flavor", &self.flavor)
            .finish_non_exhaustive()
    }
}

/// Handle to an already rendered comparison of two maps.
#[derive(Clone)]
pub struct CompareProxy {
    compare_id: String,
    flavor: Flavor,
    session: Arc<dyn Session>,
}

impl CompareProxy {
    /// # Errors
    ///
    /// Fails if `compare_id` is empty.
    pub fn new(
        compare_id: impl Into<String>,
        flavor: Flavor,
        session: Arc<dyn Session>,
    ) -> Result<Self, Error> {
        let compare_id = compare_id.into();
        if compare_id.is_empty() {
            return Err(Error::MissingIdentifier("compare_id"));
        }
        Ok(Self {
            compare_id,
            flavor,
            session,
        })
    }

    pub fn compare_id(&self) -> &str {
        &self.compare_id
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Address one of the two maps.
    pub fn side(&self, side: Side) -> Target<'_> {
        Target::Paired(self, side)
    }

    pub(crate) fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    fn send(&self, side: Side, message: Value) -> Result<(), Error> {
        log::debug!(
            "Sending '{}' to the {side} map of '{}'.",
            message["type"].as_str().unwrap_or_default(),
            self.compare_id
        );
        let envelope = json!({ "id": self.compare_id, "map": side, "message": message });
        log::trace!("{envelope}");
        self.session
            .send_custom_message(self.flavor.compare_proxy_channel(), envelope)?;
        Ok(())
    }
}

impl fmt::Debug for CompareProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareProxy")
            .field("compare_id", &self.compare_id)
            .field("flavor", &self.flavor)
            .finish_non_exhaustive()
    }
}

/// The map an operation is applied to.
///
/// Operations on [`Target::Unrendered`] change the configuration in place and never talk to the
/// session. Operations on the other two variants send exactly one message.
#[derive(Debug)]
pub enum Target<'a> {
    Unrendered(&'a mut Map),
    Live(&'a MapProxy),
    Paired(&'a CompareProxy, Side),
}

impl<'a> From<&'a mut Map> for Target<'a> {
    fn from(map: &'a mut Map) -> Self {
        Self::Unrendered(map)
    }
}

impl<'a> From<&'a MapProxy> for Target<'a> {
    fn from(proxy: &'a MapProxy) -> Self {
        Self::Live(proxy)
    }
}

impl Target<'_> {
    /// Human readable kind of the handle, used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unrendered(_) => "a map which is not rendered yet",
            Self::Live(_) => "a map proxy",
            Self::Paired(..) => "a compare proxy",
        }
    }

    pub(crate) fn wrong_handle(&self, operation: &'static str) -> Error {
        Error::WrongHandle {
            operation,
            handle: self.kind(),
        }
    }

    /// Serialize and send a message to the rendered map.
    pub(crate) fn send(&self, message: &impl Serialize) -> Result<(), Error> {
        let message = serde_json::to_value(message)?;
        match self {
            Self::Unrendered(_) => Err(self.wrong_handle("sending a message")),
            Self::Live(proxy) => proxy.send(message),
            Self::Paired(proxy, side) => proxy.send(*side, message),
        }
    }

    /// Name of the input the browser uses to report back, e.g. queried features.
    pub(crate) fn input_name(&self, suffix: &str) -> Option<String> {
        match self {
            Self::Unrendered(_) => None,
            Self::Live(proxy) => Some(format!("{}_{suffix}", proxy.map_id)),
            Self::Paired(proxy, side) => Some(format!("{}_{side}_{suffix}", proxy.compare_id)),
        }
    }

    pub(crate) fn session(&self) -> Option<&dyn Session> {
        match self {
            Self::Unrendered(_) => None,
            Self::Live(proxy) => Some(proxy.session()),
            Self::Paired(proxy, _) => Some(proxy.session()),
        }
    }
}
