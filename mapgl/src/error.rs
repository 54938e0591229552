use std::time::Duration;

use crate::session::SessionError;
use crate::{classification, expression, geojson, lut};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("'{operation}' cannot be used with {handle}")]
    WrongHandle {
        operation: &'static str,
        handle: &'static str,
    },

    #[error("'{operation}' needs exactly one of: {}", arguments.join(", "))]
    ExclusiveArguments {
        operation: &'static str,
        arguments: &'static [&'static str],
    },

    #[error("'{0}' must not be empty")]
    MissingIdentifier(&'static str),

    #[error("No layer with id '{0}'")]
    UnknownLayer(String),

    #[error("Property '{property}' does not belong to a '{layer_type}' layer")]
    PropertyMismatch {
        layer_type: &'static str,
        property: String,
    },

    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    #[error("Mapbox access token is missing. Pass it explicitly or set MAPBOX_PUBLIC_TOKEN.")]
    MissingAccessToken,

    #[error("Session refused the message: {0}")]
    Session(#[from] SessionError),

    #[error("No value for input '{input}' arrived within {after:?}")]
    Timeout { input: String, after: Duration },

    #[error("Session dropped the callback for input '{input}'")]
    ChannelClosed { input: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Expression(#[from] expression::Error),

    #[error(transparent)]
    Classification(#[from] classification::Error),

    #[error(transparent)]
    Lut(#[from] lut::Error),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}
