#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod camera;
pub mod classification;
mod control;
mod error;
pub mod expression;
pub mod geojson;
mod handle;
mod layer;
mod legend;
pub mod lut;
mod map;
mod marker;
mod message;
mod options;
pub mod palette;
mod readback;
mod session;
mod source;
pub mod story;
pub mod styles;
#[cfg(test)]
mod testing;
pub mod turf;

pub use camera::{CameraOptions, FitBounds, Terrain};
pub use control::{Control, DrawTool, Orientation, Position, ScaleUnit};
pub use error::Error;
pub use geojson::{Feature, FeatureCollection};
pub use handle::{CompareProxy, Flavor, MapProxy, Side, Target};
pub use layer::{ClusterOptions, Layer, LayerType, SourceRef};
pub use legend::{Legend, LegendKind, PatchShape};
pub use map::{Compare, CompareMode, Map, WidgetPayload};
pub use marker::Marker;
pub use message::Message;
pub use options::{ACCESS_TOKEN_ENV, MapOptions, ReadbackOptions};
pub use readback::QueryGeometry;
pub use session::{Session, SessionError};
pub use source::{DemEncoding, GeoJsonData, Source};
