use serde::Serialize;

use crate::Error;
use crate::handle::Target;
use crate::message::Message;

/// Pin placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lng: f64,
    pub lat: f64,
    pub color: String,
    pub rotation: f64,
    pub draggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Marker {
    /// # Errors
    ///
    /// Fails for coordinates outside of the valid longitude and latitude ranges.
    pub fn new(lng: f64, lat: f64) -> Result<Self, Error> {
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidArgument {
                argument: "position",
                reason: format!("({lng}, {lat}) is not a valid longitude and latitude"),
            });
        }
        Ok(Self {
            lng,
            lat,
            color: "red".to_owned(),
            rotation: 0.0,
            draggable: false,
            popup: None,
            id: None,
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
        self.popup = Some(popup.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Target<'_> {
    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn add_markers(&mut self, markers: Vec<Marker>) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.markers.extend(markers);
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::AddMarkers { markers }),
        }
    }

    /// # Errors
    ///
    /// Fails if the session refuses the message.
    pub fn clear_markers(&mut self) -> Result<(), Error> {
        match self {
            Self::Unrendered(map) => {
                map.markers.clear();
                Ok(())
            }
            Self::Live(_) | Self::Paired(..) => self.send(&Message::ClearMarkers),
        }
    }
}
