//! Asking a rendered map for features.
//!
//! The browser answers a query by setting a host input named after the map, e.g.
//! `{map_id}_queried_features`. The callback for that input is registered before the query is
//! sent, so a fast answer cannot be missed, and awaited for at most
//! [`ReadbackOptions::timeout`].

use futures::channel::oneshot;
use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::geojson::FeatureCollection;
use crate::handle::Target;
use crate::message::Message;
use crate::options::ReadbackOptions;

const QUERIED_FEATURES: &str = "queried_features";
const DRAWN_FEATURES: &str = "drawn_features";

/// Area of the viewport to query, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryGeometry {
    Point([f64; 2]),
    /// Opposite corners of a box.
    Box([[f64; 2]; 2]),
}

impl Target<'_> {
    /// Features rendered within `geometry` (the whole viewport when `None`), optionally limited to
    /// some layers and filtered.
    ///
    /// # Errors
    ///
    /// Fails on an unrendered map, if the session refuses the query, if no answer arrives in
    /// time, or if the answer is not GeoJSON. No features found is an empty collection.
    pub async fn query_rendered_features(
        &self,
        geometry: Option<QueryGeometry>,
        layers: Option<&[&str]>,
        filter: Option<Value>,
        options: ReadbackOptions,
    ) -> Result<FeatureCollection, Error> {
        let message = Message::QueryRenderedFeatures {
            geometry: geometry.map(serde_json::to_value).transpose()?,
            layers: layers.map(|layers| layers.iter().map(|&id| id.to_owned()).collect()),
            filter,
        };
        self.request("query_rendered_features", QUERIED_FEATURES, &message, options)
            .await
    }

    /// Features drawn by the user with the draw control.
    ///
    /// # Errors
    ///
    /// Same as [`Target::query_rendered_features`].
    pub async fn get_drawn_features(
        &self,
        options: ReadbackOptions,
    ) -> Result<FeatureCollection, Error> {
        self.request(
            "get_drawn_features",
            DRAWN_FEATURES,
            &Message::GetDrawnFeatures,
            options,
        )
        .await
    }

    /// Last drawn features the browser reported, without asking again.
    ///
    /// # Errors
    ///
    /// Fails on an unrendered map, or if the reported value is not GeoJSON.
    pub fn last_drawn_features(&self) -> Result<Option<FeatureCollection>, Error> {
        let (Some(session), Some(input)) = (self.session(), self.input_name(DRAWN_FEATURES)) else {
            return Err(self.wrong_handle("last_drawn_features"));
        };
        session
            .input(&input)
            .map(|value| FeatureCollection::from_value(&value))
            .transpose()
            .map_err(Error::from)
    }

    /// # Errors
    ///
    /// Fails on an unrendered map, or if the session refuses the message.
    pub fn clear_drawn_features(&self) -> Result<(), Error> {
        match self {
            Self::Unrendered(_) => Err(self.wrong_handle("clear_drawn_features")),
            Self::Live(_) | Self::Paired(..) => self.send(&Message::ClearDrawnFeatures),
        }
    }

    async fn request(
        &self,
        operation: &'static str,
        suffix: &str,
        message: &Message,
        options: ReadbackOptions,
    ) -> Result<FeatureCollection, Error> {
        let (Some(session), Some(input)) = (self.session(), self.input_name(suffix)) else {
            return Err(self.wrong_handle(operation));
        };

        let answer = session.on_input_change(&input);
        self.send(message)?;

        let value = match tokio::time::timeout(options.timeout, answer).await {
            Ok(Ok(value)) => value,
            Ok(Err(oneshot::Canceled)) => return Err(Error::ChannelClosed { input }),
            Err(_) => {
                log::warn!("No answer to '{operation}' within {:?}.", options.timeout);
                return Err(Error::Timeout {
                    input,
                    after: options.timeout,
                });
            }
        };

        let features = FeatureCollection::from_value(&value)?;
        log::debug!("'{input}' reported {} features.", features.len());
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::handle::{CompareProxy, Flavor, MapProxy, Side};
    use crate::map::Map;
    use crate::testing::RecordingSession;

    fn short() -> ReadbackOptions {
        ReadbackOptions {
            timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn query_returns_reported_features() {
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::maplibre("map", session.clone()).unwrap();
        session.reply_on_send(
            "map_queried_features",
            // Answers arrive as GeoJSON text.
            json!(
                json!({
                    "type": "FeatureCollection",
                    "features": [{
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [17.0, 51.0]},
                        "properties": {"name": "Wrocław"},
                    }],
                })
                .to_string()
            ),
        );

        let features = Target::from(&proxy)
            .query_rendered_features(
                Some(QueryGeometry::Point([10.0, 20.0])),
                Some(&["cities"]),
                None,
                short(),
            )
            .await
            .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features.features[0].properties["name"], "Wrocław");

        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].payload["message"],
            json!({
                "type": "query_rendered_features",
                "geometry": [10.0, 20.0],
                "layers": ["cities"],
            })
        );
    }

    #[tokio::test]
    async fn null_answer_is_an_empty_result() {
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::maplibre("map", session.clone()).unwrap();
        session.reply_on_send("map_queried_features", json!("null"));

        let features = Target::from(&proxy)
            .query_rendered_features(None, None, None, short())
            .await
            .unwrap();
        assert!(features.is_empty());
    }

    #[tokio::test]
    async fn silence_is_a_timeout() {
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::maplibre("map", session.clone()).unwrap();

        let result = Target::from(&proxy).get_drawn_features(short()).await;
        assert!(matches!(
            result,
            Err(Error::Timeout { input, .. }) if input == "map_drawn_features"
        ));
        assert_eq!(session.sent().len(), 1);
    }

    #[tokio::test]
    async fn dropped_callback_is_reported() {
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::maplibre("map", session.clone()).unwrap();
        session.cancel_on_send("map_drawn_features");

        let result = Target::from(&proxy).get_drawn_features(short()).await;
        assert!(matches!(result, Err(Error::ChannelClosed { .. })));
    }

    #[tokio::test]
    async fn compare_side_uses_its_own_input() {
        let session = Arc::new(RecordingSession::default());
        let compare = CompareProxy::new("cmp", Flavor::Mapbox, session.clone()).unwrap();
        session.reply_on_send(
            "cmp_after_drawn_features",
            json!({"type": "FeatureCollection", "features": []}),
        );

        let features = compare
            .side(Side::After)
            .get_drawn_features(short())
            .await
            .unwrap();
        assert!(features.is_empty());
        assert_eq!(session.sent()[0].payload["map"], "after");
    }

    #[tokio::test]
    async fn unrendered_map_cannot_be_queried() {
        let mut map = Map::maplibre();
        let result = map.target().get_drawn_features(short()).await;
        assert!(matches!(result, Err(Error::WrongHandle { .. })));
        assert!(matches!(
            map.target().clear_drawn_features(),
            Err(Error::WrongHandle { .. })
        ));
    }

    #[test]
    fn last_drawn_features_reads_the_input() {
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::maplibre("map", session.clone()).unwrap();
        let target = Target::from(&proxy);

        assert!(target.last_drawn_features().unwrap().is_none());
        session.set_input(
            "map_drawn_features",
            json!({"type": "FeatureCollection", "features": []}),
        );
        assert!(target.last_drawn_features().unwrap().unwrap().is_empty());
        assert!(session.sent().is_empty());
    }

    #[test]
    fn clearing_drawn_features_needs_only_a_shared_target() {
        let session = Arc::new(RecordingSession::default());
        let compare = CompareProxy::new("cmp", Flavor::Maplibre, session.clone()).unwrap();
        let target = compare.side(Side::Before);

        target.clear_drawn_features().unwrap();
        assert!(target.last_drawn_features().unwrap().is_none());

        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].payload["map"], "before");
        assert_eq!(sent[0].payload["message"]["type"], "clear_drawn_features");
    }
}
