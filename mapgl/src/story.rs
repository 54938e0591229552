//! Scroll-driven story maps.
//!
//! A [`Story`] describes the sections of text scrolled over a map. The browser watches which
//! section crosses its threshold and reports its id through the `{map_id}_active_section`
//! input. [`StoryObserver`] turns these reports into map operations.

use std::collections::HashMap;
use std::fmt;

use futures::channel::oneshot;
use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::handle::Target;
use crate::session::Session;

const ACTIVE_SECTION: &str = "active_section";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionPosition {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySection {
    pub id: String,
    /// HTML shown in the section's panel.
    pub content: String,
    pub position: SectionPosition,
    /// Panel width in pixels.
    pub width: u32,
    /// Fraction of the viewport height at which the section becomes active.
    pub threshold: f64,
}

impl StorySection {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            position: SectionPosition::default(),
            width: 400,
            threshold: 0.5,
        }
    }

    pub fn at(mut self, position: SectionPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    map_id: String,
    sections: Vec<StorySection>,
}

impl Story {
    /// # Errors
    ///
    /// Fails if `map_id` is empty.
    pub fn new(map_id: impl Into<String>) -> Result<Self, Error> {
        let map_id = map_id.into();
        if map_id.is_empty() {
            return Err(Error::MissingIdentifier("map_id"));
        }
        Ok(Self {
            map_id,
            sections: Vec::new(),
        })
    }

    /// # Errors
    ///
    /// Fails for an empty or duplicate section id, or a threshold outside of `[0, 1]`.
    pub fn with_section(mut self, section: StorySection) -> Result<Self, Error> {
        if section.id.is_empty() {
            return Err(Error::MissingIdentifier("id"));
        }
        if self.sections.iter().any(|other| other.id == section.id) {
            return Err(Error::InvalidArgument {
                argument: "id",
                reason: format!("section '{}' already exists", section.id),
            });
        }
        if !(0.0..=1.0).contains(&section.threshold) {
            return Err(Error::InvalidArgument {
                argument: "threshold",
                reason: format!("{} is not within [0, 1]", section.threshold),
            });
        }
        self.sections.push(section);
        Ok(self)
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn sections(&self) -> &[StorySection] {
        &self.sections
    }

    /// Input the browser reports the active section through.
    pub fn active_section_input(&self) -> String {
        format!("{}_{ACTIVE_SECTION}", self.map_id)
    }
}

type Handler = Box<dyn FnMut(&mut Target<'_>) -> Result<(), Error> + Send>;

/// Runs map operations when sections of a story become active.
pub struct StoryObserver {
    input: String,
    handlers: HashMap<String, Handler>,
}

impl StoryObserver {
    pub fn new(story: &Story) -> Self {
        Self {
            input: story.active_section_input(),
            handlers: HashMap::new(),
        }
    }

    /// Run `handler` whenever the section `section_id` becomes active.
    pub fn on_section(
        mut self,
        section_id: impl Into<String>,
        handler: impl FnMut(&mut Target<'_>) -> Result<(), Error> + Send + 'static,
    ) -> Self {
        self.handlers.insert(section_id.into(), Box::new(handler));
        self
    }

    pub fn active_section_input(&self) -> &str {
        &self.input
    }

    /// Run the handler bound to `section_id`. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// Whatever the handler fails with.
    pub fn dispatch(&mut self, section_id: &str, target: &mut Target<'_>) -> Result<bool, Error> {
        match self.handlers.get_mut(section_id) {
            Some(handler) => {
                log::debug!("Section '{section_id}' is active.");
                handler(target)?;
                Ok(true)
            }
            None => {
                log::debug!("No handler for section '{section_id}'.");
                Ok(false)
            }
        }
    }

    /// Wait for the next change of the active section and dispatch it. Returns the section id.
    ///
    /// # Errors
    ///
    /// Fails if the session goes away, the reported value is not a section id, or the handler
    /// fails.
    pub async fn observe(
        &mut self,
        session: &dyn Session,
        target: &mut Target<'_>,
    ) -> Result<String, Error> {
        let value = session
            .on_input_change(&self.input)
            .await
            .map_err(|oneshot::Canceled| Error::ChannelClosed {
                input: self.input.clone(),
            })?;
        let Value::String(section_id) = value else {
            return Err(Error::InvalidArgument {
                argument: "active_section",
                reason: format!("expected a section id, got {value}"),
            });
        };
        self.dispatch(&section_id, target)?;
        Ok(section_id)
    }
}

impl fmt::Debug for StoryObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryObserver")
            .field("input", &self.input)
            .field("sections", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::camera::CameraOptions;
    use crate::handle::MapProxy;
    use crate::testing::RecordingSession;

    fn story() -> Story {
        Story::new("story")
            .unwrap()
            .with_section(StorySection::new("intro", "<h2>Intro</h2>"))
            .unwrap()
            .with_section(StorySection::new("city", "<p>City</p>").at(SectionPosition::Right))
            .unwrap()
    }

    fn observer(story: &Story) -> StoryObserver {
        StoryObserver::new(story).on_section("city", |target| {
            target.fly_to(CameraOptions::centered([17.03, 51.1], 12.0))
        })
    }

    #[test]
    fn sections_are_validated() {
        assert!(
            story()
                .with_section(StorySection::new("intro", ""))
                .is_err()
        );
        assert!(
            story()
                .with_section(StorySection::new("late", "").with_threshold(1.5))
                .is_err()
        );
        assert!(Story::new("").is_err());
    }

    #[test]
    fn story_serialization() {
        let value = serde_json::to_value(story()).unwrap();
        assert_eq!(value["map_id"], "story");
        assert_eq!(
            value["sections"][1],
            json!({
                "id": "city",
                "content": "<p>City</p>",
                "position": "right",
                "width": 400,
                "threshold": 0.5,
            })
        );
    }

    #[test]
    fn dispatch_runs_bound_handler_only() {
        let story = story();
        let mut observer = observer(&story);
        assert_eq!(observer.active_section_input(), "story_active_section");

        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::mapbox("story", session.clone()).unwrap();
        let mut target = Target::from(&proxy);

        assert!(!observer.dispatch("intro", &mut target).unwrap());
        assert!(session.sent().is_empty());

        assert!(observer.dispatch("city", &mut target).unwrap());
        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].payload["message"]["type"], "fly_to");
    }

    #[tokio::test]
    async fn observe_waits_for_the_browser() {
        let story = story();
        let mut observer = observer(&story);
        let session = Arc::new(RecordingSession::default());
        let proxy = MapProxy::mapbox("story", session.clone()).unwrap();
        let mut target = Target::from(&proxy);

        let (section, ()) = tokio::join!(
            observer.observe(session.as_ref(), &mut target),
            async { session.set_input("story_active_section", json!("city")) }
        );

        assert_eq!(section.unwrap(), "city");
        assert_eq!(session.sent().len(), 1);
    }
}
