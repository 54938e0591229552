//! Builds a few maps and prints what the rendering host would receive, and what a live map would
//! be sent.

#![expect(clippy::print_stdout)]

mod places;

use std::sync::Arc;

use futures::channel::oneshot;
use mapgl::{
    CameraOptions, Control, Error, GeoJsonData, Layer, Map, MapProxy, Session, SessionError,
    Source, classification, expression,
    lut::{ColorTheme, LutMethod, LutSize},
    palette::Palette,
    story::{Story, StoryObserver, StorySection},
    styles::CartoStyle,
    turf::{TurfInput, TurfRequest, Units},
};
use serde_json::Value;

/// Session which prints messages instead of sending them to a browser.
struct PrintingSession;

impl Session for PrintingSession {
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError> {
        println!("{kind}: {payload}");
        Ok(())
    }

    fn input(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Nothing ever answers, so the callback is dropped right away.
    fn on_input_change(&self, _name: &str) -> oneshot::Receiver<Value> {
        oneshot::channel().1
    }
}

fn choropleth() -> Result<Map, Error> {
    let visitors = places::visitors();
    let counts: Vec<f64> = visitors
        .features
        .iter()
        .filter_map(|feature| feature.properties["visitors"].as_f64())
        .collect();
    let classes = classification::jenks(&counts, 3, &Palette::Magma)?;
    for warning in &classes.warnings {
        log::warn!("{warning}");
    }

    let mut map = Map::maplibre()
        .with_style(CartoStyle::Positron.url())
        .with_center(places::market_square())
        .with_zoom(13.0);
    let mut target = map.target();
    target.add_source("visitors", Source::geojson(GeoJsonData::from(&visitors)))?;
    target.add_layer(
        Layer::circle("visitors", "visitors")
            .circle_color(classes.step_expression("visitors"))
            .circle_radius(12)
            .circle_stroke_color("white")
            .circle_stroke_width(1)
            .tooltip("name"),
    )?;
    target.add_layer(
        Layer::symbol("labels", "visitors")
            .text_field(expression::get("name"))
            .text_offset(serde_json::json!([0, 1.5])),
    )?;
    target.add_legend(classes.with_label_digits(0).legend("Daily visitors"), false)?;
    target.add_control(Control::navigation())?;
    target.turf(TurfRequest::buffer(
        TurfInput::LayerId("visitors".to_owned()),
        300.0,
        Units::Meters,
        "walking_distance",
    )?)?;
    Ok(map)
}

fn themed() -> Result<Map, Error> {
    let theme = ColorTheme::new(
        &LutMethod::Duotone {
            shadow: "#1b1b3a".to_owned(),
            highlight: "#f2e9e4".to_owned(),
            intensity: 0.8,
        },
        LutSize::Medium,
    )?;
    Ok(Map::mapbox()
        .with_center(places::wroclaw_glowny())
        .with_zoom(14.0)
        .with_pitch(45.0)
        .with_color_theme(theme))
}

fn story(session: Arc<dyn Session>) -> Result<(), Error> {
    let story = Story::new("tour")?
        .with_section(StorySection::new("station", "<h2>Wrocław Główny</h2>"))?
        .with_section(StorySection::new("theatre", "<h2>Capitol</h2>"))?;
    println!("{}", serde_json::to_string_pretty(&story)?);

    let mut observer = StoryObserver::new(&story)
        .on_section("station", |target| {
            target.fly_to(CameraOptions::centered(places::wroclaw_glowny(), 16.0))
        })
        .on_section("theatre", |target| {
            target.fly_to(CameraOptions {
                pitch: Some(60.0),
                ..CameraOptions::centered(places::capitol(), 17.0)
            })
        });

    // What happens when the browser reports the reader scrolling through the sections.
    let proxy = MapProxy::maplibre(story.map_id(), session)?;
    let mut target = mapgl::Target::from(&proxy);
    for section in story.sections() {
        observer.dispatch(&section.id, &mut target)?;
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let payload = choropleth()?.into_payload()?;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    match themed()?.into_payload() {
        Ok(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
        Err(Error::MissingAccessToken) => {
            log::warn!("Set MAPBOX_PUBLIC_TOKEN to render the themed Mapbox map.");
        }
        Err(err) => return Err(err),
    }

    story(Arc::new(PrintingSession))
}
