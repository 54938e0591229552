use mapgl::{MapProxy, ReadbackOptions, Session, Target};
use serde_json::json;
use sessionmocker::MockSession;
use std::{sync::Arc, time::Duration};

#[tokio::test]
async fn expectation_then_query() {
    let _ = env_logger::try_init();

    let session = Arc::new(MockSession::strict());
    let proxy = MapProxy::maplibre("map", session.clone()).unwrap();
    session
        .expect("get_drawn_features")
        .respond("map_drawn_features", json!({"type": "FeatureCollection", "features": []}));

    let features = Target::from(&proxy)
        .get_drawn_features(ReadbackOptions::default())
        .await
        .unwrap();

    assert!(features.is_empty());
    assert!(session.satisfied());
}

#[tokio::test]
async fn input_set_while_waiting() {
    let _ = env_logger::try_init();

    let session = MockSession::new();
    let input = session.on_input_change("map_active_section");

    futures::future::join(
        async {
            assert_eq!(input.await.unwrap(), "intro");
        },
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.set_input("map_active_section", json!("intro"));
        },
    )
    .await;

    assert_eq!(session.input("map_active_section"), Some(json!("intro")));
}

#[test]
fn records_messages_in_order() {
    let session = Arc::new(MockSession::new());
    let proxy = MapProxy::mapbox("map", session.clone()).unwrap();
    let mut target = Target::from(&proxy);

    target.clear_markers().unwrap();
    target.clear_legend().unwrap();

    assert_eq!(session.message_types(), ["clear_markers", "clear_legend"]);
    assert_eq!(session.sent()[0].kind, "mapboxgl-proxy");
}

#[test]
fn failing_session_is_reported() {
    let session = Arc::new(MockSession::new());
    let proxy = MapProxy::mapbox("map", session.clone()).unwrap();
    session.fail_sends();

    assert!(matches!(
        Target::from(&proxy).clear_markers(),
        Err(mapgl::Error::Session(_))
    ));
    assert!(session.sent().is_empty());
}

#[test]
#[should_panic(expected = "there are unexpected messages")]
fn unexpected_message() {
    let session = Arc::new(MockSession::strict());
    let proxy = MapProxy::mapbox("map", session.clone()).unwrap();

    Target::from(&proxy).clear_markers().unwrap();
    drop(proxy);
    drop(session);
}
