//! Feed-to-file scenarios. Feeds are served from memory or from a loopback
//! listener, never from the real network.

use quakemap::export::{to_geojson, write_outputs};
use quakemap::feed::{FeedError, HttpFeed, StaticFeed};
use quakemap::legend::legend_entries;
use quakemap::pipeline::{base_surface, populate, BuildError};
use quakemap::quake::MalformedPolicy;
use quakemap::state::Config;
use quakemap::style::depth_color;
use quakemap::surface::LatLng;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SINGLE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "t1",
     "geometry": {"type": "Point", "coordinates": [-122.4, 37.8, 12]},
     "properties": {"mag": 4.5, "place": "Test"}}
  ]
}"#;

const MIXED: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"id": "deep", "geometry": {"coordinates": [142.1, 38.3, 90]}, "properties": {"mag": 6.1, "place": "Off Honshu"}},
    {"id": "nomag", "geometry": {"coordinates": [0, 0, 5]}, "properties": {"mag": null, "place": "Nowhere"}},
    {"id": "nogeom", "geometry": null, "properties": {"mag": 2.0, "place": "Lost"}},
    {"id": "shallow", "geometry": {"coordinates": [-155.3, 19.4, -1.2]}, "properties": {"mag": 2.2, "place": null}}
  ]
}"#;

#[tokio::test]
async fn single_feature_becomes_styled_marker() {
    let mut surface = base_surface(&Config::default());
    let stats = populate(&mut surface, &StaticFeed::new(SINGLE), MalformedPolicy::Skip)
        .await
        .unwrap();
    assert_eq!(stats.features, 1);
    assert_eq!(stats.markers, 1);
    assert_eq!(stats.skipped, 0);

    let m = &surface.markers()[0];
    assert_eq!(m.position, LatLng { lat: 37.8, lng: -122.4 });
    assert_eq!(m.style.radius, 18.0);
    assert_eq!(m.style.fill_color, depth_color(12.0));
    assert_eq!(m.style.fill_color, "#91cf60");
    assert!(m.popup.html.contains("Test"));
    assert!(m.popup.html.contains("4.5"));
    assert!(m.popup.html.contains("12 km"));
}

#[tokio::test]
async fn empty_feed_still_has_full_legend() {
    let mut surface = base_surface(&Config::default());
    let feed = StaticFeed::new(r#"{"type":"FeatureCollection","features":[]}"#);
    let stats = populate(&mut surface, &feed, MalformedPolicy::Skip).await.unwrap();
    assert_eq!(stats.markers, 0);
    assert!(surface.markers().is_empty());
    assert_eq!(surface.controls().len(), 1);
    assert_eq!(legend_entries().len(), 6);
}

#[tokio::test]
async fn depth_exactly_ninety_is_second_tier() {
    let mut surface = base_surface(&Config::default());
    populate(&mut surface, &StaticFeed::new(MIXED), MalformedPolicy::Skip)
        .await
        .unwrap();
    assert_eq!(surface.markers()[0].style.fill_color, "#fc8d59");
}

#[tokio::test]
async fn skip_policy_drops_only_bad_features() {
    let mut surface = base_surface(&Config::default());
    let stats = populate(&mut surface, &StaticFeed::new(MIXED), MalformedPolicy::Skip)
        .await
        .unwrap();
    assert_eq!(stats.features, 4);
    assert_eq!(stats.markers, 2);
    assert_eq!(stats.skipped, 2);
    let shallow = &surface.markers()[1];
    assert_eq!(shallow.style.fill_color, "#1a9850");
    assert!(shallow.popup.html.contains("Unknown location"));
}

#[tokio::test]
async fn fail_policy_rejects_batch_and_adds_nothing() {
    let mut surface = base_surface(&Config::default());
    let err = populate(&mut surface, &StaticFeed::new(MIXED), MalformedPolicy::Fail)
        .await
        .unwrap_err();
    match err {
        BuildError::Malformed(e) => {
            assert_eq!(e.index, 1);
            assert_eq!(e.feature_id.as_deref(), Some("nomag"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(surface.markers().is_empty());
}

#[tokio::test]
async fn outputs_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("maps").join("week.html");
    let geojson_path = html_path.with_extension("geojson");

    let mut surface = base_surface(&Config::default());
    populate(&mut surface, &StaticFeed::new(SINGLE), MalformedPolicy::Skip)
        .await
        .unwrap();
    let written = write_outputs(&surface, &html_path, Some(&geojson_path)).unwrap();
    assert_eq!(written, vec![html_path.clone(), geojson_path.clone()]);

    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("L.circleMarker"));
    assert!(html.contains("info legend"));

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&geojson_path).unwrap()).unwrap();
    assert_eq!(on_disk, to_geojson(&surface));
    assert_eq!(on_disk["features"].as_array().unwrap().len(), 1);
}

/// Wrap one feature next to a well-formed one.
fn good_plus(bad: &str) -> String {
    format!(
        r#"{{"type":"FeatureCollection","features":[
            {{"id":"good","geometry":{{"coordinates":[-122.4,37.8,12]}},"properties":{{"mag":4.5,"place":"Good"}}}},
            {}
        ]}}"#,
        bad
    )
}

#[tokio::test]
async fn wrongly_typed_feature_is_skipped_not_fatal() {
    let bad_features = [
        r#"{"id":"a","geometry":{"coordinates":[1,2,3]},"properties":{"mag":"4.5","place":"x"}}"#,
        r#"{"id":"b","geometry":{"coordinates":[1,2,3]},"properties":null}"#,
        r#"{"id":7,"geometry":{"coordinates":[1,2,3]},"properties":{"place":"x"}}"#,
        r#"{"id":"c","geometry":{"coordinates":[1,"x",3]},"properties":{"mag":1.0}}"#,
        r#"{"id":"d","geometry":{"coordinates":null},"properties":{"mag":1.0}}"#,
    ];
    for bad in bad_features {
        let mut surface = base_surface(&Config::default());
        let stats = populate(&mut surface, &StaticFeed::new(good_plus(bad)), MalformedPolicy::Skip)
            .await
            .unwrap_or_else(|e| panic!("{} -> {}", bad, e));
        assert_eq!(stats.markers, 1, "{}", bad);
        assert_eq!(stats.skipped, 1, "{}", bad);
        assert!(surface.markers()[0].popup.html.contains("Good"));
    }
}

#[tokio::test]
async fn numeric_feature_id_reported_under_fail_policy() {
    let body = good_plus(r#"{"id":7,"geometry":{"coordinates":[1,2,3]},"properties":{"mag":"big"}}"#);
    let mut surface = base_surface(&Config::default());
    let err = populate(&mut surface, &StaticFeed::new(body), MalformedPolicy::Fail)
        .await
        .unwrap_err();
    match err {
        BuildError::Malformed(e) => assert_eq!(e.feature_id.as_deref(), Some("7")),
        other => panic!("unexpected error: {}", other),
    }
}

async fn serve_status_once(status: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut sock, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status
            );
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
        }
    });
    format!("http://{}/feed.geojson", addr)
}

#[tokio::test]
async fn failed_fetch_still_writes_base_map_and_legend() {
    let url = serve_status_once("503 Service Unavailable").await;
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let feed = HttpFeed::with_client(url, client);

    let mut surface = base_surface(&Config::default());
    let err = populate(&mut surface, &feed, MalformedPolicy::Skip)
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Feed(FeedError::Status(503))));
    assert_eq!(err.to_string(), "feed returned HTTP 503");

    let dir = TempDir::new().unwrap();
    let html_path = dir.path().join("week.html");
    write_outputs(&surface, &html_path, None).unwrap();
    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("info legend"));
    assert!(html.contains("\"markers\":[]"));
    assert!(html.contains("openstreetmap"));
}
