use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use skytrail_core::{Position, PositionSnapshot, WaypointMetadata};
use std::sync::Arc;
use tower::ServiceExt;

use crate::source::{PositionSource, SourceError};
use crate::{api, config::Config, state::AppState};

/// Answers every fetch with the same snapshot, or with no data.
struct StaticSource(Option<PositionSnapshot>);

impl PositionSource for StaticSource {
    fn fetch<'a>(
        &'a self,
        _id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PositionSnapshot>, SourceError>> {
        let answer = self.0.clone();
        async move { Ok::<_, SourceError>(answer) }.boxed()
    }
}

fn setup_app(snapshot: Option<PositionSnapshot>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::with_source(Config::default(), Arc::new(StaticSource(snapshot)))
            .expect("valid config"),
    );
    let app = api::routes().with_state(state.clone());
    (app, state)
}

fn atlanta() -> PositionSnapshot {
    PositionSnapshot::new(
        Position::new(33.6407, -84.4277),
        WaypointMetadata {
            altitude: Some(3200.0),
            ground_speed: Some(140.0),
            label: Some("DAL123".to_string()),
            ..Default::default()
        },
    )
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_position(id: &str, lat: f64, lon: f64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/v1/trajectories/{}/positions", id))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "position": {"lat": lat, "lon": lon},
                "altitude": 1000.0
            })
            .to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _state) = setup_app(None);
    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (app, _state) = setup_app(None);
    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn start_then_stop_keeps_initial_waypoint() {
    let (app, state) = setup_app(Some(atlanta()));

    let start = app
        .clone()
        .oneshot(request("POST", "/v1/tracking/a1b2c3"))
        .await
        .unwrap();
    assert_eq!(start.status(), StatusCode::OK);
    let body = read_json(start).await;
    assert_eq!(body["tracking"], true);
    assert_eq!(body["waypoint_count"], 1);

    let stop = app
        .clone()
        .oneshot(request("DELETE", "/v1/tracking/a1b2c3"))
        .await
        .unwrap();
    assert_eq!(read_json(stop).await["stopped"], true);
    assert!(!state.tracker().is_tracking("a1b2c3"));

    let trajectory = app
        .clone()
        .oneshot(request("GET", "/v1/trajectories/a1b2c3"))
        .await
        .unwrap();
    let points = read_json(trajectory).await;
    assert_eq!(points.as_array().unwrap().len(), 1);
    assert_eq!(points[0]["position"]["lat"], 33.6407);
    assert_eq!(points[0]["label"], "DAL123");

    let listing = app
        .oneshot(request("GET", "/v1/tracking"))
        .await
        .unwrap();
    let listing = read_json(listing).await;
    assert_eq!(listing, json!([{"id": "a1b2c3", "tracking": false, "waypoint_count": 1}]));
}

#[tokio::test]
async fn start_rejects_invalid_id() {
    let (app, state) = setup_app(Some(atlanta()));
    let response = app
        .oneshot(request("POST", "/v1/tracking/bad%20id!"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.tracker().active_session_count(), 0);
}

#[tokio::test]
async fn manual_positions_are_deduplicated() {
    let (app, _state) = setup_app(None);

    let first = app.clone().oneshot(post_position("n12345", 1.0, 2.0)).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let duplicate = app.clone().oneshot(post_position("n12345", 1.0, 2.0)).await.unwrap();
    assert_eq!(duplicate.status(), StatusCode::OK);
    let body = read_json(duplicate).await;
    assert_eq!(body["appended"], false);
    assert_eq!(body["waypoint_count"], 1);
}

#[tokio::test]
async fn out_of_range_position_is_rejected() {
    let (app, state) = setup_app(None);
    let response = app.oneshot(post_position("n12345", 91.0, 0.0)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.tracker().tracked_entities().is_empty());
}

#[tokio::test]
async fn statistics_missing_for_unknown_id() {
    let (app, _state) = setup_app(None);
    let response = app
        .oneshot(request("GET", "/v1/trajectories/ghost/statistics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn statistics_report_distance() {
    let (app, _state) = setup_app(None);
    app.clone().oneshot(post_position("eq", 0.0, 0.0)).await.unwrap();
    app.clone().oneshot(post_position("eq", 0.0, 1.0)).await.unwrap();

    let response = app
        .oneshot(request("GET", "/v1/trajectories/eq/statistics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = read_json(response).await;
    assert_eq!(stats["waypoint_count"], 2);
    let distance = stats["distance_traveled_km"].as_f64().unwrap();
    assert!((distance - 111.19).abs() < 0.01);
}

#[tokio::test]
async fn geojson_of_unknown_id_is_empty_feature() {
    let (app, _state) = setup_app(None);
    let response = app
        .oneshot(request("GET", "/v1/trajectories/ghost/geojson"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let feature = read_json(response).await;
    assert_eq!(feature["type"], "Feature");
    assert_eq!(feature["geometry"]["coordinates"], json!([]));
    assert_eq!(feature["properties"]["waypoint_count"], 0);
}

#[tokio::test]
async fn collection_reports_total_waypoints() {
    let (app, _state) = setup_app(None);
    for i in 0..3 {
        app.clone().oneshot(post_position("aaa111", 10.0, i as f64)).await.unwrap();
    }
    for i in 0..5 {
        app.clone().oneshot(post_position("bbb222", 20.0, i as f64)).await.unwrap();
    }

    let response = app.oneshot(request("GET", "/v1/geojson")).await.unwrap();
    let collection = read_json(response).await;
    assert_eq!(collection["type"], "FeatureCollection");
    assert_eq!(collection["metadata"]["total_entities"], 2);
    assert_eq!(collection["metadata"]["total_waypoints"], 8);
}

#[tokio::test]
async fn export_is_served_as_attachment() {
    let (app, _state) = setup_app(None);
    app.clone().oneshot(post_position("a1b2c3", 1.0, 2.0)).await.unwrap();

    let response = app
        .oneshot(request("GET", "/v1/trajectories/a1b2c3/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"trajectory_a1b2c3_"));
    assert!(disposition.ends_with(".json\""));

    let body = read_json(response).await;
    assert_eq!(body["id"], "a1b2c3");
    assert_eq!(body["trajectory"].as_array().unwrap().len(), 1);
    assert!(body["exported_at"].as_str().is_some());
}

#[tokio::test]
async fn clearing_removes_trajectories() {
    let (app, state) = setup_app(None);
    app.clone().oneshot(post_position("a1b2c3", 1.0, 2.0)).await.unwrap();
    app.clone().oneshot(post_position("d4e5f6", 1.0, 2.0)).await.unwrap();

    let one = app
        .clone()
        .oneshot(request("DELETE", "/v1/trajectories/a1b2c3"))
        .await
        .unwrap();
    assert_eq!(one.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.tracker().tracked_entities(), vec!["d4e5f6".to_string()]);

    let missing = app
        .clone()
        .oneshot(request("DELETE", "/v1/trajectories/a1b2c3"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let all = app
        .oneshot(request("DELETE", "/v1/trajectories"))
        .await
        .unwrap();
    assert_eq!(all.status(), StatusCode::NO_CONTENT);
    assert!(state.tracker().tracked_entities().is_empty());
}

#[tokio::test]
async fn stop_all_reports_session_count() {
    let (app, state) = setup_app(Some(atlanta()));
    app.clone().oneshot(request("POST", "/v1/tracking/aaa111")).await.unwrap();
    app.clone().oneshot(request("POST", "/v1/tracking/bbb222")).await.unwrap();
    assert_eq!(state.tracker().active_session_count(), 2);

    let response = app
        .oneshot(request("DELETE", "/v1/tracking"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["stopped"], 2);
    assert_eq!(state.tracker().active_session_count(), 0);
}

#[tokio::test]
async fn padded_id_reaches_the_same_session() {
    let (app, state) = setup_app(Some(atlanta()));

    let start = app
        .clone()
        .oneshot(request("POST", "/v1/tracking/%20abc"))
        .await
        .unwrap();
    assert_eq!(read_json(start).await["id"], "abc");

    let trajectory = app
        .clone()
        .oneshot(request("GET", "/v1/trajectories/%20abc"))
        .await
        .unwrap();
    assert_eq!(read_json(trajectory).await.as_array().unwrap().len(), 1);

    let stats = app
        .clone()
        .oneshot(request("GET", "/v1/trajectories/%20abc/statistics"))
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);

    let stop = app
        .clone()
        .oneshot(request("DELETE", "/v1/tracking/%20abc"))
        .await
        .unwrap();
    let body = read_json(stop).await;
    assert_eq!(body, json!({"id": "abc", "stopped": true}));
    assert!(!state.tracker().is_tracking("abc"));

    let clear = app
        .oneshot(request("DELETE", "/v1/trajectories/%20abc"))
        .await
        .unwrap();
    assert_eq!(clear.status(), StatusCode::NO_CONTENT);
    assert!(state.tracker().tracked_entities().is_empty());
}

#[tokio::test]
async fn export_rejects_ids_unsafe_for_headers() {
    let (app, _state) = setup_app(None);

    for uri in [
        "/v1/trajectories/a%22%3B%20filename%3D%22evil.exe/export",
        "/v1/trajectories/a%0Ab/export",
    ] {
        let response = app.clone().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(!response.headers().contains_key("content-disposition"));
    }
}

#[tokio::test]
async fn every_id_route_rejects_invalid_ids() {
    let (app, state) = setup_app(None);
    state
        .tracker()
        .add_position("ok", Position::new(1.0, 2.0), WaypointMetadata::default());

    for (method, uri) in [
        ("DELETE", "/v1/tracking/bad%20id!"),
        ("GET", "/v1/trajectories/bad%20id!"),
        ("DELETE", "/v1/trajectories/bad%20id!"),
        ("GET", "/v1/trajectories/bad%20id!/statistics"),
        ("GET", "/v1/trajectories/bad%20id!/geojson"),
    ] {
        let response = app.clone().oneshot(request(method, uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
    }
    assert_eq!(state.tracker().tracked_entities(), vec!["ok".to_string()]);
}

#[tokio::test]
async fn unusable_request_id_is_replaced() {
    let (app, _state) = setup_app(None);
    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "not a usable id")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    let echoed = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(echoed).is_ok());
}
