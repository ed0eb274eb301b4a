use std::time::Duration;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    Router,
};
use futures::StreamExt;
use loctrack::{
    core::store::LocationStore,
    http::{
        response::{ApiResponse, ErrorResponse, HealthResponse},
        router, AppState,
    },
    location::LocationRecord,
    runtime::handle::{RuntimeConfig, TrackerHandle, spawn_tracker},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> (Router, TrackerHandle) {
    let tracker = spawn_tracker(LocationStore::new(), RuntimeConfig::default());
    (router(AppState::new(tracker.clone(), "test")), tracker)
}

fn post_location(body: Value) -> Request<Body> {
    Request::post("/api/location")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn report(id: &str, lat: f64, lon: f64) -> Value {
    json!({
        "id": id,
        "coordinates": {"latitude": lat, "longitude": lon},
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

#[tokio::test]
async fn post_then_get_latest_returns_the_stored_record() {
    let (app, _tracker) = app();

    let response = app
        .clone()
        .oneshot(post_location(report("u1", -22.9, -43.2)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: ApiResponse<LocationRecord> = read_json(response).await;
    let stored = created.data.expect("record");
    assert_eq!(stored.identifier, "u1");
    assert_eq!(stored.reported_at, "2024-01-01T00:00:00Z");

    let response = app.oneshot(get("/api/location/u1")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let latest: ApiResponse<LocationRecord> = read_json(response).await;
    assert_eq!(latest.data, Some(stored));
}

#[tokio::test]
async fn stored_record_uses_wire_field_names() {
    let (app, _tracker) = app();

    let response = app
        .oneshot(post_location(report("u1", 1.5, 2.5)))
        .await
        .expect("response");
    let body: Value = read_json(response).await;
    let data = &body["data"];

    assert_eq!(data["id"], "u1");
    assert_eq!(data["coordinates"], json!({"latitude": 1.5, "longitude": 2.5}));
    assert_eq!(data["timestamp"], "2024-01-01T00:00:00Z");
    assert!(data["createdAt"].is_string());
}

#[tokio::test]
async fn invalid_reports_are_rejected_with_kind() {
    let (app, _tracker) = app();

    let cases = [
        (report("u1", 95.0, 0.0), "CoordinateOutOfRange"),
        (json!({"id": "u1", "timestamp": "t"}), "MissingFields"),
        (
            json!({
                "id": "u1",
                "coordinates": {"latitude": "north", "longitude": 0},
                "timestamp": "t",
            }),
            "InvalidCoordinateType",
        ),
    ];

    for (body, kind) in cases {
        let response = app.clone().oneshot(post_location(body)).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = read_json(response).await;
        assert_eq!(err.kind, kind);
        assert!(!err.message.is_empty());
    }

    let response = app.oneshot(get("/api/location")).await.expect("response");
    let all: ApiResponse<Vec<LocationRecord>> = read_json(response).await;
    assert_eq!(all.data, Some(vec![]));
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (app, _tracker) = app();

    let request = Request::post("/api/location")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = read_json(response).await;
    assert_eq!(err.kind, "MalformedBody");
}

#[tokio::test]
async fn unknown_identifier_is_not_found() {
    let (app, _tracker) = app();

    for uri in ["/api/location/ghost", "/api/location/ghost/history"] {
        let response = app.clone().oneshot(get(uri)).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let err: ErrorResponse = read_json(response).await;
        assert_eq!(err.kind, "NotFound");
        assert!(err.message.contains("ghost"));
    }
}

#[tokio::test]
async fn history_is_in_insertion_order_and_latest_all_has_one_per_id() {
    let (app, _tracker) = app();

    for (id, lat) in [("a", 1.0), ("b", 2.0), ("a", 3.0), ("a", 4.0)] {
        let response = app
            .clone()
            .oneshot(post_location(report(id, lat, 0.0)))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/api/location/a/history"))
        .await
        .expect("response");
    let history: ApiResponse<Vec<LocationRecord>> = read_json(response).await;
    let lats: Vec<f64> = history
        .data
        .expect("history")
        .iter()
        .map(|r| r.coordinates.latitude)
        .collect();
    assert_eq!(lats, vec![1.0, 3.0, 4.0]);

    let response = app.oneshot(get("/api/location")).await.expect("response");
    let all: ApiResponse<Vec<LocationRecord>> = read_json(response).await;
    let latest: Vec<(String, f64)> = all
        .data
        .expect("all")
        .into_iter()
        .map(|r| (r.identifier, r.coordinates.latitude))
        .collect();
    assert_eq!(latest, vec![("a".to_string(), 4.0), ("b".to_string(), 2.0)]);
}

#[tokio::test]
async fn health_reports_environment() {
    let (app, _tracker) = app();

    let response = app.oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.status, "OK");
    assert_eq!(health.environment, "test");
    assert!(health.uptime >= 0.0);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _tracker) = app();

    let response = app.oneshot(get("/api/users")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ErrorResponse = read_json(response).await;
    assert_eq!(err.kind, "RouteNotFound");
    assert!(err.message.contains("/api/users"));
}

#[tokio::test]
async fn stream_sends_catch_up_event() {
    let (app, tracker) = app();

    app.clone()
        .oneshot(post_location(report("u1", -22.9, -43.2)))
        .await
        .expect("response");

    let response = app.oneshot(get("/api/location/u1/stream")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("first event")
        .expect("chunk")
        .expect("bytes");
    let text = String::from_utf8(chunk.to_vec()).expect("utf8");
    assert!(text.starts_with("data: "), "{text}");

    let payload: LocationRecord =
        serde_json::from_str(text.trim_start_matches("data: ").trim()).expect("record json");
    assert_eq!(payload.identifier, "u1");
    assert_eq!(tracker.latest("u1").await.expect("latest"), Some(payload));
}
