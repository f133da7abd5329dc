//! Router-level tests for POST /api/publish
//!
//! Drives the full axum stack (middleware included) with in-memory collaborators.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{spawn_app, spawn_app_with_metrics, FixedGeocoder};
use metrics_exporter_prometheus::PrometheusBuilder;
use orion::services::StreamEvent;

fn publish_request(body: Value, identity: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/publish")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some((user, device)) = identity {
        builder = builder.header("X-Limit-U", user).header("X-Limit-D", device);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_location_with_identity_headers_is_stored() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({ "_type": "location", "lat": 1.0, "lon": 2.0 }),
            Some(("user", "device")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(read_json(response).await, json!({ "success": true }));

    assert_eq!(*app.geocoder.calls.lock().unwrap(), vec![(1.0, 2.0)]);
    let stored = app.store.locations.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user, "user");
    assert_eq!(stored[0].device, "device");
    assert_eq!(stored[0].latitude, 1.0);
    assert_eq!(stored[0].longitude, 2.0);
    assert_eq!(stored[0].address.as_deref(), Some("address"));
}

#[tokio::test]
async fn test_location_with_topic_and_no_geocode_match() {
    let app = spawn_app(FixedGeocoder::without_match());

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({
                "_type": "location",
                "lat": 1.0,
                "lon": 2.0,
                "topic": "owntracks/user/device",
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = app.store.locations.lock().unwrap();
    assert_eq!(stored[0].user, "user");
    assert_eq!(stored[0].device, "device");
    assert!(stored[0].address.is_none());
}

#[tokio::test]
async fn test_unsupported_type_rejected() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let response = app
        .router
        .clone()
        .oneshot(publish_request(json!({ "_type": "lwt" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "success": false, "message": "Not a location publish." })
    );
    assert!(app.store.locations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_string_coordinates_rejected() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({ "_type": "location", "lat": "1.0", "lon": 2.0 }),
            Some(("user", "device")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({
            "success": false,
            "message": "Location publish requires numeric lat and lon."
        })
    );
    assert!(app.geocoder.calls.lock().unwrap().is_empty());
    assert!(app.store.locations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_location_command_acknowledged() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({
                "_type": "cmd",
                "action": "reportLocation",
                "topic": "owntracks/user/device",
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "success": true }));
    assert!(app.geocoder.calls.lock().unwrap().is_empty());
    assert!(app.store.locations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_gets_structured_error() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/publish")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VAL_3003");
}

#[tokio::test]
async fn test_publish_requires_post() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/publish")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_stored_location_reaches_stream_subscribers() {
    let app = spawn_app(FixedGeocoder::resolving_to("address"));
    let mut events = app.stream.subscribe();

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({ "_type": "location", "lat": 1.0, "lon": 2.0 }),
            Some(("user", "device")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let StreamEvent::Location(location) = events.recv().await.unwrap();
    assert_eq!(location.user, "user");
    assert_eq!(location.address.as_deref(), Some("address"));
}

#[tokio::test]
async fn test_health_reports_environment() {
    let app = spawn_app(FixedGeocoder::without_match());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_metrics_endpoint_renders_publish_counters() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let app = spawn_app_with_metrics(FixedGeocoder::without_match(), recorder.handle());
    // Current-thread test runtime: the whole request runs under this recorder
    let _guard = metrics::set_default_local_recorder(&recorder);

    let response = app
        .router
        .clone()
        .oneshot(publish_request(
            json!({ "_type": "location", "lat": 1.0, "lon": 2.0 }),
            Some(("user", "device")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rendered = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(rendered.contains("geocode_requests_total 1"));
    assert!(rendered.contains(r#"geocode_failures_total{reason="no_match"} 1"#));
    assert!(rendered
        .lines()
        .any(|line| line.starts_with("locations_published_total{")
            && line.contains(r#"user="user""#)
            && line.contains(r#"device="device""#)));
    assert!(rendered.contains("location_db_write_ms_count 1"));
    assert!(rendered.contains(r#"path="/api/publish""#));
}
