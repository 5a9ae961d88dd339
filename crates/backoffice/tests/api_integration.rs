//! Integration tests for the backoffice API.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use backoffice::feature::{FeatureToggleMessage, InMemoryFeatureToggleRepository};
use messaging::InMemoryMessageBus;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

const TOPIC: &str = "event.backoffice.feature-toggle";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryMessageBus) {
    let bus = InMemoryMessageBus::recording();
    let state = backoffice::create_state(
        InMemoryFeatureToggleRepository::new(),
        Arc::new(bus.clone()),
        TOPIC,
    );
    (backoffice::create_app(state, get_metrics_handle()), bus)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn register_request(name: &str, toggle: bool) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/backoffice/features/register")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "name": name, "toggle": toggle }).to_string(),
        ))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_register_feature() {
    let (app, bus) = setup();

    let response = app
        .oneshot(register_request("new-checkout", true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "code": "ok", "data": true })
    );

    let published = bus.published(TOPIC).await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].key.as_deref(), Some("FEATURE_TOGGLE::1"));
    let payload: FeatureToggleMessage = published[0].decode().unwrap();
    assert_eq!(payload.name, "new-checkout");
    assert!(payload.toggle);
}

#[tokio::test]
async fn test_register_blank_name_is_bad_request() {
    let (app, bus) = setup();

    let response = app.oneshot(register_request("  ", true)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].as_str().is_some());
    assert_eq!(bus.published_count().await, 0);
}

#[tokio::test]
async fn test_register_twice_updates_toggle() {
    let (app, _) = setup();

    app.clone()
        .oneshot(register_request("beta", false))
        .await
        .unwrap();
    app.clone()
        .oneshot(register_request("beta", true))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/backoffice/features")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ok");
    let features = json["data"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["name"], "beta");
    assert_eq!(features[0]["toggle"], true);
}

#[tokio::test]
async fn test_list_features() {
    let (app, _) = setup();

    for name in ["a", "b"] {
        app.clone()
            .oneshot(register_request(name, true))
            .await
            .unwrap();
    }

    let response = app.oneshot(get_request("/backoffice/features")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "code": "ok",
            "data": [
                { "id": 1, "name": "a", "toggle": true },
                { "id": 2, "name": "b", "toggle": true }
            ]
        })
    );
}

#[tokio::test]
async fn test_get_feature() {
    let (app, _) = setup();
    app.clone()
        .oneshot(register_request("beta", true))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/backoffice/features/beta"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "code": "ok",
            "data": { "id": 1, "name": "beta", "toggle": true }
        })
    );

    let missing = app
        .oneshot(get_request("/backoffice/features/ghost"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_missing_field_is_json_bad_request() {
    let (app, bus) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/backoffice/features/register")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"name":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("toggle"), "unexpected error: {error}");
    assert_eq!(bus.published_count().await, 0);
}

#[tokio::test]
async fn test_register_malformed_json_is_json_bad_request() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/backoffice/features/register")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_delete_feature_publishes_disabled() {
    let (app, bus) = setup();
    app.clone()
        .oneshot(register_request("beta", true))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/backoffice/features/beta")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let published = bus.published(TOPIC).await;
    let last: FeatureToggleMessage = published.last().unwrap().decode().unwrap();
    assert!(!last.toggle);

    let response = app.oneshot(get_request("/backoffice/features")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "code": "ok", "data": [] })
    );
}

#[tokio::test]
async fn test_publish_failure_is_service_unavailable() {
    let (app, bus) = setup();
    bus.set_fail_on_publish(true).await;

    let response = app
        .clone()
        .oneshot(register_request("beta", true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The toggle is stored; registering again once the bus is back publishes it.
    bus.set_fail_on_publish(false).await;
    let response = app.oneshot(register_request("beta", true)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(bus.published(TOPIC).await.len(), 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    app.clone()
        .oneshot(register_request("beta", true))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
