//! Feature toggle mirroring: startup seeding from the backoffice and
//! propagation of toggle changes over the bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use backoffice::feature::{FeatureToggleMessage, InMemoryFeatureToggleRepository};
use messaging::{
    HandlerError, InMemoryMessageBus, Message, MessageBus, MessageHandler, RetryPolicy,
    RetryingConsumer,
};
use store::toggle::{
    BackofficeClient, FEATURE_TOGGLE_GROUP_ID, FeatureToggleInitializer, FeatureToggleManager,
    FeatureToggleUpdater,
};

const TOPIC: &str = "event.backoffice.feature-toggle";

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serves a backoffice over an in-memory repository, publishing on `bus`.
async fn spawn_backoffice(bus: &InMemoryMessageBus) -> String {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let state = backoffice::create_state(
        InMemoryFeatureToggleRepository::new(),
        Arc::new(bus.clone()),
        TOPIC,
    );
    serve(backoffice::create_app(state, handle)).await
}

async fn register_toggle(base_url: &str, name: &str, toggle: bool) {
    let response = reqwest::Client::new()
        .post(format!("{base_url}/backoffice/features/register"))
        .json(&serde_json::json!({ "name": name, "toggle": toggle }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

fn client(base_url: &str) -> BackofficeClient {
    BackofficeClient::new(base_url, Duration::from_secs(2)).unwrap()
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        backoff: Duration::from_millis(10),
    }
}

/// Waits until the cache holds `name = expected`.
async fn wait_for_toggle(manager: &FeatureToggleManager, name: &str, expected: bool) {
    for _ in 0..100 {
        if manager.get_all_features().await.get(name) == Some(&expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("toggle {name} never became {expected}");
}

#[tokio::test]
async fn client_reads_backoffice_envelope() {
    let bus = InMemoryMessageBus::new();
    let base_url = spawn_backoffice(&bus).await;
    register_toggle(&base_url, "new-checkout", true).await;
    register_toggle(&base_url, "dark-mode", false).await;

    let toggles = client(&base_url).get_feature_toggles().await.unwrap();

    let names: Vec<_> = toggles.iter().map(|t| (t.name.as_str(), t.toggle)).collect();
    assert_eq!(names, vec![("new-checkout", true), ("dark-mode", false)]);
}

#[tokio::test]
async fn initializer_seeds_cache_from_backoffice() {
    let bus = InMemoryMessageBus::new();
    let base_url = spawn_backoffice(&bus).await;
    register_toggle(&base_url, "new-checkout", true).await;
    register_toggle(&base_url, "dark-mode", false).await;

    let manager = FeatureToggleManager::new();
    let loaded = FeatureToggleInitializer::new(client(&base_url), manager.clone())
        .initialize()
        .await;

    assert_eq!(loaded, 2);
    assert!(manager.get_feature("new-checkout").await);
    assert!(!manager.get_feature("dark-mode").await);
}

#[tokio::test]
async fn initializer_tolerates_backoffice_down() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let manager = FeatureToggleManager::new();
    let loaded = FeatureToggleInitializer::new(client(&format!("http://{addr}")), manager.clone())
        .initialize()
        .await;

    assert_eq!(loaded, 0);
    assert!(manager.get_all_features().await.is_empty());
}

#[tokio::test]
async fn initializer_ignores_list_without_envelope() {
    let app = Router::new().route(
        "/backoffice/features",
        get(|| async {
            axum::Json(serde_json::json!([{ "id": 1, "name": "beta", "toggle": true }]))
        }),
    );
    let base_url = serve(app).await;

    assert!(client(&base_url).get_feature_toggles().await.is_err());

    let manager = FeatureToggleManager::new();
    let loaded = FeatureToggleInitializer::new(client(&base_url), manager.clone())
        .initialize()
        .await;
    assert_eq!(loaded, 0);
    assert!(manager.get_all_features().await.is_empty());
}

#[tokio::test]
async fn backoffice_changes_reach_store_cache() {
    let bus = InMemoryMessageBus::new();
    let base_url = spawn_backoffice(&bus).await;

    let manager = FeatureToggleManager::new();
    RetryingConsumer::new(Arc::new(bus.clone()), TOPIC, FEATURE_TOGGLE_GROUP_ID, fast_policy())
        .start(Arc::new(FeatureToggleUpdater::new(manager.clone())))
        .await
        .unwrap();

    register_toggle(&base_url, "new-checkout", true).await;
    wait_for_toggle(&manager, "new-checkout", true).await;

    let response = reqwest::Client::new()
        .delete(format!("{base_url}/backoffice/features/new-checkout"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    wait_for_toggle(&manager, "new-checkout", false).await;
}

/// Fails the first deliveries, then hands over to the real updater.
struct FailingFirst {
    failures_left: AtomicU32,
    inner: FeatureToggleUpdater,
}

#[async_trait]
impl MessageHandler for FailingFirst {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(HandlerError::new("cache unavailable"));
        }
        self.inner.handle(message).await
    }
}

#[tokio::test]
async fn toggle_change_is_applied_after_retry() {
    let bus = InMemoryMessageBus::recording();
    let manager = FeatureToggleManager::new();
    let handler = Arc::new(FailingFirst {
        failures_left: AtomicU32::new(1),
        inner: FeatureToggleUpdater::new(manager.clone()),
    });
    RetryingConsumer::new(Arc::new(bus.clone()), TOPIC, FEATURE_TOGGLE_GROUP_ID, fast_policy())
        .start(handler)
        .await
        .unwrap();

    let change = FeatureToggleMessage {
        name: "new-checkout".to_string(),
        toggle: true,
    };
    bus.publish(Message::json(TOPIC, Some("FEATURE_TOGGLE::1".to_string()), &change).unwrap())
        .await
        .unwrap();

    wait_for_toggle(&manager, "new-checkout", true).await;
    assert_eq!(bus.published(&messaging::retry_topic(TOPIC)).await.len(), 1);
    assert!(bus.published(&messaging::dead_letter_topic(TOPIC)).await.is_empty());
}

#[tokio::test]
async fn undecodable_toggle_change_is_dead_lettered() {
    let bus = InMemoryMessageBus::recording();
    let manager = FeatureToggleManager::new();
    RetryingConsumer::new(Arc::new(bus.clone()), TOPIC, FEATURE_TOGGLE_GROUP_ID, fast_policy())
        .start(Arc::new(FeatureToggleUpdater::new(manager.clone())))
        .await
        .unwrap();

    bus.publish(Message::new(TOPIC, None, b"not json".to_vec()))
        .await
        .unwrap();

    let dead_letter = messaging::dead_letter_topic(TOPIC);
    for _ in 0..100 {
        if !bus.published(&dead_letter).await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(bus.published(&dead_letter).await.len(), 1);
    assert!(manager.get_all_features().await.is_empty());
}
