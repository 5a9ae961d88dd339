//! Store server entry point.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use store::config::Config;
use store::events::{
    InMemoryProductService, MailSender, NotificationSender, SmsSender, StoreEventProcessor,
    StoreEventPublisher,
};
use store::integration::StoreIntegrationFactory;
use store::repository::{InMemoryStoreRepository, PostgresStoreRepository, StoreRepository};
use store::toggle::{
    BackofficeClient, FEATURE_TOGGLE_GROUP_ID, FeatureToggleInitializer, FeatureToggleManager,
    FeatureToggleUpdater,
};

/// Everything the HTTP layer needs besides the repository.
struct Wiring {
    factory: StoreIntegrationFactory,
    events: StoreEventPublisher,
    processor: StoreEventProcessor,
    toggles: FeatureToggleManager,
    metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    common::init_tracing(&config.log_level, config.log_format);

    // 2. Install Prometheus metrics recorder
    let metrics_handle =
        common::install_metrics_recorder().expect("failed to install Prometheus recorder");

    // 3. Feature toggles: seed from the backoffice, then follow the topic
    let toggles = FeatureToggleManager::new();
    let backoffice = BackofficeClient::new(&config.backoffice_url, config.upstream_timeout())
        .expect("failed to build backoffice client");
    FeatureToggleInitializer::new(backoffice, toggles.clone())
        .initialize()
        .await;

    let bus = messaging::connect(config.kafka_brokers.as_deref())
        .expect("failed to connect message bus");
    messaging::RetryingConsumer::new(
        bus,
        config.feature_toggle_topic.as_str(),
        FEATURE_TOGGLE_GROUP_ID,
        config.toggle_retry_policy(),
    )
    .start(Arc::new(FeatureToggleUpdater::new(toggles.clone())))
    .await
    .expect("failed to start feature toggle consumer");

    // 4. Store event fan-out
    let senders: Vec<Arc<dyn NotificationSender>> = vec![Arc::new(MailSender), Arc::new(SmsSender)];
    let (events, processor) = StoreEventProcessor::start(
        senders,
        Arc::new(InMemoryProductService::new()),
        config.event_processor(),
    );

    // 5. Marketplace adaptors
    let factory =
        store::create_integration_factory(&config).expect("failed to build marketplace clients");

    let wiring = Wiring {
        factory,
        events,
        processor,
        toggles,
        metrics_handle,
    };

    // 6. Pick the store repository and serve
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to Postgres");
            let repository = PostgresStoreRepository::new(pool);
            repository
                .run_migrations()
                .await
                .expect("failed to run migrations");
            serve(&config, repository, wiring).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, stores are kept in memory");
            serve(&config, InMemoryStoreRepository::new(), wiring).await;
        }
    }
}

async fn serve<R: StoreRepository + 'static>(config: &Config, repository: R, wiring: Wiring) {
    let state = store::create_state(repository, wiring.factory, wiring.events, wiring.toggles);
    let app = store::create_app(state, wiring.metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting store server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown_signal())
        .await
        .expect("server error");

    // The router owned the last publisher; drain what is still queued.
    wiring.processor.join().await;
    tracing::info!("server shut down gracefully");
}
