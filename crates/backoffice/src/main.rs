//! Backoffice server entry point.

use std::sync::Arc;

use backoffice::config::Config;
use backoffice::feature::{
    FeatureToggleRepository, InMemoryFeatureToggleRepository, PostgresFeatureToggleRepository,
};
use messaging::MessageBus;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    common::init_tracing(&config.log_level, config.log_format);

    // 2. Install Prometheus metrics recorder
    let metrics_handle =
        common::install_metrics_recorder().expect("failed to install Prometheus recorder");

    // 3. Connect the message bus
    let bus = messaging::connect(config.kafka_brokers.as_deref())
        .expect("failed to connect message bus");

    // 4. Pick the toggle storage and serve
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to Postgres");
            let repository = PostgresFeatureToggleRepository::new(pool);
            repository
                .run_migrations()
                .await
                .expect("failed to run migrations");
            serve(&config, repository, bus, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, feature toggles are kept in memory");
            let repository = InMemoryFeatureToggleRepository::new();
            serve(&config, repository, bus, metrics_handle).await;
        }
    }
}

async fn serve<R: FeatureToggleRepository + 'static>(
    config: &Config,
    repository: R,
    bus: Arc<dyn MessageBus>,
    metrics_handle: PrometheusHandle,
) {
    let state = backoffice::create_state(repository, bus, &config.feature_toggle_topic);
    let app = backoffice::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting backoffice server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
