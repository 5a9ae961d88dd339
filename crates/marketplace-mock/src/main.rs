//! Marketplace mock entry point.

use marketplace_mock::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env().expect("invalid MARKETPLACE");

    // 1. Initialize tracing
    common::init_tracing(&config.log_level, config.log_format);

    // 2. Install Prometheus metrics recorder
    let metrics_handle =
        common::install_metrics_recorder().expect("failed to install Prometheus recorder");

    // 3. Build state and router
    let state = marketplace_mock::create_state(config.platform);
    let app = marketplace_mock::create_app(state, metrics_handle);

    // 4. Start server
    let addr = config.addr();
    tracing::info!(
        %addr,
        marketplace = %config.platform,
        context_path = %config.platform.context_path(),
        "starting marketplace mock"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
