//! Gateway server entry point.

use gateway::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    common::init_tracing(&config.log_level, config.log_format);

    // 2. Install Prometheus metrics recorder
    let metrics_handle =
        common::install_metrics_recorder().expect("failed to install Prometheus recorder");

    // 3. Build clients and router
    let state = gateway::create_state(&config).expect("failed to build upstream clients");
    let app = gateway::create_app(state, metrics_handle);

    // 4. Start server
    let addr = config.addr();
    tracing::info!(
        %addr,
        backend = %config.backend_url,
        auth = %config.auth_url,
        "starting gateway"
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
