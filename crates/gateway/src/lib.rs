//! Edge gateway.
//!
//! Every `/app` request gets a request id, is authenticated against the
//! auth service and is then forwarded to the backend under `/api`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;

use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::Result;
use middleware::AuthClient;
use proxy::BackendClient;

/// Shared application state accessible from all handlers.
pub struct GatewayState {
    pub backend: BackendClient,
    pub auth: AuthClient,
}

pub type SharedState = Arc<GatewayState>;

/// Creates the gateway router.
///
/// Layers run outermost first: HTTP logging, request id, then
/// authentication, which guards only the `/app` routes.
pub fn create_app(state: SharedState, metrics_handle: PrometheusHandle) -> Router {
    let proxied = Router::new()
        .route("/app", any(proxy::forward))
        .route("/app/{*rest}", any(proxy::forward))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .with_state(state);

    Router::new()
        .merge(proxied)
        .merge(common::observability_router(metrics_handle))
        .layer(axum::middleware::from_fn(middleware::propagate_request_id))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the backend and auth clients from `config`.
pub fn create_state(config: &Config) -> Result<SharedState> {
    let timeout = config.upstream_timeout();
    Ok(Arc::new(GatewayState {
        backend: BackendClient::new(&config.backend_url, timeout)?,
        auth: AuthClient::new(&config.auth_url, timeout)?,
    }))
}
