//! Backoffice service.
//!
//! Owns the feature toggles and publishes every change on the toggle topic
//! so that other services can mirror them.

pub mod config;
pub mod error;
pub mod feature;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use messaging::MessageBus;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use feature::{FeatureToggleRepository, FeatureToggleService};
use routes::features::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: FeatureToggleRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    Router::new()
        .route("/backoffice/features", get(routes::features::list::<R>))
        .route(
            "/backoffice/features/register",
            post(routes::features::register::<R>),
        )
        .route(
            "/backoffice/features/{name}",
            get(routes::features::get::<R>).delete(routes::features::delete::<R>),
        )
        .with_state(state)
        .merge(common::observability_router(metrics_handle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the feature toggle service over `repository` and `bus`.
pub fn create_state<R: FeatureToggleRepository + 'static>(
    repository: R,
    bus: Arc<dyn MessageBus>,
    topic: &str,
) -> Arc<AppState<R>> {
    Arc::new(AppState {
        feature_service: FeatureToggleService::new(repository, bus, topic),
    })
}
