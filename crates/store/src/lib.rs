//! Store service.
//!
//! Registers sellers' stores on external marketplaces, keeps them in local
//! storage, notifies owners asynchronously and mirrors the backoffice
//! feature toggles.

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod facade;
pub mod integration;
pub mod repository;
pub mod routes;
pub mod service;
pub mod toggle;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use domain::IntegrationPlatform;
use error::Result;
use events::StoreEventPublisher;
use facade::StoreFacade;
use integration::{KakaoAdaptor, MarketplaceClient, NaverAdaptor, StoreIntegrationFactory};
use repository::StoreRepository;
use routes::AppState;
use service::StoreService;
use toggle::FeatureToggleManager;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: StoreRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    Router::new()
        .route("/stores", get(routes::stores::list::<R>))
        .route("/stores/register", post(routes::stores::register::<R>))
        .route("/stores/features", get(routes::features::list::<R>))
        .route("/stores/{id}", get(routes::stores::get::<R>))
        .route("/stores/{id}/cancel", post(routes::stores::cancel::<R>))
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

/// Wires the registration workflow over `repository`.
pub fn create_state<R: StoreRepository + 'static>(
    repository: R,
    factory: StoreIntegrationFactory,
    events: StoreEventPublisher,
    toggles: FeatureToggleManager,
) -> Arc<AppState<R>> {
    Arc::new(AppState {
        facade: StoreFacade::new(factory, StoreService::new(repository), events),
        toggles,
    })
}

/// Builds the Naver and Kakao adaptors from the configured base URLs.
pub fn create_integration_factory(config: &Config) -> Result<StoreIntegrationFactory> {
    let timeout = config.upstream_timeout();
    let naver = MarketplaceClient::new(IntegrationPlatform::Naver, &config.naver_api_url, timeout)?;
    let kakao = MarketplaceClient::new(IntegrationPlatform::Kakao, &config.kakao_api_url, timeout)?;

    Ok(StoreIntegrationFactory::new()
        .with_adaptor(Box::new(NaverAdaptor::new(naver)))
        .with_adaptor(Box::new(KakaoAdaptor::new(kakao))))
}
