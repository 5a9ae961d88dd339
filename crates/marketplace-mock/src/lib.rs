//! Stand-in for the external marketplaces.
//!
//! One process imitates one marketplace (Naver, Kakao, ...) chosen by
//! profile: seller onboarding, catalogue, cart, wishlist, orders, reviews
//! and buyer notifications, all kept in memory.

pub mod config;
pub mod envelope;
pub mod error;
pub mod market;
pub mod platform;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use market::Marketplace;
use platform::Platform;
use routes::{AppState, SharedState};

/// Creates the marketplace router, nested under the profile's context path.
pub fn create_app(state: SharedState, metrics_handle: PrometheusHandle) -> Router {
    let context_path = state.marketplace.platform().context_path();

    let api = Router::new()
        // Sellers
        .route("/v1/seller/register", post(routes::sellers::register))
        .route("/v1/seller/{seller_id}", get(routes::sellers::get))
        .route(
            "/v1/seller/kakao/{kakao_account_id}",
            get(routes::sellers::get_by_kakao_account),
        )
        .route("/v1/seller/{seller_id}/approve", put(routes::sellers::approve))
        .route("/v1/seller/{seller_id}/reject", put(routes::sellers::reject))
        // Products
        .route(
            "/v1/products",
            post(routes::products::create).get(routes::products::list),
        )
        .route("/v1/products/kakao-pay", get(routes::products::kakao_pay))
        .route(
            "/v1/products/{product_id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        // Cart
        .route(
            "/v1/cart",
            post(routes::cart::add)
                .get(routes::cart::list)
                .delete(routes::cart::clear),
        )
        .route(
            "/v1/cart/{cart_id}",
            put(routes::cart::update).delete(routes::cart::remove),
        )
        // Wishlist
        .route("/v1/wishlist", get(routes::wishlist::list))
        .route("/v1/wishlist/toggle", post(routes::wishlist::toggle))
        .route(
            "/v1/wishlist/check/{product_id}",
            get(routes::wishlist::check),
        )
        // Orders
        .route(
            "/v1/orders",
            post(routes::orders::create).get(routes::orders::list_for_seller),
        )
        .route("/v1/orders/buyer", get(routes::orders::list_for_buyer))
        .route("/v1/orders/{order_id}", get(routes::orders::get))
        .route(
            "/v1/orders/{order_id}/status",
            put(routes::orders::update_status),
        )
        // Reviews
        .route("/v1/reviews", post(routes::reviews::create))
        .route(
            "/v1/reviews/{review_id}",
            put(routes::reviews::update).delete(routes::reviews::delete),
        )
        .route(
            "/v1/reviews/product/{product_id}",
            get(routes::reviews::list_for_product),
        )
        // Categories and notifications
        .route("/v1/categories", get(routes::catalog::category_tree))
        .route("/v1/categories/active", get(routes::catalog::active_categories))
        .route(
            "/v1/notifications/send",
            post(routes::catalog::send_notification),
        )
        .with_state(state);

    Router::new()
        .nest(&context_path, api)
        .merge(common::observability_router(metrics_handle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Fresh, seeded state for `platform`.
pub fn create_state(platform: Platform) -> SharedState {
    Arc::new(AppState {
        marketplace: Marketplace::new(platform),
    })
}
