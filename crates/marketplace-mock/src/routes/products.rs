//! Product catalogue under `/v1/products`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{PageRequest, PageResponse};

use super::{AuthenticatedSeller, Params, SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::products::{
    ProductCreateRequest, ProductSearchQuery, ProductSummary, ProductUpdateRequest, ProductView,
};

/// POST /v1/products
#[tracing::instrument(skip_all, fields(seller_id = %seller.0.seller_id))]
pub async fn create(
    State(state): State<SharedState>,
    seller: AuthenticatedSeller,
    Valid(req): Valid<ProductCreateRequest>,
) -> Result<Envelope<ProductView>, MarketError> {
    let product = state.marketplace.create_product(&seller.0, req).await?;
    Ok(Envelope::success(product))
}

/// PUT /v1/products/{product_id}
pub async fn update(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Path(product_id): Path<String>,
    Valid(req): Valid<ProductUpdateRequest>,
) -> Result<Envelope<ProductView>, MarketError> {
    let product = state
        .marketplace
        .update_product(&seller.seller_id, &product_id, req)
        .await?;
    Ok(Envelope::success(product))
}

/// GET /v1/products/{product_id} — public.
pub async fn get(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
) -> Result<Envelope<ProductView>, MarketError> {
    Ok(Envelope::success(state.marketplace.get_product(&product_id).await?))
}

/// GET /v1/products — the calling seller's products.
pub async fn list(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Params(query): Params<ProductSearchQuery>,
) -> Result<Envelope<PageResponse<ProductSummary>>, MarketError> {
    let page = state
        .marketplace
        .seller_products(&seller.seller_id, &query)
        .await?;
    Ok(Envelope::success(page))
}

/// GET /v1/products/kakao-pay
pub async fn kakao_pay(
    State(state): State<SharedState>,
    Params(paging): Params<PageRequest>,
) -> Envelope<PageResponse<ProductSummary>> {
    Envelope::success(state.marketplace.kakao_pay_products(&paging).await)
}

/// DELETE /v1/products/{product_id}
pub async fn delete(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Path(product_id): Path<String>,
) -> Result<StatusCode, MarketError> {
    state
        .marketplace
        .delete_product(&seller.seller_id, &product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
