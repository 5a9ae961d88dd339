//! Orders under `/v1/orders`.

use axum::extract::{Path, State};
use common::{PageRequest, PageResponse};

use super::{AuthenticatedSeller, Buyer, OptionalBuyer, Params, SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::orders::{OrderCreateRequest, OrderSearchQuery, OrderStatusUpdateRequest, OrderView};

/// POST /v1/orders — `X-KAKAO-ID` is optional for guest checkout.
#[tracing::instrument(skip_all, fields(buyer = ?buyer.0))]
pub async fn create(
    State(state): State<SharedState>,
    buyer: OptionalBuyer,
    Valid(req): Valid<OrderCreateRequest>,
) -> Result<Envelope<OrderView>, MarketError> {
    let order = state
        .marketplace
        .create_order(buyer.0.as_deref(), req)
        .await?;
    Ok(Envelope::success(order))
}

/// GET /v1/orders — the calling seller's orders.
pub async fn list_for_seller(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Params(query): Params<OrderSearchQuery>,
) -> Result<Envelope<PageResponse<OrderView>>, MarketError> {
    let page = state
        .marketplace
        .seller_orders(&seller.seller_id, &query)
        .await?;
    Ok(Envelope::success(page))
}

/// GET /v1/orders/buyer
pub async fn list_for_buyer(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Params(paging): Params<PageRequest>,
) -> Envelope<PageResponse<OrderView>> {
    Envelope::success(state.marketplace.buyer_orders(&kakao_id, &paging).await)
}

/// GET /v1/orders/{order_id}
pub async fn get(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Path(order_id): Path<String>,
) -> Result<Envelope<OrderView>, MarketError> {
    let order = state
        .marketplace
        .get_order(&seller.seller_id, &order_id)
        .await?;
    Ok(Envelope::success(order))
}

/// PUT /v1/orders/{order_id}/status
pub async fn update_status(
    State(state): State<SharedState>,
    AuthenticatedSeller(seller): AuthenticatedSeller,
    Path(order_id): Path<String>,
    Valid(req): Valid<OrderStatusUpdateRequest>,
) -> Result<Envelope<OrderView>, MarketError> {
    let order = state
        .marketplace
        .update_order_status(&seller.seller_id, &order_id, req)
        .await?;
    Ok(Envelope::success(order))
}
