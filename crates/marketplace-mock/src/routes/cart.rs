//! Buyer cart under `/v1/cart`.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::{Buyer, SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::cart::{CartAddRequest, CartUpdateRequest, CartView};

/// POST /v1/cart
pub async fn add(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Valid(req): Valid<CartAddRequest>,
) -> Result<Envelope<CartView>, MarketError> {
    Ok(Envelope::success(state.marketplace.add_to_cart(&kakao_id, req).await?))
}

/// PUT /v1/cart/{cart_id}
pub async fn update(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Path(cart_id): Path<String>,
    Valid(req): Valid<CartUpdateRequest>,
) -> Result<Envelope<CartView>, MarketError> {
    let item = state
        .marketplace
        .update_cart_item(&kakao_id, &cart_id, req)
        .await?;
    Ok(Envelope::success(item))
}

/// GET /v1/cart
pub async fn list(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
) -> Result<Envelope<Vec<CartView>>, MarketError> {
    Ok(Envelope::success(state.marketplace.cart(&kakao_id).await?))
}

/// DELETE /v1/cart/{cart_id}
pub async fn remove(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Path(cart_id): Path<String>,
) -> Result<StatusCode, MarketError> {
    state
        .marketplace
        .remove_cart_item(&kakao_id, &cart_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/cart
pub async fn clear(State(state): State<SharedState>, Buyer(kakao_id): Buyer) -> StatusCode {
    state.marketplace.clear_cart(&kakao_id).await;
    StatusCode::NO_CONTENT
}
