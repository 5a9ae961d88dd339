//! Buyer wishlist under `/v1/wishlist`.

use axum::extract::{Path, State};

use super::{Buyer, SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::wishlist::{WishlistRequest, WishlistView};

/// POST /v1/wishlist/toggle — `true` when added, `false` when removed.
pub async fn toggle(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Valid(req): Valid<WishlistRequest>,
) -> Result<Envelope<bool>, MarketError> {
    let wished = state
        .marketplace
        .toggle_wishlist(&kakao_id, &req.product_id)
        .await?;
    Ok(Envelope::success(wished))
}

/// GET /v1/wishlist
pub async fn list(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
) -> Result<Envelope<Vec<WishlistView>>, MarketError> {
    Ok(Envelope::success(state.marketplace.wishlist(&kakao_id).await?))
}

/// GET /v1/wishlist/check/{product_id}
pub async fn check(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Path(product_id): Path<String>,
) -> Envelope<bool> {
    Envelope::success(state.marketplace.is_wished(&kakao_id, &product_id).await)
}
