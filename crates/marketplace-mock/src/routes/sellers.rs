//! Seller onboarding under `/v1/seller`.

use axum::extract::{Path, State};

use super::{SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::sellers::{SellerRegistrationRequest, SellerView};

/// POST /v1/seller/register
#[tracing::instrument(skip(state, req), fields(business_number = %req.0.business_number))]
pub async fn register(
    State(state): State<SharedState>,
    req: Valid<SellerRegistrationRequest>,
) -> Result<Envelope<SellerView>, MarketError> {
    let seller = state.marketplace.register_seller(req.0).await?;
    Ok(Envelope::success(seller))
}

/// GET /v1/seller/{seller_id}
pub async fn get(
    State(state): State<SharedState>,
    Path(seller_id): Path<String>,
) -> Result<Envelope<SellerView>, MarketError> {
    Ok(Envelope::success(state.marketplace.get_seller(&seller_id).await?))
}

/// GET /v1/seller/kakao/{kakao_account_id} — `data` is null when unknown.
pub async fn get_by_kakao_account(
    State(state): State<SharedState>,
    Path(kakao_account_id): Path<String>,
) -> Envelope<Option<SellerView>> {
    Envelope::success(
        state
            .marketplace
            .find_seller_by_kakao_account(&kakao_account_id)
            .await,
    )
}

/// PUT /v1/seller/{seller_id}/approve
pub async fn approve(
    State(state): State<SharedState>,
    Path(seller_id): Path<String>,
) -> Result<Envelope<SellerView>, MarketError> {
    Ok(Envelope::success(state.marketplace.approve_seller(&seller_id).await?))
}

/// PUT /v1/seller/{seller_id}/reject
pub async fn reject(
    State(state): State<SharedState>,
    Path(seller_id): Path<String>,
) -> Result<Envelope<SellerView>, MarketError> {
    Ok(Envelope::success(state.marketplace.reject_seller(&seller_id).await?))
}
