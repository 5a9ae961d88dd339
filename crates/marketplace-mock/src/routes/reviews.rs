//! Product reviews under `/v1/reviews`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{PageRequest, PageResponse};

use super::{Buyer, Params, SharedState, Valid};
use crate::envelope::Envelope;
use crate::error::MarketError;
use crate::market::reviews::{ReviewCreateRequest, ReviewUpdateRequest, ReviewView};

/// POST /v1/reviews
pub async fn create(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Valid(req): Valid<ReviewCreateRequest>,
) -> Result<Envelope<ReviewView>, MarketError> {
    Ok(Envelope::success(state.marketplace.create_review(&kakao_id, req).await?))
}

/// PUT /v1/reviews/{review_id}
pub async fn update(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Path(review_id): Path<String>,
    Valid(req): Valid<ReviewUpdateRequest>,
) -> Result<Envelope<ReviewView>, MarketError> {
    let review = state
        .marketplace
        .update_review(&kakao_id, &review_id, req)
        .await?;
    Ok(Envelope::success(review))
}

/// GET /v1/reviews/product/{product_id}
pub async fn list_for_product(
    State(state): State<SharedState>,
    Path(product_id): Path<String>,
    Params(paging): Params<PageRequest>,
) -> Envelope<PageResponse<ReviewView>> {
    Envelope::success(state.marketplace.product_reviews(&product_id, &paging).await)
}

/// DELETE /v1/reviews/{review_id}
pub async fn delete(
    State(state): State<SharedState>,
    Buyer(kakao_id): Buyer,
    Path(review_id): Path<String>,
) -> Result<StatusCode, MarketError> {
    state.marketplace.delete_review(&kakao_id, &review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
