//! Read access to the feature toggle cache.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use common::ApiResponse;

use super::SharedState;
use crate::repository::StoreRepository;

/// GET /stores/features — every cached toggle.
pub async fn list<R: StoreRepository + 'static>(
    State(state): State<SharedState<R>>,
) -> Json<ApiResponse<HashMap<String, bool>>> {
    Json(ApiResponse::success(state.toggles.get_all_features().await))
}
