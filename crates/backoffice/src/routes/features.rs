//! Feature toggle endpoints under `/backoffice/features`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::ApiResponse;
use serde::{Deserialize, Serialize};

use super::{JsonBody, PathParam};
use crate::error::ApiError;
use crate::feature::{FeatureToggle, FeatureToggleRepository, FeatureToggleService};

/// Shared application state accessible from all handlers.
pub struct AppState<R: FeatureToggleRepository> {
    pub feature_service: FeatureToggleService<R>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterFeatureRequest {
    pub name: String,
    pub toggle: bool,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureToggleView {
    pub id: i64,
    pub name: String,
    pub toggle: bool,
}

impl From<FeatureToggle> for FeatureToggleView {
    fn from(feature: FeatureToggle) -> Self {
        Self {
            id: feature.id,
            name: feature.name,
            toggle: feature.toggle,
        }
    }
}

// -- Handlers --

/// POST /backoffice/features/register — create or update a toggle.
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn register<R: FeatureToggleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<RegisterFeatureRequest>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    state
        .feature_service
        .register_feature(&req.name, req.toggle)
        .await?;
    Ok(Json(ApiResponse::success(true)))
}

/// GET /backoffice/features — all active toggles.
#[tracing::instrument(skip(state))]
pub async fn list<R: FeatureToggleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<ApiResponse<Vec<FeatureToggleView>>>, ApiError> {
    let features = state.feature_service.get_all_features().await?;
    Ok(Json(ApiResponse::success(
        features.into_iter().map(FeatureToggleView::from).collect(),
    )))
}

/// GET /backoffice/features/:name
#[tracing::instrument(skip(state))]
pub async fn get<R: FeatureToggleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    PathParam(name): PathParam<String>,
) -> Result<Json<ApiResponse<FeatureToggleView>>, ApiError> {
    let feature = state.feature_service.get_feature(&name).await?;
    Ok(Json(ApiResponse::success(feature.into())))
}

/// DELETE /backoffice/features/:name — soft delete, propagated as disabled.
#[tracing::instrument(skip(state))]
pub async fn delete<R: FeatureToggleRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    PathParam(name): PathParam<String>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    state.feature_service.delete_feature(&name).await?;
    Ok(Json(ApiResponse::success(true)))
}
