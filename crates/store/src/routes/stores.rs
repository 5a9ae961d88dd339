//! Store registration and lookup endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use common::ApiResponse;
use serde::{Deserialize, Serialize};

use super::{JsonBody, PathParam, QueryParams, SharedState};
use crate::domain::{IntegrationPlatform, Store, StoreStatus};
use crate::error::ApiError;
use crate::facade::RegisterStoreCommand;
use crate::repository::StoreRepository;

pub const API_VERSION_HEADER: &str = "x-api-version";
pub const USER_ID_HEADER: &str = "x-user-id";

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStoreRequest {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    pub description: Option<String>,
    pub platform: IntegrationPlatform,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresQuery {
    pub user_id: i64,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub email: String,
    pub phone: String,
    pub status: StoreStatus,
    pub registered_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub integrations: Vec<StoreIntegrationView>,
    pub histories: Vec<StoreHistoryView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreIntegrationView {
    pub platform: IntegrationPlatform,
    pub platform_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHistoryView {
    pub history: String,
    pub created_at: DateTime<Utc>,
}

impl From<Store> for StoreView {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            description: store.description,
            user_id: store.user_id,
            email: store.email,
            phone: store.phone,
            status: store.status,
            registered_at: store.registered_at,
            confirmed_at: store.confirmed_at,
            updated_at: store.updated_at,
            deleted_at: store.deleted_at,
            integrations: store
                .integrations
                .into_iter()
                .map(|i| StoreIntegrationView {
                    platform: i.platform,
                    platform_id: i.platform_id,
                })
                .collect(),
            histories: store
                .histories
                .into_iter()
                .map(|h| StoreHistoryView {
                    history: h.history,
                    created_at: h.created_at,
                })
                .collect(),
        }
    }
}

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required header: {name}")))
}

fn user_id(headers: &HeaderMap) -> Result<i64, ApiError> {
    required_header(headers, USER_ID_HEADER)?
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {USER_ID_HEADER}: {e}")))
}

// -- Handlers --

/// POST /stores/register — register a store on a marketplace.
#[tracing::instrument(skip(state, headers, req), fields(platform = %req.platform))]
pub async fn register<R: StoreRepository + 'static>(
    State(state): State<SharedState<R>>,
    headers: HeaderMap,
    JsonBody(req): JsonBody<RegisterStoreRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let api_version = required_header(&headers, API_VERSION_HEADER)?;
    let user_id = user_id(&headers)?;
    tracing::debug!(api_version, user_id, "store registration requested");

    let command = RegisterStoreCommand {
        business_name: req.business_name,
        business_number: req.business_number,
        representative_name: req.representative_name,
        email: req.email,
        phone: req.phone,
        user_id,
        description: req.description,
        platform: req.platform,
    };
    state.facade.register_store(command).await?;

    Ok(Json(ApiResponse::empty()))
}

/// GET /stores/:id
#[tracing::instrument(skip(state))]
pub async fn get<R: StoreRepository + 'static>(
    State(state): State<SharedState<R>>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ApiResponse<StoreView>>, ApiError> {
    let store = state.facade.get_store(id).await?;
    Ok(Json(ApiResponse::success(store.into())))
}

/// GET /stores?userId= — active stores of a user.
#[tracing::instrument(skip(state, query), fields(user_id = query.user_id))]
pub async fn list<R: StoreRepository + 'static>(
    State(state): State<SharedState<R>>,
    QueryParams(query): QueryParams<ListStoresQuery>,
) -> Result<Json<ApiResponse<Vec<StoreView>>>, ApiError> {
    let stores = state.facade.get_user_stores(query.user_id).await?;
    Ok(Json(ApiResponse::success(
        stores.into_iter().map(StoreView::from).collect(),
    )))
}

/// POST /stores/:id/cancel — owner-only soft delete.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<R: StoreRepository + 'static>(
    State(state): State<SharedState<R>>,
    PathParam(id): PathParam<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = user_id(&headers)?;
    state.facade.cancel_store(id, user_id).await?;
    Ok(Json(ApiResponse::empty()))
}
