//! Service errors and their HTTP mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::domain::IntegrationPlatform;

/// Errors raised while registering and managing stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The registration request failed validation.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No adaptor is registered for the platform.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(IntegrationPlatform),

    /// The marketplace answered with a seller status we cannot map.
    #[error("Unknown {platform} seller status: {status}")]
    UnknownPlatformStatus {
        platform: IntegrationPlatform,
        status: String,
    },

    /// The marketplace refused the registration.
    #[error("{platform} rejected the request: {message}")]
    PlatformRejected {
        platform: IntegrationPlatform,
        message: String,
    },

    /// The marketplace could not be reached or answered garbage.
    #[error("{platform} is unavailable: {reason}")]
    PlatformUnavailable {
        platform: IntegrationPlatform,
        reason: String,
    },

    /// Store not found.
    #[error("Store not found: {0}")]
    NotFound(i64),

    /// The caller does not own the store.
    #[error("User {user_id} does not own store {store_id}")]
    NotOwner { store_id: i64, user_id: i64 },

    /// The store has already been cancelled.
    #[error("Store {0} is already cancelled")]
    AlreadyCancelled(i64),

    /// A notification could not be delivered.
    #[error("{channel} delivery failed: {reason}")]
    Delivery { channel: String, reason: String },

    /// Products of a store could not be cleared.
    #[error("Product service error: {0}")]
    ProductService(String),

    /// The backoffice could not be queried.
    #[error("Backoffice error: {0}")]
    Backoffice(String),

    /// An HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Store service error.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::Validation(_) | StoreError::UnsupportedPlatform(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::NotOwner { .. } => (StatusCode::FORBIDDEN, err.to_string()),
        StoreError::AlreadyCancelled(_) => (StatusCode::CONFLICT, err.to_string()),
        StoreError::UnknownPlatformStatus { .. } => {
            tracing::error!(error = %err, "unmappable marketplace status");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        StoreError::PlatformRejected { message, .. } => {
            tracing::warn!(error = %err, "marketplace rejected registration");
            (StatusCode::BAD_GATEWAY, message.clone())
        }
        StoreError::PlatformUnavailable { .. } => {
            tracing::error!(error = %err, "marketplace unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
