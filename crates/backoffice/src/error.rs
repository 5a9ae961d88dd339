//! Service errors and their HTTP mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use messaging::MessagingError;
use thiserror::Error;

/// Errors raised by feature toggle storage and publishing.
#[derive(Debug, Error)]
pub enum BackofficeError {
    /// The toggle name is blank or too long.
    #[error("Invalid feature name: {0}")]
    InvalidName(String),

    /// No active toggle with this name.
    #[error("Feature toggle not found: {0}")]
    NotFound(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The toggle was stored but could not be published.
    #[error("Publish error: {0}")]
    Publish(#[from] MessagingError),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for backoffice operations.
pub type Result<T> = std::result::Result<T, BackofficeError>;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Feature toggle service error.
    Backoffice(BackofficeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Backoffice(err) => backoffice_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn backoffice_error_to_response(err: BackofficeError) -> (StatusCode, String) {
    match &err {
        BackofficeError::InvalidName(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        BackofficeError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        BackofficeError::Publish(_) => {
            tracing::error!(error = %err, "feature toggle stored but not published");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<BackofficeError> for ApiError {
    fn from(err: BackofficeError) -> Self {
        ApiError::Backoffice(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
