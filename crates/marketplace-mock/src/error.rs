//! Marketplace errors and their HTTP mapping.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::ErrorEnvelope;

/// Errors raised by the mock marketplace.
#[derive(Debug, Error)]
pub enum MarketError {
    /// A business rule was violated (duplicate seller, missing stock, ...).
    #[error("{0}")]
    Business(String),

    /// Missing auth header or unknown API key.
    #[error("{0}")]
    Unauthorized(String),

    /// The request body or query failed validation, keyed by field.
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    /// The in-memory data is inconsistent.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

impl MarketError {
    pub fn business(message: impl Into<String>) -> Self {
        MarketError::Business(message.into())
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        MarketError::Validation(BTreeMap::from([(field.to_string(), message.into())]))
    }

    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Business(_) => "BUSINESS_ERROR",
            MarketError::Unauthorized(_) => "UNAUTHORIZED",
            MarketError::Validation(_) => "VALIDATION_ERROR",
            MarketError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::Business(_) | MarketError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            MarketError::Validation(details) => {
                ErrorEnvelope::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(details)
            }
            MarketError::Internal(reason) => {
                tracing::error!(%reason, "internal server error");
                ErrorEnvelope::new("INTERNAL_ERROR", "Internal server error")
            }
            other => ErrorEnvelope::new(other.code(), other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        MarketError::field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for MarketError {
    fn from(rejection: QueryRejection) -> Self {
        MarketError::field("query", rejection.body_text())
    }
}
