//! Gateway errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while authenticating or forwarding a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing, rejected or unverifiable credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The incoming request could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request body is over the relay limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The backend could not be reached or answered garbage.
    #[error("Backend unavailable: {0}")]
    BadGateway(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized(_) => "unauthorized",
            GatewayError::InvalidRequest(_) | GatewayError::PayloadTooLarge(_) => "invalid_request",
            GatewayError::BadGateway(_) => "bad_gateway",
            GatewayError::Client(_) => "error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GatewayError::Unauthorized(reason) => {
                tracing::warn!(%reason, "request rejected by authentication");
            }
            GatewayError::BadGateway(_) | GatewayError::Client(_) => {
                tracing::error!(error = %self, "forwarding failed");
            }
            GatewayError::InvalidRequest(_) | GatewayError::PayloadTooLarge(_) => {}
        }
        metrics::counter!("gateway_requests_total", "outcome" => self.outcome()).increment(1);

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
