//! Request tracing and token authentication in front of the proxy.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use reqwest::Client;
use tracing::Instrument;
use uuid::Uuid;

use crate::SharedState;
use crate::error::{GatewayError, Result};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Tags the request with an `X-Request-Id`, keeping the caller's when given,
/// and echoes it on the response.
pub async fn propagate_request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let span = tracing::info_span!("gateway_request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Rejects requests the auth service does not vouch for and passes the
/// resolved user on as `X-User-Id`.
pub async fn authenticate(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .cloned()
        .ok_or_else(|| GatewayError::Unauthorized("Authorization header is required".to_string()))?;

    let user_id = state.auth.validate(&authorization).await?;
    let value = HeaderValue::from_str(&user_id)
        .map_err(|_| GatewayError::Unauthorized("auth service returned an invalid user id".to_string()))?;
    request.headers_mut().insert(USER_ID_HEADER, value);

    tracing::debug!(%user_id, path = %request.uri().path(), "request authenticated");
    Ok(next.run(request).await)
}

/// Client for the token validation endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    validate_url: String,
}

impl AuthClient {
    pub fn new(auth_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            validate_url: format!("{}/validate/token", auth_url.trim_end_matches('/')),
        })
    }

    pub fn validate_url(&self) -> &str {
        &self.validate_url
    }

    /// Resolves `authorization` to a user id. Every failure is an
    /// [`GatewayError::Unauthorized`].
    pub async fn validate(&self, authorization: &HeaderValue) -> Result<String> {
        let response = self
            .client
            .post(&self.validate_url)
            .header(AUTHORIZATION, authorization.clone())
            .send()
            .await
            .map_err(|e| GatewayError::Unauthorized(format!("auth service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Unauthorized(format!("token rejected ({status})")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Unauthorized(format!("unreadable auth response: {e}")))?;
        let user_id = body.trim();
        if user_id.is_empty() {
            return Err(GatewayError::Unauthorized(
                "auth service returned no user id".to_string(),
            ));
        }
        Ok(user_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_appends_endpoint() {
        let client = AuthClient::new("http://localhost:12000/auth/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.validate_url(), "http://localhost:12000/auth/validate/token");
    }
}
