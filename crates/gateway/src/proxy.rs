//! Forwarding of `/app` traffic to the backend.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING,
    UPGRADE,
};
use axum::http::{HeaderName, Uri};
use axum::response::Response;
use reqwest::Client;

use crate::SharedState;
use crate::error::{GatewayError, Result};

/// Largest request body relayed to the backend, axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

static HOP_BY_HOP: [HeaderName; 7] = [
    CONNECTION,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name) || name.as_str() == "keep-alive"
}

/// HTTP client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `/app/x?y` on the gateway is `{backend}/api/app/x?y`.
    pub fn target_url(&self, uri: &Uri) -> String {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        format!("{}/api{}", self.base_url, path_and_query)
    }

    /// Replays `request` against the backend and relays its answer.
    pub async fn forward(&self, request: Request) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let url = self.target_url(&parts.uri);
        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
            return Err(GatewayError::PayloadTooLarge(MAX_BODY_BYTES));
        }
        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let mut upstream = self.client.request(parts.method.clone(), &url);
        for (name, value) in parts.headers.iter() {
            if name != HOST && !is_hop_by_hop(name) {
                upstream = upstream.header(name, value);
            }
        }
        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        let response = upstream
            .send()
            .await
            .map_err(|e| GatewayError::BadGateway(e.to_string()))?;

        let status = response.status();
        let mut relayed = Response::builder().status(status);
        for (name, value) in response.headers() {
            if !is_hop_by_hop(name) {
                relayed = relayed.header(name, value);
            }
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::BadGateway(e.to_string()))?;

        tracing::info!(method = %parts.method, %url, status = status.as_u16(), "request forwarded");
        metrics::counter!("gateway_requests_total", "outcome" => "forwarded").increment(1);

        relayed
            .body(Body::from(bytes))
            .map_err(|e| GatewayError::BadGateway(e.to_string()))
    }
}

/// ANY /app and /app/{*rest}
pub async fn forward(State(state): State<SharedState>, request: Request) -> Result<Response> {
    state.backend.forward(request).await
}
