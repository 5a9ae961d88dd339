use std::time::Duration;

use common::ApiResponse;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, StoreError};

/// A toggle as listed by the backoffice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureToggleView {
    pub id: i64,
    pub name: String,
    pub toggle: bool,
}

/// HTTP client for the backoffice service.
#[derive(Debug, Clone)]
pub struct BackofficeClient {
    client: Client,
    base_url: String,
}

impl BackofficeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `GET /backoffice/features`
    pub async fn get_feature_toggles(&self) -> Result<Vec<FeatureToggleView>> {
        let url = format!("{}/backoffice/features", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StoreError::Backoffice(e.to_string()))?;

        let body: ApiResponse<Vec<FeatureToggleView>> = response
            .json()
            .await
            .map_err(|e| StoreError::Backoffice(format!("malformed toggle list: {e}")))?;
        Ok(body.data.unwrap_or_default())
    }
}
