use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{IntegrationPlatform, StoreRegistrationRequestInfo};
use crate::error::{Result, StoreError};

/// Body of `POST /v1/seller/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerBody {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&StoreRegistrationRequestInfo> for RegisterSellerBody {
    fn from(info: &StoreRegistrationRequestInfo) -> Self {
        Self {
            business_name: info.business_name.clone(),
            business_number: info.business_number.clone(),
            representative_name: info.representative_name.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
        }
    }
}

/// The part of a registered seller the store service cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerRegistration {
    pub seller_id: String,
    pub status: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for one marketplace's seller API.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
    platform: IntegrationPlatform,
}

impl MarketplaceClient {
    pub fn new(
        platform: IntegrationPlatform,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform,
        })
    }

    pub fn platform(&self) -> IntegrationPlatform {
        self.platform
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self, body), fields(platform = %self.platform))]
    pub async fn register_seller(&self, body: &RegisterSellerBody) -> Result<SellerRegistration> {
        self.post_json("/v1/seller/register", body).await
    }

    async fn post_json<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &Req,
    ) -> Result<Res> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(StoreError::PlatformRejected {
                platform: self.platform,
                message,
            });
        }

        let envelope: Envelope<Res> = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("malformed response: {e}")))?;
        envelope
            .data
            .ok_or_else(|| self.unavailable("response without data".to_string()))
    }

    fn unavailable(&self, reason: String) -> StoreError {
        StoreError::PlatformUnavailable {
            platform: self.platform,
            reason,
        }
    }
}
