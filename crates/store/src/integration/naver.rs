use async_trait::async_trait;

use super::{MarketplaceClient, RegisterSellerBody, RegisterStore};
use crate::domain::{IntegrationPlatform, StoreRegistrationInfo, StoreRegistrationRequestInfo};
use crate::error::Result;

/// Seller registration on Naver.
pub struct NaverAdaptor {
    client: MarketplaceClient,
}

impl NaverAdaptor {
    pub fn new(client: MarketplaceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegisterStore for NaverAdaptor {
    fn platform(&self) -> IntegrationPlatform {
        IntegrationPlatform::Naver
    }

    async fn register(&self, request: &StoreRegistrationRequestInfo) -> Result<StoreRegistrationInfo> {
        let seller = self
            .client
            .register_seller(&RegisterSellerBody::from(request))
            .await?;

        Ok(StoreRegistrationInfo {
            platform_id: seller.seller_id,
            status: seller.status,
            platform: self.platform(),
        })
    }
}
