use async_trait::async_trait;

use crate::domain::{IntegrationPlatform, StoreRegistrationInfo, StoreRegistrationRequestInfo};
use crate::error::{Result, StoreError};

/// Registers a seller on one marketplace.
#[async_trait]
pub trait RegisterStore: Send + Sync {
    /// The marketplace this adaptor talks to.
    fn platform(&self) -> IntegrationPlatform;

    /// Registers the business and returns the marketplace's answer.
    async fn register(&self, request: &StoreRegistrationRequestInfo) -> Result<StoreRegistrationInfo>;
}

/// Dispatches registrations to the adaptor of the requested platform.
#[derive(Default)]
pub struct StoreIntegrationFactory {
    adaptors: Vec<Box<dyn RegisterStore>>,
}

impl StoreIntegrationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adaptor. The first adaptor for a platform wins.
    pub fn register(&mut self, adaptor: Box<dyn RegisterStore>) {
        self.adaptors.push(adaptor);
    }

    pub fn with_adaptor(mut self, adaptor: Box<dyn RegisterStore>) -> Self {
        self.register(adaptor);
        self
    }

    pub fn adaptor_count(&self) -> usize {
        self.adaptors.len()
    }

    pub fn supports(&self, platform: IntegrationPlatform) -> bool {
        self.adaptors.iter().any(|a| a.platform() == platform)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn register_store(
        &self,
        platform: IntegrationPlatform,
        request: &StoreRegistrationRequestInfo,
    ) -> Result<StoreRegistrationInfo> {
        let adaptor = self
            .adaptors
            .iter()
            .find(|a| a.platform() == platform)
            .ok_or(StoreError::UnsupportedPlatform(platform))?;

        adaptor.register(request).await
    }
}
