use serde::{Deserialize, Serialize};

use super::{IntegrationPlatform, StoreStatus};
use crate::error::{Result, StoreError};

/// Business details sent to a marketplace when registering a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRegistrationRequestInfo {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
}

/// What a marketplace answered to a seller registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRegistrationInfo {
    pub platform_id: String,
    /// Raw seller status as reported by the marketplace.
    pub status: String,
    pub platform: IntegrationPlatform,
}

impl StoreRegistrationInfo {
    /// Maps the marketplace seller status onto [`StoreStatus`].
    pub fn integration_status(&self) -> Result<StoreStatus> {
        if !self.platform.speaks_seller_status() {
            return Err(self.unknown_status());
        }

        match self.status.as_str() {
            "PENDING" | "SUSPENDED" => Ok(StoreStatus::Register),
            "APPROVED" => Ok(StoreStatus::Confirm),
            "REJECTED" => Ok(StoreStatus::NotConfirm),
            _ => Err(self.unknown_status()),
        }
    }

    fn unknown_status(&self) -> StoreError {
        StoreError::UnknownPlatformStatus {
            platform: self.platform,
            status: self.status.clone(),
        }
    }
}
