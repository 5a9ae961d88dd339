use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marketplaces a store can be integrated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationPlatform {
    Kakao,
    Naver,
    Coupang,
    Gmarket,
    Carrot,
    OpenMarket,
}

impl IntegrationPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationPlatform::Kakao => "KAKAO",
            IntegrationPlatform::Naver => "NAVER",
            IntegrationPlatform::Coupang => "COUPANG",
            IntegrationPlatform::Gmarket => "GMARKET",
            IntegrationPlatform::Carrot => "CARROT",
            IntegrationPlatform::OpenMarket => "OPEN_MARKET",
        }
    }

    /// Whether the platform reports seller state with the
    /// `PENDING/APPROVED/REJECTED/SUSPENDED` vocabulary.
    pub fn speaks_seller_status(&self) -> bool {
        !matches!(self, IntegrationPlatform::OpenMarket)
    }
}

impl fmt::Display for IntegrationPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KAKAO" => Ok(IntegrationPlatform::Kakao),
            "NAVER" => Ok(IntegrationPlatform::Naver),
            "COUPANG" => Ok(IntegrationPlatform::Coupang),
            "GMARKET" => Ok(IntegrationPlatform::Gmarket),
            "CARROT" => Ok(IntegrationPlatform::Carrot),
            "OPEN_MARKET" => Ok(IntegrationPlatform::OpenMarket),
            other => Err(format!("unknown integration platform: {other}")),
        }
    }
}

/// Local lifecycle of a store, derived from the marketplace seller status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreStatus {
    /// Waiting for the marketplace (`PENDING`, `SUSPENDED`).
    Register,
    /// Approved by the marketplace.
    Confirm,
    /// Rejected by the marketplace.
    NotConfirm,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Register => "REGISTER",
            StoreStatus::Confirm => "CONFIRM",
            StoreStatus::NotConfirm => "NOT_CONFIRM",
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTER" => Ok(StoreStatus::Register),
            "CONFIRM" => Ok(StoreStatus::Confirm),
            "NOT_CONFIRM" => Ok(StoreStatus::NotConfirm),
            other => Err(format!("unknown store status: {other}")),
        }
    }
}
