use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Marketplace, unique_id};
use crate::error::{MarketError, Result};
use crate::validation::{Validate, Violations};

pub const MAX_BUSINESS_NAME_LENGTH: usize = 200;
pub const MAX_REPRESENTATIVE_NAME_LENGTH: usize = 100;

wire_enum!(
    /// Where a seller is in the onboarding review.
    SellerStatus, "seller status" {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Suspended => "SUSPENDED",
    }
);

#[derive(Debug, Clone)]
pub struct Seller {
    pub seller_id: String,
    pub kakao_account_id: Option<String>,
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    pub api_key: String,
    pub api_secret: String,
    pub status: SellerStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /v1/seller/register`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SellerRegistrationRequest {
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    pub kakao_account_id: Option<String>,
}

impl Validate for SellerRegistrationRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.business_name, "businessName")
            .max_chars(&self.business_name, MAX_BUSINESS_NAME_LENGTH, "businessName")
            .required(&self.business_number, "businessNumber")
            .business_number(&self.business_number, "businessNumber")
            .required(&self.representative_name, "representativeName")
            .max_chars(
                &self.representative_name,
                MAX_REPRESENTATIVE_NAME_LENGTH,
                "representativeName",
            )
            .required(&self.email, "email")
            .email(&self.email, "email")
            .required(&self.phone, "phone")
            .phone(&self.phone, "phone");
        v.finish()
    }
}

/// A seller as the API shows it. The secret is never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerView {
    pub seller_id: String,
    pub kakao_account_id: Option<String>,
    pub business_name: String,
    pub business_number: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    pub status: SellerStatus,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Seller> for SellerView {
    fn from(seller: &Seller) -> Self {
        Self {
            seller_id: seller.seller_id.clone(),
            kakao_account_id: seller.kakao_account_id.clone(),
            business_name: seller.business_name.clone(),
            business_number: seller.business_number.clone(),
            representative_name: seller.representative_name.clone(),
            email: seller.email.clone(),
            phone: seller.phone.clone(),
            status: seller.status,
            api_key: seller.api_key.clone(),
            created_at: seller.created_at,
        }
    }
}

impl Marketplace {
    /// Registers a seller in `PENDING` with fresh API credentials.
    #[tracing::instrument(skip(self, request), fields(platform = %self.platform))]
    pub async fn register_seller(&self, request: SellerRegistrationRequest) -> Result<SellerView> {
        let mut data = self.data.write().await;

        if data
            .sellers
            .iter()
            .any(|s| s.business_number == request.business_number)
        {
            return Err(MarketError::business("Business number already registered"));
        }
        if let Some(account) = &request.kakao_account_id
            && data
                .sellers
                .iter()
                .any(|s| s.kakao_account_id.as_ref() == Some(account))
        {
            return Err(MarketError::business("Kakao account already registered"));
        }

        let seller_id = unique_id(self.prefixes().seller, |id| {
            data.sellers.iter().any(|s| s.seller_id == id)
        });
        let seller = Seller {
            seller_id,
            kakao_account_id: request.kakao_account_id,
            business_name: request.business_name,
            business_number: request.business_number,
            representative_name: request.representative_name,
            email: request.email,
            phone: request.phone,
            api_key: common::generate_api_key(),
            api_secret: common::generate_api_key(),
            status: SellerStatus::Pending,
            created_at: Utc::now(),
        };
        let view = SellerView::from(&seller);
        data.sellers.push(seller);

        metrics::counter!("marketplace_sellers_registered_total", "platform" => self.platform.as_str())
            .increment(1);
        tracing::info!(seller_id = %view.seller_id, "seller registered");
        Ok(view)
    }

    pub async fn get_seller(&self, seller_id: &str) -> Result<SellerView> {
        let data = self.data.read().await;
        data.sellers
            .iter()
            .find(|s| s.seller_id == seller_id)
            .map(SellerView::from)
            .ok_or_else(|| MarketError::business("Seller not found"))
    }

    /// Looks a seller up by Kakao account; `None` when nobody registered it.
    pub async fn find_seller_by_kakao_account(&self, kakao_account_id: &str) -> Option<SellerView> {
        let data = self.data.read().await;
        data.sellers
            .iter()
            .find(|s| s.kakao_account_id.as_deref() == Some(kakao_account_id))
            .map(SellerView::from)
    }

    pub async fn approve_seller(&self, seller_id: &str) -> Result<SellerView> {
        self.set_seller_status(seller_id, SellerStatus::Approved).await
    }

    pub async fn reject_seller(&self, seller_id: &str) -> Result<SellerView> {
        self.set_seller_status(seller_id, SellerStatus::Rejected).await
    }

    async fn set_seller_status(&self, seller_id: &str, status: SellerStatus) -> Result<SellerView> {
        let mut data = self.data.write().await;
        let seller = data
            .sellers
            .iter_mut()
            .find(|s| s.seller_id == seller_id)
            .ok_or_else(|| MarketError::business("Seller not found"))?;
        seller.status = status;
        tracing::info!(%seller_id, %status, "seller status changed");
        Ok(SellerView::from(&*seller))
    }

    /// Resolves the seller owning `api_key`.
    pub async fn authenticate_seller(&self, api_key: &str) -> Result<Seller> {
        let data = self.data.read().await;
        data.sellers
            .iter()
            .find(|s| s.api_key == api_key)
            .cloned()
            .ok_or_else(|| MarketError::Unauthorized("Invalid API key".to_string()))
    }
}
