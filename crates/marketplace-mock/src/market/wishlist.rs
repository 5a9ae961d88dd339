use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Marketplace;
use super::products::ProductSummary;
use crate::error::Result;
use crate::validation::{Validate, Violations};

#[derive(Debug, Clone)]
pub struct WishlistEntry {
    pub buyer_kakao_id: String,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: String,
}

impl Validate for WishlistRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.product_id, "productId");
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub product: ProductSummary,
    pub created_at: DateTime<Utc>,
}

impl Marketplace {
    /// Adds the product to the wishlist, or removes it when already there.
    /// Returns whether the product is wished afterwards.
    pub async fn toggle_wishlist(&self, kakao_id: &str, product_id: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        data.product(product_id)?;

        let before = data.wishlist.len();
        data.wishlist
            .retain(|w| !(w.buyer_kakao_id == kakao_id && w.product_id == product_id));
        if data.wishlist.len() < before {
            return Ok(false);
        }

        data.wishlist.push(WishlistEntry {
            buyer_kakao_id: kakao_id.to_string(),
            product_id: product_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    pub async fn wishlist(&self, kakao_id: &str) -> Result<Vec<WishlistView>> {
        let data = self.data.read().await;
        data.wishlist
            .iter()
            .filter(|w| w.buyer_kakao_id == kakao_id)
            .map(|w| {
                Ok(WishlistView {
                    product: data.product_summary(data.product(&w.product_id)?),
                    created_at: w.created_at,
                })
            })
            .collect()
    }

    pub async fn is_wished(&self, kakao_id: &str, product_id: &str) -> bool {
        let data = self.data.read().await;
        data.wishlist
            .iter()
            .any(|w| w.buyer_kakao_id == kakao_id && w.product_id == product_id)
    }
}
