use chrono::{DateTime, Utc};
use common::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};

use super::{Marketplace, unique_id};
use crate::error::{MarketError, Result};
use crate::validation::{Validate, Violations};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImage {
    pub image_url: String,
    pub image_order: usize,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub review_id: String,
    pub product_id: String,
    pub order_id: String,
    pub buyer_kakao_id: String,
    pub buyer_name: String,
    pub rating: u8,
    pub content: Option<String>,
    pub is_photo_review: bool,
    pub images: Vec<ReviewImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn rating_in_range(rating: i32) -> bool {
    (i32::from(MIN_RATING)..=i32::from(MAX_RATING)).contains(&rating)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewCreateRequest {
    pub order_id: String,
    pub product_id: String,
    pub rating: i32,
    pub content: Option<String>,
    pub image_urls: Vec<String>,
}

impl Validate for ReviewCreateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.order_id, "orderId")
            .required(&self.product_id, "productId")
            .check(rating_in_range(self.rating), "rating", "must be between 1 and 5");
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewUpdateRequest {
    pub rating: Option<i32>,
    pub content: Option<String>,
}

impl Validate for ReviewUpdateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.check(
            self.rating.is_none_or(rating_in_range),
            "rating",
            "must be between 1 and 5",
        );
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub review_id: String,
    pub product_id: String,
    pub order_id: String,
    pub buyer_kakao_id: String,
    pub buyer_name: String,
    pub rating: u8,
    pub content: Option<String>,
    pub is_photo_review: bool,
    pub images: Vec<ReviewImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            review_id: review.review_id.clone(),
            product_id: review.product_id.clone(),
            order_id: review.order_id.clone(),
            buyer_kakao_id: review.buyer_kakao_id.clone(),
            buyer_name: review.buyer_name.clone(),
            rating: review.rating,
            content: review.content.clone(),
            is_photo_review: review.is_photo_review,
            images: review.images.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

impl Marketplace {
    /// Writes a review for a product the buyer ordered. One review per
    /// order and buyer.
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_review(&self, kakao_id: &str, request: ReviewCreateRequest) -> Result<ReviewView> {
        let mut data = self.data.write().await;
        let order = data.order(&request.order_id)?;
        if order.buyer_kakao_id.as_deref() != Some(kakao_id) {
            return Err(MarketError::business("Not allowed to review this order"));
        }
        if data
            .reviews
            .iter()
            .any(|r| r.order_id == request.order_id && r.buyer_kakao_id == kakao_id)
        {
            return Err(MarketError::business("Review already written for this order"));
        }
        data.product(&request.product_id)?;
        if !order.items.iter().any(|i| i.product_id == request.product_id) {
            return Err(MarketError::business("Product was not part of this order"));
        }
        let buyer_name = order.buyer_name.clone();

        let review_id = unique_id(self.prefixes().review, |id| {
            data.reviews.iter().any(|r| r.review_id == id)
        });
        let now = Utc::now();
        let rating = u8::try_from(request.rating)
            .map_err(|_| MarketError::field("rating", "must be between 1 and 5"))?;
        let review = Review {
            review_id,
            product_id: request.product_id,
            order_id: request.order_id,
            buyer_kakao_id: kakao_id.to_string(),
            buyer_name,
            rating,
            content: request.content,
            is_photo_review: !request.image_urls.is_empty(),
            images: request
                .image_urls
                .into_iter()
                .enumerate()
                .map(|(image_order, image_url)| ReviewImage {
                    image_url,
                    image_order,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        let view = ReviewView::from(&review);
        data.reviews.push(review);
        Ok(view)
    }

    pub async fn update_review(
        &self,
        kakao_id: &str,
        review_id: &str,
        request: ReviewUpdateRequest,
    ) -> Result<ReviewView> {
        let mut data = self.data.write().await;
        let review = data
            .reviews
            .iter_mut()
            .find(|r| r.review_id == review_id)
            .ok_or_else(|| MarketError::business("Review not found"))?;
        if review.buyer_kakao_id != kakao_id {
            return Err(MarketError::business("Not allowed to modify this review"));
        }
        if let Some(rating) = request.rating {
            review.rating = u8::try_from(rating)
                .map_err(|_| MarketError::field("rating", "must be between 1 and 5"))?;
        }
        if request.content.is_some() {
            review.content = request.content;
        }
        review.updated_at = Utc::now();
        Ok(ReviewView::from(&*review))
    }

    pub async fn delete_review(&self, kakao_id: &str, review_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        let review = data
            .reviews
            .iter()
            .find(|r| r.review_id == review_id)
            .ok_or_else(|| MarketError::business("Review not found"))?;
        if review.buyer_kakao_id != kakao_id {
            return Err(MarketError::business("Not allowed to delete this review"));
        }
        data.reviews.retain(|r| r.review_id != review_id);
        Ok(())
    }

    /// Reviews of a product, newest first.
    pub async fn product_reviews(&self, product_id: &str, paging: &PageRequest) -> PageResponse<ReviewView> {
        let data = self.data.read().await;
        let newest_first: Vec<&Review> = data
            .reviews
            .iter()
            .rev()
            .filter(|r| r.product_id == product_id)
            .collect();
        PageResponse::paginate(newest_first, paging).map(ReviewView::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::orders::tests::{BUYER, order_request};
    use crate::market::products::tests::{product_request, seller};
    use crate::platform::Platform;

    struct Fixture {
        market: Marketplace,
        product_id: String,
        other_product_id: String,
        order_id: String,
    }

    async fn fixture() -> Fixture {
        let market = Marketplace::new(Platform::Kakao);
        let seller = seller(&market, "123-45-67890").await;
        let product_id = market
            .create_product(&seller, product_request("Kettle", 40_000, 5))
            .await
            .unwrap()
            .product_id;
        let other_product_id = market
            .create_product(&seller, product_request("Toaster", 50_000, 5))
            .await
            .unwrap()
            .product_id;
        let order_id = market
            .create_order(Some(BUYER), order_request(&[(product_id.as_str(), None, 1)]))
            .await
            .unwrap()
            .order_id;
        Fixture {
            market,
            product_id,
            other_product_id,
            order_id,
        }
    }

    fn review(fx: &Fixture, rating: i32, images: &[&str]) -> ReviewCreateRequest {
        ReviewCreateRequest {
            order_id: fx.order_id.clone(),
            product_id: fx.product_id.clone(),
            rating,
            content: Some("Boils fast".to_string()),
            image_urls: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn buyer_reviews_ordered_product_once() {
        let fx = fixture().await;
        let created = fx
            .market
            .create_review(BUYER, review(&fx, 4, &["a.jpg", "b.jpg"]))
            .await
            .unwrap();

        assert!(created.review_id.starts_with("KK_REV_"));
        assert!(created.is_photo_review);
        assert_eq!(created.images[1].image_order, 1);
        assert_eq!(created.buyer_name, "Lee Jiwoo");

        let err = fx
            .market
            .create_review(BUYER, review(&fx, 5, &[]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Review already written for this order");

        let product = fx.market.get_product(&fx.product_id).await.unwrap();
        assert_eq!(product.review_count, 1);
        assert_eq!(product.average_rating, Some(4.0));
    }

    #[tokio::test]
    async fn other_buyers_and_unordered_products_are_rejected() {
        let fx = fixture().await;
        let err = fx
            .market
            .create_review("stranger", review(&fx, 3, &[]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not allowed to review this order");

        let mut unordered = review(&fx, 3, &[]);
        unordered.product_id = fx.other_product_id.clone();
        let err = fx.market.create_review(BUYER, unordered).await.unwrap_err();
        assert_eq!(err.to_string(), "Product was not part of this order");
    }

    #[tokio::test]
    async fn update_and_delete_are_owner_only() {
        let fx = fixture().await;
        let created = fx
            .market
            .create_review(BUYER, review(&fx, 2, &[]))
            .await
            .unwrap();
        assert!(!created.is_photo_review);

        let update = ReviewUpdateRequest {
            rating: Some(5),
            content: None,
        };
        let updated = fx
            .market
            .update_review(BUYER, &created.review_id, update)
            .await
            .unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.content.as_deref(), Some("Boils fast"));

        assert!(
            fx.market
                .update_review("stranger", &created.review_id, ReviewUpdateRequest::default())
                .await
                .is_err()
        );
        assert!(fx.market.delete_review("stranger", &created.review_id).await.is_err());

        fx.market.delete_review(BUYER, &created.review_id).await.unwrap();
        let page = fx
            .market
            .product_reviews(&fx.product_id, &PageRequest::default())
            .await;
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn rating_outside_range_fails_validation() {
        let request = ReviewCreateRequest {
            order_id: "o".to_string(),
            product_id: "p".to_string(),
            rating: 6,
            ..ReviewCreateRequest::default()
        };
        assert!(request.validate().is_err());
        assert!(ReviewUpdateRequest { rating: Some(0), content: None }.validate().is_err());
        assert!(ReviewUpdateRequest::default().validate().is_ok());
    }
}
