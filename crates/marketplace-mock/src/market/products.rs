use chrono::{DateTime, Utc};
use common::{PageRequest, PageResponse};
use serde::{Deserialize, Serialize};

use super::sellers::Seller;
use super::{MarketData, Marketplace, unique_id};
use crate::error::{MarketError, Result};
use crate::validation::{Validate, Violations};

pub const MAX_PRODUCT_NAME_LENGTH: usize = 500;
pub const DEFAULT_SHIPPING_FEE: i64 = 3000;
/// Ceiling for any single price field, in KRW.
pub const MAX_PRICE: i64 = 1_000_000_000;
/// Ceiling for the quantity of one cart or order line.
pub const MAX_QUANTITY: i32 = 10_000;

fn amount_too_large() -> MarketError {
    MarketError::business("Amount is too large")
}

/// `unit_price * quantity`, refusing totals that do not fit.
pub(crate) fn line_total(unit_price: i64, quantity: i32) -> Result<i64> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_too_large)
}

/// `a + b` for money amounts, refusing totals that do not fit.
pub(crate) fn add_amounts(a: i64, b: i64) -> Result<i64> {
    a.checked_add(b).ok_or_else(amount_too_large)
}

wire_enum!(ProductStatus, "product status" {
    Sale => "SALE",
    Suspend => "SUSPEND",
    OutOfStock => "OUTOFSTOCK",
    Close => "CLOSE",
});

wire_enum!(ShippingType, "shipping type" {
    Free => "FREE",
    ConditionalFree => "CONDITIONAL_FREE",
    Paid => "PAID",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub image_url: String,
    pub image_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub option_id: String,
    pub option_name: String,
    pub option_value: String,
    pub additional_price: i64,
    pub stock_quantity: i32,
    pub use_yn: bool,
}

/// A listed product. Prices are whole KRW.
#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: String,
    pub seller_id: String,
    pub name: String,
    pub category_id: String,
    pub brand: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub description: Option<String>,
    pub detail_content: Option<String>,
    pub main_image: Option<String>,
    pub is_kakao_pay: bool,
    pub shipping_type: ShippingType,
    pub shipping_fee: i64,
    pub images: Vec<ProductImage>,
    pub options: Vec<ProductOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price a buyer pays before options: the sale price when set.
    pub fn effective_price(&self) -> i64 {
        self.sale_price.unwrap_or(self.price)
    }

    /// Effective price plus the surcharge of `option`.
    pub fn unit_price(&self, option: Option<&ProductOption>) -> Result<i64> {
        add_amounts(
            self.effective_price(),
            option.map_or(0, |o| o.additional_price),
        )
    }

    pub fn option(&self, option_id: &str) -> Result<&ProductOption> {
        self.options
            .iter()
            .find(|o| o.option_id == option_id)
            .ok_or_else(|| MarketError::business(format!("Option not found: {option_id}")))
    }
}

// -- Requests --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductImageRequest {
    pub image_url: String,
    pub image_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductOptionRequest {
    pub option_name: String,
    pub option_value: String,
    pub additional_price: i64,
    pub stock_quantity: i32,
}

/// Body of `POST /v1/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductCreateRequest {
    pub name: String,
    pub category_id: String,
    pub brand: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    pub description: Option<String>,
    pub detail_content: Option<String>,
    pub main_image: Option<String>,
    pub is_kakao_pay: bool,
    pub shipping_type: String,
    pub shipping_fee: Option<i64>,
    pub images: Vec<ProductImageRequest>,
    pub options: Vec<ProductOptionRequest>,
}

impl Default for ProductCreateRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            category_id: String::new(),
            brand: None,
            price: 0,
            sale_price: None,
            stock_quantity: 0,
            description: None,
            detail_content: None,
            main_image: None,
            is_kakao_pay: true,
            shipping_type: ShippingType::Paid.as_str().to_string(),
            shipping_fee: Some(DEFAULT_SHIPPING_FEE),
            images: Vec::new(),
            options: Vec::new(),
        }
    }
}

impl Validate for ProductCreateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.name, "name")
            .max_chars(&self.name, MAX_PRODUCT_NAME_LENGTH, "name")
            .required(&self.category_id, "categoryId")
            .check(self.price > 0, "price", "must be greater than 0")
            .check(self.price <= MAX_PRICE, "price", &format!("must be at most {MAX_PRICE}"))
            .check(
                self.sale_price.is_none_or(|s| s > 0),
                "salePrice",
                "must be greater than 0",
            )
            .check(
                self.sale_price.is_none_or(|s| s <= self.price),
                "salePrice",
                "must not exceed price",
            )
            .check(self.stock_quantity >= 0, "stockQuantity", "must not be negative")
            .required(&self.shipping_type, "shippingType");

        for (i, image) in self.images.iter().enumerate() {
            v.required(&image.image_url, &format!("images[{i}].imageUrl"))
                .check(
                    image.image_order >= 0,
                    &format!("images[{i}].imageOrder"),
                    "must not be negative",
                );
        }
        for (i, option) in self.options.iter().enumerate() {
            v.required(&option.option_name, &format!("options[{i}].optionName"))
                .required(&option.option_value, &format!("options[{i}].optionValue"))
                .check(
                    option.additional_price >= 0,
                    &format!("options[{i}].additionalPrice"),
                    "must not be negative",
                )
                .check(
                    option.additional_price <= MAX_PRICE,
                    &format!("options[{i}].additionalPrice"),
                    &format!("must be at most {MAX_PRICE}"),
                )
                .check(
                    option.stock_quantity >= 0,
                    &format!("options[{i}].stockQuantity"),
                    "must not be negative",
                );
        }
        v.finish()
    }
}

/// Body of `PUT /v1/products/{id}`; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i64>,
    pub sale_price: Option<i64>,
    pub stock_quantity: Option<i32>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub detail_content: Option<String>,
    pub main_image: Option<String>,
    pub is_kakao_pay: Option<bool>,
    pub shipping_type: Option<String>,
    pub shipping_fee: Option<i64>,
}

impl Validate for ProductUpdateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        if let Some(name) = &self.name {
            v.required(name, "name")
                .max_chars(name, MAX_PRODUCT_NAME_LENGTH, "name");
        }
        v.check(self.price.is_none_or(|p| p > 0), "price", "must be greater than 0")
            .check(
                self.price.is_none_or(|p| p <= MAX_PRICE),
                "price",
                &format!("must be at most {MAX_PRICE}"),
            )
            .check(
                self.sale_price.is_none_or(|s| s > 0),
                "salePrice",
                "must be greater than 0",
            )
            .check(
                self.sale_price
                    .zip(self.price)
                    .is_none_or(|(sale, price)| sale <= price),
                "salePrice",
                "must not exceed price",
            )
            .check(
                self.stock_quantity.is_none_or(|q| q >= 0),
                "stockQuantity",
                "must not be negative",
            );
        v.finish()
    }
}

/// Query of `GET /v1/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductSearchQuery {
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub keyword: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for ProductSearchQuery {
    fn default() -> Self {
        let paging = PageRequest::default();
        Self {
            status: None,
            category_id: None,
            keyword: None,
            page: paging.page,
            size: paging.size,
        }
    }
}

impl ProductSearchQuery {
    pub fn paging(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

// -- Views --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub product_id: String,
    pub seller_id: String,
    pub name: String,
    pub category_id: String,
    pub category_name: String,
    pub brand: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub is_kakao_pay: bool,
    pub shipping_type: ShippingType,
    pub shipping_fee: i64,
    pub images: Vec<ProductImage>,
    pub options: Vec<ProductOption>,
    pub review_count: u64,
    pub average_rating: Option<f64>,
    pub wish_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub main_image: Option<String>,
    pub is_kakao_pay: bool,
    pub shipping_type: ShippingType,
    pub review_count: u64,
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl MarketData {
    /// Number of reviews and their mean rating for a product.
    pub(crate) fn review_stats(&self, product_id: &str) -> (u64, Option<f64>) {
        let ratings: Vec<u8> = self
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return (0, None);
        }
        let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
        (ratings.len() as u64, Some(f64::from(sum) / ratings.len() as f64))
    }

    pub(crate) fn product_view(&self, product: &Product) -> Result<ProductView> {
        let category = self.categories
            .iter()
            .find(|c| c.category_id == product.category_id)
            .ok_or_else(|| {
                MarketError::Internal(format!(
                    "product {} references unknown category {}",
                    product.product_id, product.category_id
                ))
            })?;
        let (review_count, average_rating) = self.review_stats(&product.product_id);
        let wish_count = self
            .wishlist
            .iter()
            .filter(|w| w.product_id == product.product_id)
            .count() as u64;

        Ok(ProductView {
            product_id: product.product_id.clone(),
            seller_id: product.seller_id.clone(),
            name: product.name.clone(),
            category_id: product.category_id.clone(),
            category_name: category.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            sale_price: product.sale_price,
            stock_quantity: product.stock_quantity,
            status: product.status,
            description: product.description.clone(),
            main_image: product.main_image.clone(),
            is_kakao_pay: product.is_kakao_pay,
            shipping_type: product.shipping_type,
            shipping_fee: product.shipping_fee,
            images: product.images.clone(),
            options: product.options.clone(),
            review_count,
            average_rating,
            wish_count,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }

    pub(crate) fn product_summary(&self, product: &Product) -> ProductSummary {
        let (review_count, average_rating) = self.review_stats(&product.product_id);
        ProductSummary {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            sale_price: product.sale_price,
            stock_quantity: product.stock_quantity,
            status: product.status,
            main_image: product.main_image.clone(),
            is_kakao_pay: product.is_kakao_pay,
            shipping_type: product.shipping_type,
            review_count,
            average_rating,
            created_at: product.created_at,
        }
    }

    /// Newest first.
    fn summaries<'a>(
        &self,
        products: impl DoubleEndedIterator<Item = &'a Product>,
        paging: &PageRequest,
    ) -> PageResponse<ProductSummary> {
        let newest_first: Vec<&Product> = products.rev().collect();
        PageResponse::paginate(newest_first, paging).map(|p| self.product_summary(p))
    }

    fn owned_product_mut(&mut self, seller_id: &str, product_id: &str) -> Result<&mut Product> {
        let product = self.product_mut(product_id)?;
        if product.seller_id != seller_id {
            return Err(MarketError::business("Not allowed to modify this product"));
        }
        Ok(product)
    }
}

impl Marketplace {
    #[tracing::instrument(skip(self, seller, request), fields(seller_id = %seller.seller_id))]
    pub async fn create_product(
        &self,
        seller: &Seller,
        request: ProductCreateRequest,
    ) -> Result<ProductView> {
        let mut data = self.data.write().await;
        data.category(&request.category_id)?;
        let shipping_type: ShippingType = request.shipping_type.parse()?;

        let prefixes = self.prefixes();
        let product_id = unique_id(prefixes.product, |id| {
            data.products.iter().any(|p| p.product_id == id)
        });
        let mut options: Vec<ProductOption> = Vec::with_capacity(request.options.len());
        for option in request.options {
            let option_id = unique_id(prefixes.option, |id| {
                options.iter().any(|o| o.option_id == id)
                    || data
                        .products
                        .iter()
                        .flat_map(|p| &p.options)
                        .any(|o| o.option_id == id)
            });
            options.push(ProductOption {
                option_id,
                option_name: option.option_name,
                option_value: option.option_value,
                additional_price: option.additional_price,
                stock_quantity: option.stock_quantity,
                use_yn: true,
            });
        }

        let now = Utc::now();
        let product = Product {
            product_id,
            seller_id: seller.seller_id.clone(),
            name: request.name,
            category_id: request.category_id,
            brand: request.brand,
            price: request.price,
            sale_price: request.sale_price,
            stock_quantity: request.stock_quantity,
            status: ProductStatus::Sale,
            description: request.description,
            detail_content: request.detail_content,
            main_image: request.main_image,
            is_kakao_pay: request.is_kakao_pay,
            shipping_type,
            shipping_fee: request.shipping_fee.unwrap_or(DEFAULT_SHIPPING_FEE),
            images: request
                .images
                .into_iter()
                .map(|i| ProductImage {
                    image_url: i.image_url,
                    image_order: i.image_order,
                })
                .collect(),
            options,
            created_at: now,
            updated_at: now,
        };
        let view = data.product_view(&product)?;
        data.products.push(product);

        tracing::info!(product_id = %view.product_id, "product created");
        Ok(view)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        seller_id: &str,
        product_id: &str,
        request: ProductUpdateRequest,
    ) -> Result<ProductView> {
        let mut data = self.data.write().await;
        data.owned_product_mut(seller_id, product_id)?;

        let status = request
            .status
            .as_deref()
            .map(str::parse::<ProductStatus>)
            .transpose()?;
        let shipping_type = request
            .shipping_type
            .as_deref()
            .map(str::parse::<ShippingType>)
            .transpose()?;
        if let Some(category_id) = &request.category_id {
            data.category(category_id)?;
        }

        let product = data.owned_product_mut(seller_id, product_id)?;
        let price = request.price.unwrap_or(product.price);
        if request
            .sale_price
            .or(product.sale_price)
            .is_some_and(|sale| sale > price)
        {
            return Err(MarketError::field("salePrice", "must not exceed price"));
        }
        if let Some(name) = request.name {
            product.name = name;
        }
        if let Some(category_id) = request.category_id {
            product.category_id = category_id;
        }
        if request.brand.is_some() {
            product.brand = request.brand;
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if request.sale_price.is_some() {
            product.sale_price = request.sale_price;
        }
        if let Some(stock) = request.stock_quantity {
            product.stock_quantity = stock;
        }
        if let Some(status) = status {
            product.status = status;
        }
        if request.description.is_some() {
            product.description = request.description;
        }
        if request.detail_content.is_some() {
            product.detail_content = request.detail_content;
        }
        if request.main_image.is_some() {
            product.main_image = request.main_image;
        }
        if let Some(kakao_pay) = request.is_kakao_pay {
            product.is_kakao_pay = kakao_pay;
        }
        if let Some(shipping_type) = shipping_type {
            product.shipping_type = shipping_type;
        }
        if let Some(fee) = request.shipping_fee {
            product.shipping_fee = fee;
        }
        product.updated_at = Utc::now();

        let data = &*data;
        data.product_view(data.product(product_id)?)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<ProductView> {
        let data = self.data.read().await;
        data.product_view(data.product(product_id)?)
    }

    /// The seller's products, filtered by the first present criterion in
    /// order keyword, status, category.
    pub async fn seller_products(
        &self,
        seller_id: &str,
        query: &ProductSearchQuery,
    ) -> Result<PageResponse<ProductSummary>> {
        let data = self.data.read().await;
        let own = data.products.iter().filter(|p| p.seller_id == seller_id);
        let paging = query.paging();

        let page = if let Some(keyword) = &query.keyword {
            let keyword = keyword.to_lowercase();
            data.summaries(
                own.filter(|p| p.name.to_lowercase().contains(&keyword)),
                &paging,
            )
        } else if let Some(status) = &query.status {
            let status: ProductStatus = status.parse()?;
            data.summaries(own.filter(|p| p.status == status), &paging)
        } else if let Some(category_id) = &query.category_id {
            data.summaries(own.filter(|p| &p.category_id == category_id), &paging)
        } else {
            data.summaries(own, &paging)
        };
        Ok(page)
    }

    /// On-sale products that accept Kakao Pay, newest first.
    pub async fn kakao_pay_products(&self, paging: &PageRequest) -> PageResponse<ProductSummary> {
        let data = self.data.read().await;
        data.summaries(
            data.products
                .iter()
                .filter(|p| p.is_kakao_pay && p.status == ProductStatus::Sale),
            paging,
        )
    }

    /// Removes a product together with the cart and wishlist entries pointing at it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, seller_id: &str, product_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.owned_product_mut(seller_id, product_id)?;
        data.products.retain(|p| p.product_id != product_id);
        data.carts.retain(|c| c.product_id != product_id);
        data.wishlist.retain(|w| w.product_id != product_id);
        tracing::info!("product deleted");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market::sellers::tests::registration;
    use crate::platform::Platform;

    pub(crate) fn product_request(name: &str, price: i64, stock: i32) -> ProductCreateRequest {
        ProductCreateRequest {
            name: name.to_string(),
            category_id: "CAT_2_1_1".to_string(),
            price,
            stock_quantity: stock,
            ..ProductCreateRequest::default()
        }
    }

    pub(crate) async fn seller(market: &Marketplace, business_number: &str) -> Seller {
        let view = market.register_seller(registration(business_number)).await.unwrap();
        market.authenticate_seller(&view.api_key).await.unwrap()
    }

    #[tokio::test]
    async fn create_applies_defaults_and_generates_option_ids() {
        let market = Marketplace::new(Platform::Kakao);
        let seller = seller(&market, "123-45-67890").await;
        let mut request = product_request("Phone", 500_000, 10);
        request.options = vec![ProductOptionRequest {
            option_name: "Colour".to_string(),
            option_value: "Black".to_string(),
            additional_price: 10_000,
            stock_quantity: 3,
        }];

        let product = market.create_product(&seller, request).await.unwrap();

        assert!(product.product_id.starts_with("KK_PRD_"));
        assert_eq!(product.category_name, "Smartphones");
        assert_eq!(product.status, ProductStatus::Sale);
        assert_eq!(product.shipping_type, ShippingType::Paid);
        assert_eq!(product.shipping_fee, DEFAULT_SHIPPING_FEE);
        assert!(product.is_kakao_pay);
        assert_eq!(product.review_count, 0);
        assert_eq!(product.average_rating, None);
        assert!(product.options[0].option_id.starts_with("KK_OPT_"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_and_shipping_type() {
        let market = Marketplace::new(Platform::Naver);
        let seller = seller(&market, "123-45-67890").await;

        let mut request = product_request("Phone", 1000, 1);
        request.category_id = "CAT_404".to_string();
        let err = market.create_product(&seller, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Category not found");

        let mut request = product_request("Phone", 1000, 1);
        request.shipping_type = "DRONE".to_string();
        let err = market.create_product(&seller, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid shipping type: DRONE");
        assert_eq!(market.product_count().await, 0);
    }

    #[tokio::test]
    async fn update_is_partial_and_owner_only() {
        let market = Marketplace::new(Platform::Naver);
        let owner = seller(&market, "123-45-67890").await;
        let other = seller(&market, "999-99-99999").await;
        let product = market
            .create_product(&owner, product_request("Phone", 1000, 1))
            .await
            .unwrap();

        let update = ProductUpdateRequest {
            sale_price: Some(900),
            status: Some("SUSPEND".to_string()),
            ..ProductUpdateRequest::default()
        };
        let updated = market
            .update_product(&owner.seller_id, &product.product_id, update)
            .await
            .unwrap();
        assert_eq!(updated.name, "Phone");
        assert_eq!(updated.sale_price, Some(900));
        assert_eq!(updated.status, ProductStatus::Suspend);

        let err = market
            .update_product(&other.seller_id, &product.product_id, ProductUpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not allowed to modify this product");

        let bad_status = ProductUpdateRequest {
            status: Some("GONE".to_string()),
            ..ProductUpdateRequest::default()
        };
        assert!(
            market
                .update_product(&owner.seller_id, &product.product_id, bad_status)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn seller_listing_prefers_keyword_then_status_then_category() {
        let market = Marketplace::new(Platform::Naver);
        let seller = seller(&market, "123-45-67890").await;
        for name in ["Galaxy Case", "iPhone Case", "Charger"] {
            market
                .create_product(&seller, product_request(name, 1000, 1))
                .await
                .unwrap();
        }

        let query = ProductSearchQuery {
            keyword: Some("case".to_string()),
            status: Some("CLOSE".to_string()),
            ..ProductSearchQuery::default()
        };
        let page = market.seller_products(&seller.seller_id, &query).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["iPhone Case", "Galaxy Case"]);

        let query = ProductSearchQuery {
            status: Some("CLOSE".to_string()),
            ..ProductSearchQuery::default()
        };
        let page = market.seller_products(&seller.seller_id, &query).await.unwrap();
        assert_eq!(page.total_items, 0);

        let query = ProductSearchQuery {
            category_id: Some("CAT_2_1_1".to_string()),
            size: 2,
            ..ProductSearchQuery::default()
        };
        let page = market.seller_products(&seller.seller_id, &query).await.unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].name, "Charger");
    }

    #[tokio::test]
    async fn kakao_pay_listing_only_shows_products_on_sale() {
        let market = Marketplace::new(Platform::Kakao);
        let seller = seller(&market, "123-45-67890").await;
        market
            .create_product(&seller, product_request("Pay", 1000, 1))
            .await
            .unwrap();
        let mut no_pay = product_request("NoPay", 1000, 1);
        no_pay.is_kakao_pay = false;
        market.create_product(&seller, no_pay).await.unwrap();
        let closed = market
            .create_product(&seller, product_request("Closed", 1000, 1))
            .await
            .unwrap();
        let close = ProductUpdateRequest {
            status: Some("CLOSE".to_string()),
            ..ProductUpdateRequest::default()
        };
        market
            .update_product(&seller.seller_id, &closed.product_id, close)
            .await
            .unwrap();

        let page = market.kakao_pay_products(&PageRequest::default()).await;
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pay"]);
    }

    #[tokio::test]
    async fn delete_is_owner_only() {
        let market = Marketplace::new(Platform::Naver);
        let owner = seller(&market, "123-45-67890").await;
        let other = seller(&market, "999-99-99999").await;
        let product = market
            .create_product(&owner, product_request("Phone", 1000, 1))
            .await
            .unwrap();

        assert!(market.delete_product(&other.seller_id, &product.product_id).await.is_err());
        market
            .delete_product(&owner.seller_id, &product.product_id)
            .await
            .unwrap();
        assert_eq!(market.product_count().await, 0);
        assert!(market.get_product(&product.product_id).await.is_err());
    }

    #[test]
    fn create_validation_names_nested_fields() {
        let mut request = product_request("", 0, -1);
        request.images = vec![ProductImageRequest::default()];
        match request.validate() {
            Err(MarketError::Validation(details)) => {
                assert!(details.contains_key("name"));
                assert!(details.contains_key("price"));
                assert!(details.contains_key("stockQuantity"));
                assert!(details.contains_key("images[0].imageUrl"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn violation_fields(result: Result<()>) -> Vec<String> {
        match result {
            Err(MarketError::Validation(details)) => details.into_keys().collect(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn create_validation_checks_sale_price() {
        let mut request = product_request("Phone", 10_000, 1);
        request.sale_price = Some(-5_000);
        assert_eq!(violation_fields(request.validate()), vec!["salePrice"]);

        request.sale_price = Some(12_000);
        assert_eq!(violation_fields(request.validate()), vec!["salePrice"]);

        request.sale_price = Some(10_000);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_validation_caps_prices() {
        let mut request = product_request("Phone", MAX_PRICE + 1, 1);
        request.options = vec![ProductOptionRequest {
            option_name: "Colour".to_string(),
            option_value: "Gold".to_string(),
            additional_price: MAX_PRICE + 1,
            stock_quantity: 1,
        }];
        assert_eq!(
            violation_fields(request.validate()),
            vec!["options[0].additionalPrice", "price"]
        );
    }

    #[test]
    fn update_validation_checks_sale_price_and_price() {
        let negative = ProductUpdateRequest {
            sale_price: Some(-1),
            ..ProductUpdateRequest::default()
        };
        assert_eq!(violation_fields(negative.validate()), vec!["salePrice"]);

        let above_price = ProductUpdateRequest {
            price: Some(1_000),
            sale_price: Some(2_000),
            ..ProductUpdateRequest::default()
        };
        assert_eq!(violation_fields(above_price.validate()), vec!["salePrice"]);

        let too_expensive = ProductUpdateRequest {
            price: Some(MAX_PRICE + 1),
            ..ProductUpdateRequest::default()
        };
        assert_eq!(violation_fields(too_expensive.validate()), vec!["price"]);
    }

    #[tokio::test]
    async fn update_rejects_sale_price_above_stored_price() {
        let market = Marketplace::new(Platform::Naver);
        let seller = seller(&market, "123-45-67890").await;
        let mut request = product_request("Phone", 10_000, 1);
        request.sale_price = Some(8_000);
        let product = market.create_product(&seller, request).await.unwrap();

        let lower_price = ProductUpdateRequest {
            price: Some(5_000),
            ..ProductUpdateRequest::default()
        };
        let err = market
            .update_product(&seller.seller_id, &product.product_id, lower_price)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let unchanged = market.get_product(&product.product_id).await.unwrap();
        assert_eq!(unchanged.price, 10_000);
        assert_eq!(unchanged.sale_price, Some(8_000));
    }
}
