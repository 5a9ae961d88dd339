use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::products::{MAX_QUANTITY, ProductOption, ShippingType, line_total};
use super::{MarketData, Marketplace, unique_id};
use crate::error::{MarketError, Result};
use crate::validation::{Validate, Violations};

#[derive(Debug, Clone)]
pub struct CartItem {
    pub cart_id: String,
    pub buyer_kakao_id: String,
    pub product_id: String,
    pub option_id: Option<String>,
    pub quantity: i32,
    pub is_selected: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartAddRequest {
    pub product_id: String,
    pub option_id: Option<String>,
    pub quantity: i32,
}

impl Default for CartAddRequest {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            option_id: None,
            quantity: 1,
        }
    }
}

impl Validate for CartAddRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.required(&self.product_id, "productId")
            .check(self.quantity >= 1, "quantity", "must be greater than 0")
            .check(
                self.quantity <= MAX_QUANTITY,
                "quantity",
                &format!("must be at most {MAX_QUANTITY}"),
            );
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub quantity: Option<i32>,
    pub is_selected: Option<bool>,
}

impl Validate for CartUpdateRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        v.check(
            self.quantity.is_none_or(|q| q >= 1),
            "quantity",
            "must be greater than 0",
        )
        .check(
            self.quantity.is_none_or(|q| q <= MAX_QUANTITY),
            "quantity",
            &format!("must be at most {MAX_QUANTITY}"),
        );
        v.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductView {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub main_image: Option<String>,
    pub is_kakao_pay: bool,
    pub shipping_type: ShippingType,
    pub shipping_fee: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: String,
    pub product: CartProductView,
    pub option: Option<ProductOption>,
    pub quantity: i32,
    pub is_selected: bool,
    /// `(sale price or price + option price) * quantity`
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

impl MarketData {
    fn cart_view(&self, item: &CartItem) -> Result<CartView> {
        let product = self.product(&item.product_id).map_err(|_| {
            MarketError::Internal(format!(
                "cart {} references missing product {}",
                item.cart_id, item.product_id
            ))
        })?;
        let option = item
            .option_id
            .as_deref()
            .and_then(|id| product.option(id).ok())
            .cloned();
        let unit_price = product.unit_price(option.as_ref())?;
        let total_price = line_total(unit_price, item.quantity)?;

        Ok(CartView {
            cart_id: item.cart_id.clone(),
            product: CartProductView {
                product_id: product.product_id.clone(),
                name: product.name.clone(),
                price: product.price,
                sale_price: product.sale_price,
                main_image: product.main_image.clone(),
                is_kakao_pay: product.is_kakao_pay,
                shipping_type: product.shipping_type,
                shipping_fee: product.shipping_fee,
            },
            option,
            quantity: item.quantity,
            is_selected: item.is_selected,
            total_price,
            created_at: item.created_at,
        })
    }

    fn owned_cart_item_mut(&mut self, kakao_id: &str, cart_id: &str) -> Result<&mut CartItem> {
        let item = self
            .carts
            .iter_mut()
            .find(|c| c.cart_id == cart_id)
            .ok_or_else(|| MarketError::business("Cart item not found"))?;
        if item.buyer_kakao_id != kakao_id {
            return Err(MarketError::business("Not allowed to change this cart item"));
        }
        Ok(item)
    }
}

impl Marketplace {
    /// Adds a product to the cart. A product already in the cart has its
    /// quantity increased instead.
    #[tracing::instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn add_to_cart(&self, kakao_id: &str, request: CartAddRequest) -> Result<CartView> {
        let mut data = self.data.write().await;
        let product = data.product(&request.product_id)?;
        if let Some(option_id) = &request.option_id {
            product.option(option_id)?;
        }

        let existing = data
            .carts
            .iter()
            .position(|c| c.buyer_kakao_id == kakao_id && c.product_id == request.product_id);
        let index = match existing {
            Some(index) => {
                let item = &mut data.carts[index];
                item.quantity = item
                    .quantity
                    .checked_add(request.quantity)
                    .ok_or_else(|| MarketError::business("Cart quantity is too large"))?;
                index
            }
            None => {
                let cart_id = unique_id(self.prefixes().cart, |id| {
                    data.carts.iter().any(|c| c.cart_id == id)
                });
                data.carts.push(CartItem {
                    cart_id,
                    buyer_kakao_id: kakao_id.to_string(),
                    product_id: request.product_id,
                    option_id: request.option_id,
                    quantity: request.quantity,
                    is_selected: true,
                    created_at: Utc::now(),
                });
                data.carts.len() - 1
            }
        };
        data.cart_view(&data.carts[index])
    }

    pub async fn update_cart_item(
        &self,
        kakao_id: &str,
        cart_id: &str,
        request: CartUpdateRequest,
    ) -> Result<CartView> {
        let mut data = self.data.write().await;
        let item = data.owned_cart_item_mut(kakao_id, cart_id)?;
        if let Some(quantity) = request.quantity {
            item.quantity = quantity;
        }
        if let Some(selected) = request.is_selected {
            item.is_selected = selected;
        }
        let item = item.clone();
        data.cart_view(&item)
    }

    pub async fn cart(&self, kakao_id: &str) -> Result<Vec<CartView>> {
        let data = self.data.read().await;
        data.carts
            .iter()
            .filter(|c| c.buyer_kakao_id == kakao_id)
            .map(|c| data.cart_view(c))
            .collect()
    }

    pub async fn remove_cart_item(&self, kakao_id: &str, cart_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.owned_cart_item_mut(kakao_id, cart_id)?;
        data.carts.retain(|c| c.cart_id != cart_id);
        Ok(())
    }

    pub async fn clear_cart(&self, kakao_id: &str) {
        let mut data = self.data.write().await;
        data.carts.retain(|c| c.buyer_kakao_id != kakao_id);
    }
}
