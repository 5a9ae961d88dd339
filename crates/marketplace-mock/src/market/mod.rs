//! In-memory marketplace: sellers, catalogue, carts, orders and reviews.
//!
//! Every operation takes the lock once and works on [`MarketData`], so a
//! request never observes a half-applied change.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{MarketError, Result};
use crate::platform::{IdPrefixes, Platform};

/// Declares a closed set of upper-case wire values.
///
/// Parsing an unknown value is a business error, matching how the
/// marketplaces answer unknown statuses.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::MarketError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err($crate::error::MarketError::Business(format!(
                        "Invalid {}: {}",
                        $label, other
                    ))),
                }
            }
        }
    };
}

pub mod cart;
pub mod categories;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sellers;
pub mod wishlist;

use cart::CartItem;
use categories::Category;
use notifications::Notification;
use orders::Order;
use products::Product;
use reviews::Review;
use sellers::Seller;
use wishlist::WishlistEntry;

/// Everything one marketplace holds. Collections keep insertion order,
/// which is also creation order.
#[derive(Debug, Default)]
pub struct MarketData {
    pub(crate) sellers: Vec<Seller>,
    pub(crate) categories: Vec<Category>,
    pub(crate) products: Vec<Product>,
    pub(crate) carts: Vec<CartItem>,
    pub(crate) wishlist: Vec<WishlistEntry>,
    pub(crate) orders: Vec<Order>,
    pub(crate) reviews: Vec<Review>,
    pub(crate) notifications: Vec<Notification>,
}

/// Handle to one marketplace's state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Marketplace {
    platform: Platform,
    data: Arc<RwLock<MarketData>>,
}

impl Marketplace {
    /// Creates a marketplace seeded with the default category tree.
    pub fn new(platform: Platform) -> Self {
        let data = MarketData {
            categories: categories::seed(),
            ..MarketData::default()
        };
        Self {
            platform,
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn prefixes(&self) -> IdPrefixes {
        self.platform.prefixes()
    }

    /// Number of sellers registered so far.
    pub async fn seller_count(&self) -> usize {
        self.data.read().await.sellers.len()
    }

    /// Number of products currently listed.
    pub async fn product_count(&self) -> usize {
        self.data.read().await.products.len()
    }
}

impl MarketData {
    pub(crate) fn product(&self, product_id: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.product_id == product_id)
            .ok_or_else(|| MarketError::business("Product not found"))
    }

    pub(crate) fn product_mut(&mut self, product_id: &str) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.product_id == product_id)
            .ok_or_else(|| MarketError::business("Product not found"))
    }

    pub(crate) fn order(&self, order_id: &str) -> Result<&Order> {
        self.orders
            .iter()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| MarketError::business("Order not found"))
    }
}

/// Generates an id with `prefix` that `taken` does not already know.
pub(crate) fn unique_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = common::generate_id(prefix);
        if !taken(&id) {
            return id;
        }
    }
}
