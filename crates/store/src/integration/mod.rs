//! Seller registration on external marketplaces.

pub mod client;
pub mod factory;
pub mod kakao;
pub mod naver;

pub use client::{MarketplaceClient, RegisterSellerBody, SellerRegistration};
pub use factory::{RegisterStore, StoreIntegrationFactory};
pub use kakao::KakaoAdaptor;
pub use naver::NaverAdaptor;
