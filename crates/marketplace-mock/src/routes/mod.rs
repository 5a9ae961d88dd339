//! HTTP handlers and the extractors they share.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sellers;
pub mod wishlist;

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::MarketError;
use crate::market::Marketplace;
use crate::market::sellers::Seller;
use crate::validation::Validate;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const KAKAO_ID_HEADER: &str = "x-kakao-id";

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub marketplace: Marketplace,
}

pub type SharedState = Arc<AppState>;

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The seller owning the `X-API-KEY` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedSeller(pub Seller);

impl FromRequestParts<SharedState> for AuthenticatedSeller {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = header(parts, API_KEY_HEADER).ok_or_else(|| {
            MarketError::Unauthorized("X-API-KEY header is required".to_string())
        })?;
        let seller = state.marketplace.authenticate_seller(&api_key).await?;
        Ok(Self(seller))
    }
}

/// The buyer named by the `X-KAKAO-ID` header.
#[derive(Debug, Clone)]
pub struct Buyer(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Buyer {
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(parts, KAKAO_ID_HEADER)
            .map(Self)
            .ok_or_else(|| MarketError::Unauthorized("X-KAKAO-ID header is required".to_string()))
    }
}

/// Like [`Buyer`] but anonymous requests are allowed.
#[derive(Debug, Clone)]
pub struct OptionalBuyer(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalBuyer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(header(parts, KAKAO_ID_HEADER)))
    }
}

/// JSON body that passed [`Validate`]. Malformed JSON is a validation error too.
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = MarketError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string whose parse failures answer in the marketplace error format.
#[derive(Debug, Clone)]
pub struct Params<T>(pub T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
