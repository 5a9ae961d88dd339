//! Request validation collecting per-field messages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MarketError, Result};

static BUSINESS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{5}$").expect("valid business number pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,3}-\d{3,4}-\d{4}$").expect("valid phone pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Implemented by request bodies checked before they reach the marketplace.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Accumulates field violations; the first message per field wins.
#[derive(Debug, Default)]
pub struct Violations(BTreeMap<String, String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.0
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
        self
    }

    pub fn required(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "must not be blank")
    }

    pub fn max_chars(&mut self, value: &str, max: usize, field: &str) -> &mut Self {
        self.check(
            value.chars().count() <= max,
            field,
            &format!("must be at most {max} characters"),
        )
    }

    pub fn business_number(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(
            BUSINESS_NUMBER.is_match(value),
            field,
            "must look like 123-45-67890",
        )
    }

    pub fn phone(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(PHONE.is_match(value), field, "must look like 010-1234-5678")
    }

    pub fn email(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(EMAIL.is_match(value), field, "is malformed")
    }

    pub fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(MarketError::Validation(self.0))
        }
    }
}
