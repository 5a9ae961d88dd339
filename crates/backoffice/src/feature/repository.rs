use async_trait::async_trait;

use super::FeatureToggle;
use crate::error::Result;

/// Storage for feature toggles. Deletes are soft.
#[async_trait]
pub trait FeatureToggleRepository: Send + Sync {
    /// Inserts or updates the toggle called `name`.
    ///
    /// A soft-deleted toggle with the same name is revived.
    async fn save(&self, name: &str, toggle: bool) -> Result<FeatureToggle>;

    /// All active toggles ordered by id.
    async fn find_all(&self) -> Result<Vec<FeatureToggle>>;

    /// The active toggle called `name`.
    async fn find_by_name(&self, name: &str) -> Result<Option<FeatureToggle>>;

    /// Soft-deletes the toggle. Returns the deleted row, or None if there was
    /// no active toggle with this name.
    async fn delete(&self, name: &str) -> Result<Option<FeatureToggle>>;
}
