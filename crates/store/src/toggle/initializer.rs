use std::collections::HashMap;

use super::{BackofficeClient, FeatureToggleManager};

/// Seeds the toggle cache from the backoffice at startup.
pub struct FeatureToggleInitializer {
    client: BackofficeClient,
    manager: FeatureToggleManager,
}

impl FeatureToggleInitializer {
    pub fn new(client: BackofficeClient, manager: FeatureToggleManager) -> Self {
        Self { client, manager }
    }

    /// Loads every toggle into the cache and returns how many were loaded.
    ///
    /// A failure is logged and leaves the cache untouched; later toggle
    /// messages still fill it.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) -> usize {
        match self.client.get_feature_toggles().await {
            Ok(toggles) => {
                let toggles: HashMap<String, bool> =
                    toggles.into_iter().map(|t| (t.name, t.toggle)).collect();
                let count = toggles.len();
                self.manager.update_feature_toggles(toggles).await;
                tracing::info!(count, "feature toggles loaded from backoffice");
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load feature toggles, starting with an empty cache");
                0
            }
        }
    }
}
