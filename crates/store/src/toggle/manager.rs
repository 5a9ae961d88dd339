use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// In-process cache of feature toggles.
///
/// Writes are last-write-wins per name. Unknown toggles read as disabled.
#[derive(Debug, Clone, Default)]
pub struct FeatureToggleManager {
    toggles: Arc<RwLock<HashMap<String, bool>>>,
}

impl FeatureToggleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update_feature_toggle(&self, name: impl Into<String>, toggle: bool) {
        self.toggles.write().await.insert(name.into(), toggle);
    }

    /// Merges `toggles` into the cache, overwriting existing names.
    pub async fn update_feature_toggles(&self, toggles: HashMap<String, bool>) {
        self.toggles.write().await.extend(toggles);
    }

    pub async fn get_all_features(&self) -> HashMap<String, bool> {
        self.toggles.read().await.clone()
    }

    pub async fn get_feature(&self, name: &str) -> bool {
        self.toggles.read().await.get(name).copied().unwrap_or(false)
    }

    pub async fn clear(&self) {
        self.toggles.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_toggle_is_disabled() {
        let manager = FeatureToggleManager::new();
        assert!(!manager.get_feature("anything").await);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let manager = FeatureToggleManager::new();
        manager.update_feature_toggle("checkout", true).await;
        manager.update_feature_toggle("checkout", false).await;
        assert!(!manager.get_feature("checkout").await);
    }

    #[tokio::test]
    async fn bulk_update_merges() {
        let manager = FeatureToggleManager::new();
        manager.update_feature_toggle("a", true).await;
        manager
            .update_feature_toggles(HashMap::from([
                ("a".to_string(), false),
                ("b".to_string(), true),
            ]))
            .await;

        let all = manager.get_all_features().await;
        assert_eq!(all.len(), 2);
        assert!(!all["a"]);
        assert!(all["b"]);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let manager = FeatureToggleManager::new();
        manager.update_feature_toggle("a", true).await;
        manager.clear().await;
        assert!(manager.get_all_features().await.is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let manager = FeatureToggleManager::new();
        let other = manager.clone();
        other.update_feature_toggle("a", true).await;
        assert!(manager.get_feature("a").await);
    }
}
