use async_trait::async_trait;
use messaging::{HandlerError, Message, MessageHandler};
use serde::{Deserialize, Serialize};

use super::FeatureToggleManager;

/// Consumer group the store service reads toggle changes with.
pub const FEATURE_TOGGLE_GROUP_ID: &str = "StoreApplicationFeatureToggleUpdater";

/// A toggle change published by the backoffice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggleChange {
    pub name: String,
    pub toggle: bool,
}

/// Applies toggle change messages to the local cache.
pub struct FeatureToggleUpdater {
    manager: FeatureToggleManager,
}

impl FeatureToggleUpdater {
    pub fn new(manager: FeatureToggleManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl MessageHandler for FeatureToggleUpdater {
    async fn handle(&self, message: &Message) -> Result<(), HandlerError> {
        let change: FeatureToggleChange = message.decode()?;
        if change.name.trim().is_empty() {
            return Err(HandlerError::new("feature toggle change without a name"));
        }

        tracing::info!(
            name = %change.name,
            toggle = change.toggle,
            key = ?message.key,
            "feature toggle updated"
        );
        self.manager
            .update_feature_toggle(change.name, change.toggle)
            .await;
        metrics::counter!("feature_toggle_updates_total").increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(payload: &[u8]) -> Message {
        Message::new(
            "event.backoffice.feature-toggle",
            Some("FEATURE_TOGGLE::1".to_string()),
            payload.to_vec(),
        )
    }

    #[tokio::test]
    async fn applies_change() {
        let manager = FeatureToggleManager::new();
        let updater = FeatureToggleUpdater::new(manager.clone());

        updater
            .handle(&message(br#"{"name":"checkout","toggle":true}"#))
            .await
            .unwrap();

        assert!(manager.get_feature("checkout").await);
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let manager = FeatureToggleManager::new();
        let updater = FeatureToggleUpdater::new(manager.clone());

        assert!(updater.handle(&message(b"not json")).await.is_err());
        assert!(manager.get_all_features().await.is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_an_error() {
        let updater = FeatureToggleUpdater::new(FeatureToggleManager::new());
        assert!(
            updater
                .handle(&message(br#"{"name":" ","toggle":true}"#))
                .await
                .is_err()
        );
    }
}
