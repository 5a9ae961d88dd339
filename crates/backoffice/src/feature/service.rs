//! Feature toggle registration and propagation.

use std::sync::Arc;

use messaging::{Message, MessageBus};

use super::{FeatureToggle, FeatureToggleMessage, FeatureToggleRepository, MAX_NAME_LENGTH, message_key};
use crate::error::{BackofficeError, Result};

/// Default topic toggle changes are published to.
pub const FEATURE_TOGGLE_TOPIC: &str = "event.backoffice.feature-toggle";

/// Stores feature toggles and publishes every change.
pub struct FeatureToggleService<R: FeatureToggleRepository> {
    repository: R,
    bus: Arc<dyn MessageBus>,
    topic: String,
}

impl<R: FeatureToggleRepository> FeatureToggleService<R> {
    pub fn new(repository: R, bus: Arc<dyn MessageBus>, topic: impl Into<String>) -> Self {
        Self {
            repository,
            bus,
            topic: topic.into(),
        }
    }

    /// Saves the toggle, then publishes it.
    ///
    /// The save is an upsert, so a caller seeing a publish error can simply
    /// register again.
    #[tracing::instrument(skip(self))]
    pub async fn register_feature(&self, name: &str, toggle: bool) -> Result<FeatureToggle> {
        let name = validate_name(name)?;
        let feature = self.repository.save(name, toggle).await?;
        self.publish(&feature, feature.toggle).await?;

        metrics::counter!("feature_toggles_registered_total").increment(1);
        tracing::info!(id = feature.id, name = %feature.name, toggle, "feature toggle registered");
        Ok(feature)
    }

    /// Soft-deletes the toggle and publishes it as disabled.
    #[tracing::instrument(skip(self))]
    pub async fn delete_feature(&self, name: &str) -> Result<FeatureToggle> {
        let feature = self
            .repository
            .delete(name)
            .await?
            .ok_or_else(|| BackofficeError::NotFound(name.to_string()))?;
        self.publish(&feature, false).await?;

        tracing::info!(id = feature.id, name = %feature.name, "feature toggle deleted");
        Ok(feature)
    }

    pub async fn get_all_features(&self) -> Result<Vec<FeatureToggle>> {
        self.repository.find_all().await
    }

    pub async fn get_feature(&self, name: &str) -> Result<FeatureToggle> {
        self.repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| BackofficeError::NotFound(name.to_string()))
    }

    async fn publish(&self, feature: &FeatureToggle, toggle: bool) -> Result<()> {
        let payload = FeatureToggleMessage {
            name: feature.name.clone(),
            toggle,
        };
        let message = Message::json(self.topic.as_str(), Some(message_key(feature.id)), &payload)?;
        self.bus.publish(message).await?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BackofficeError::InvalidName("name must not be blank".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(BackofficeError::InvalidName(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use messaging::InMemoryMessageBus;

    use super::*;
    use crate::feature::InMemoryFeatureToggleRepository;

    fn service(
        bus: &InMemoryMessageBus,
    ) -> (
        FeatureToggleService<InMemoryFeatureToggleRepository>,
        InMemoryFeatureToggleRepository,
    ) {
        let repo = InMemoryFeatureToggleRepository::new();
        let service = FeatureToggleService::new(repo.clone(), Arc::new(bus.clone()), FEATURE_TOGGLE_TOPIC);
        (service, repo)
    }

    #[tokio::test]
    async fn register_saves_then_publishes() {
        let bus = InMemoryMessageBus::recording();
        let (service, repo) = service(&bus);

        let feature = service.register_feature("new-checkout", true).await.unwrap();

        assert_eq!(repo.row_count().await, 1);
        let published = bus.published(FEATURE_TOGGLE_TOPIC).await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].key, Some(format!("FEATURE_TOGGLE::{}", feature.id)));
        let payload: FeatureToggleMessage = published[0].decode().unwrap();
        assert_eq!(payload.name, "new-checkout");
        assert!(payload.toggle);
    }

    #[tokio::test]
    async fn register_trims_name() {
        let bus = InMemoryMessageBus::recording();
        let (service, _) = service(&bus);

        let feature = service.register_feature("  beta  ", false).await.unwrap();
        assert_eq!(feature.name, "beta");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_side_effects() {
        let bus = InMemoryMessageBus::recording();
        let (service, repo) = service(&bus);

        let result = service.register_feature("   ", true).await;
        assert!(matches!(result, Err(BackofficeError::InvalidName(_))));
        assert_eq!(repo.row_count().await, 0);
        assert_eq!(bus.published_count().await, 0);
    }

    #[tokio::test]
    async fn overlong_name_is_rejected() {
        let bus = InMemoryMessageBus::recording();
        let (service, _) = service(&bus);

        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            service.register_feature(&name, true).await,
            Err(BackofficeError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn publish_failure_keeps_saved_toggle() {
        let bus = InMemoryMessageBus::recording();
        bus.set_fail_on_publish(true).await;
        let (service, repo) = service(&bus);

        let result = service.register_feature("checkout", true).await;
        assert!(matches!(result, Err(BackofficeError::Publish(_))));
        assert!(repo.find_by_name("checkout").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_failure_publishes_nothing() {
        let bus = InMemoryMessageBus::recording();
        let (service, repo) = service(&bus);
        repo.set_fail_on_save(true).await;

        assert!(service.register_feature("checkout", true).await.is_err());
        assert_eq!(bus.published_count().await, 0);
    }

    #[tokio::test]
    async fn delete_publishes_disabled_toggle() {
        let bus = InMemoryMessageBus::recording();
        let (service, _) = service(&bus);
        service.register_feature("checkout", true).await.unwrap();

        service.delete_feature("checkout").await.unwrap();

        let published = bus.published(FEATURE_TOGGLE_TOPIC).await;
        assert_eq!(published.len(), 2);
        let payload: FeatureToggleMessage = published[1].decode().unwrap();
        assert!(!payload.toggle);
        assert!(matches!(
            service.get_feature("checkout").await,
            Err(BackofficeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_unknown_toggle_is_not_found() {
        let bus = InMemoryMessageBus::recording();
        let (service, _) = service(&bus);
        assert!(matches!(
            service.delete_feature("ghost").await,
            Err(BackofficeError::NotFound(_))
        ));
    }
}
