//! Persistence-facing store operations.

use crate::domain::{NewStore, Store, StoreRegistrationInfo};
use crate::error::{Result, StoreError};
use crate::repository::StoreRepository;

/// Builds stores from marketplace registrations and persists them.
pub struct StoreService<R: StoreRepository> {
    repository: R,
}

/// Owner-supplied details of a store.
#[derive(Debug, Clone)]
pub struct StoreDetails {
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub email: String,
    pub phone: String,
}

impl<R: StoreRepository> StoreService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[tracing::instrument(skip(self, details), fields(user_id = details.user_id))]
    pub async fn register_store(
        &self,
        details: StoreDetails,
        registration: &StoreRegistrationInfo,
    ) -> Result<Store> {
        let store = NewStore::register(
            details.name,
            details.description,
            details.user_id,
            details.email,
            details.phone,
            registration,
        )?;
        self.repository.save(store).await
    }

    pub async fn get_store(&self, id: i64) -> Result<Store> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn get_user_stores(&self, user_id: i64) -> Result<Vec<Store>> {
        self.repository.find_by_user(user_id).await
    }

    /// Soft-deletes a store on behalf of its owner.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_store(&self, id: i64, user_id: i64) -> Result<Store> {
        let store = self.get_store(id).await?;
        if !store.is_owned_by(user_id) {
            return Err(StoreError::NotOwner {
                store_id: id,
                user_id,
            });
        }

        let cancellation = store.cancel(user_id)?;
        self.repository
            .cancel(id, &cancellation)
            .await?
            .ok_or(StoreError::AlreadyCancelled(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntegrationPlatform, StoreStatus};
    use crate::repository::InMemoryStoreRepository;

    fn details(user_id: i64) -> StoreDetails {
        StoreDetails {
            name: "Shop".to_string(),
            description: None,
            user_id,
            email: "kim@shop.com".to_string(),
            phone: "010-1234-5678".to_string(),
        }
    }

    fn registration(status: &str) -> StoreRegistrationInfo {
        StoreRegistrationInfo {
            platform_id: "SELLER_1".to_string(),
            status: status.to_string(),
            platform: IntegrationPlatform::Naver,
        }
    }

    #[tokio::test]
    async fn register_persists_store() {
        let service = StoreService::new(InMemoryStoreRepository::new());

        let store = service
            .register_store(details(7), &registration("APPROVED"))
            .await
            .unwrap();

        assert_eq!(store.status, StoreStatus::Confirm);
        assert_eq!(service.get_store(store.id).await.unwrap(), store);
        assert_eq!(service.get_user_stores(7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_with_unknown_status_persists_nothing() {
        let repository = InMemoryStoreRepository::new();
        let service = StoreService::new(repository.clone());

        let result = service
            .register_store(details(7), &registration("WHATEVER"))
            .await;

        assert!(matches!(result, Err(StoreError::UnknownPlatformStatus { .. })));
        assert_eq!(repository.store_count().await, 0);
    }

    #[tokio::test]
    async fn only_owner_can_cancel() {
        let service = StoreService::new(InMemoryStoreRepository::new());
        let store = service
            .register_store(details(7), &registration("PENDING"))
            .await
            .unwrap();

        assert!(matches!(
            service.cancel_store(store.id, 8).await,
            Err(StoreError::NotOwner { .. })
        ));

        let cancelled = service.cancel_store(store.id, 7).await.unwrap();
        assert_eq!(cancelled.deleted_by, Some(7));
        assert!(matches!(
            service.cancel_store(store.id, 7).await,
            Err(StoreError::AlreadyCancelled(_))
        ));
    }

    #[tokio::test]
    async fn missing_store_is_not_found() {
        let service = StoreService::new(InMemoryStoreRepository::new());
        assert!(matches!(
            service.get_store(42).await,
            Err(StoreError::NotFound(42))
        ));
    }
}
