use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StoreRepository;
use crate::domain::{Cancellation, NewStore, Store, StoreHistory, StoreIntegration};
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
struct InMemoryStoreState {
    stores: Vec<Store>,
    next_store_id: i64,
    next_integration_id: i64,
    next_history_id: i64,
    fail_on_save: bool,
}

/// In-memory store repository for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoreRepository {
    state: Arc<RwLock<InMemoryStoreState>>,
}

impl InMemoryStoreRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail on the next saves.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Number of stores, cancelled ones included.
    pub async fn store_count(&self) -> usize {
        self.state.read().await.stores.len()
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn save(&self, store: NewStore) -> Result<Store> {
        let mut state = self.state.write().await;

        if state.fail_on_save {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        state.next_store_id += 1;
        state.next_integration_id += 1;
        state.next_history_id += 1;

        let saved = Store {
            id: state.next_store_id,
            name: store.name,
            description: store.description,
            user_id: store.user_id,
            email: store.email,
            phone: store.phone,
            status: store.status,
            registered_at: store.registered_at,
            confirmed_at: store.confirmed_at,
            updated_at: store.registered_at,
            deleted_at: None,
            registered_by: store.registered_by,
            deleted_by: None,
            integrations: vec![StoreIntegration {
                id: state.next_integration_id,
                platform: store.integration.platform,
                platform_id: store.integration.platform_id,
            }],
            histories: vec![StoreHistory {
                id: state.next_history_id,
                history: store.history,
                created_at: store.registered_at,
            }],
        };
        state.stores.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Store>> {
        let state = self.state.read().await;
        Ok(state.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Store>> {
        let state = self.state.read().await;
        Ok(state
            .stores
            .iter()
            .filter(|s| s.user_id == user_id && !s.is_deleted())
            .cloned()
            .collect())
    }

    async fn cancel(&self, id: i64, cancellation: &Cancellation) -> Result<Option<Store>> {
        let mut state = self.state.write().await;
        state.next_history_id += 1;
        let history_id = state.next_history_id;

        Ok(state
            .stores
            .iter_mut()
            .find(|s| s.id == id && !s.is_deleted())
            .map(|store| {
                store.apply_cancellation(cancellation, history_id);
                store.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntegrationPlatform, StoreRegistrationInfo};

    fn new_store(user_id: i64) -> NewStore {
        NewStore::register(
            "Shop",
            Some("desc".to_string()),
            user_id,
            "a@b.com",
            "010-1234-5678",
            &StoreRegistrationInfo {
                platform_id: "SELLER_1".to_string(),
                status: "PENDING".to_string(),
                platform: IntegrationPlatform::Naver,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_assigns_ids_to_store_and_children() {
        let repo = InMemoryStoreRepository::new();

        let store = repo.save(new_store(1)).await.unwrap();

        assert_eq!(store.id, 1);
        assert_eq!(store.integrations.len(), 1);
        assert_eq!(store.integrations[0].platform_id, "SELLER_1");
        assert_eq!(store.histories.len(), 1);
        assert_eq!(repo.find_by_id(1).await.unwrap(), Some(store));
    }

    #[tokio::test]
    async fn find_by_user_skips_other_users_and_cancelled() {
        let repo = InMemoryStoreRepository::new();
        let a = repo.save(new_store(1)).await.unwrap();
        let b = repo.save(new_store(1)).await.unwrap();
        repo.save(new_store(2)).await.unwrap();

        repo.cancel(a.id, &a.cancel(1).unwrap()).await.unwrap();

        let stores = repo.find_by_user(1).await.unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].id, b.id);
    }

    #[tokio::test]
    async fn cancel_records_history_once() {
        let repo = InMemoryStoreRepository::new();
        let store = repo.save(new_store(1)).await.unwrap();
        let cancellation = store.cancel(1).unwrap();

        let cancelled = repo.cancel(store.id, &cancellation).await.unwrap().unwrap();
        assert!(cancelled.is_deleted());
        assert_eq!(cancelled.histories.len(), 2);

        assert!(repo.cancel(store.id, &cancellation).await.unwrap().is_none());
        let reloaded = repo.find_by_id(store.id).await.unwrap().unwrap();
        assert_eq!(reloaded.histories.len(), 2);
    }

    #[tokio::test]
    async fn fail_on_save_returns_database_error() {
        let repo = InMemoryStoreRepository::new();
        repo.set_fail_on_save(true).await;
        assert!(matches!(
            repo.save(new_store(1)).await,
            Err(StoreError::Database(_))
        ));
        assert_eq!(repo.store_count().await, 0);
    }
}
