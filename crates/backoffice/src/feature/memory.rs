use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{FeatureToggle, FeatureToggleRepository};
use crate::error::{BackofficeError, Result};

#[derive(Debug, Default)]
struct InMemoryToggleState {
    rows: Vec<FeatureToggle>,
    next_id: i64,
    fail_on_save: bool,
}

/// In-memory feature toggle storage for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatureToggleRepository {
    state: Arc<RwLock<InMemoryToggleState>>,
}

impl InMemoryFeatureToggleRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail on the next saves.
    pub async fn set_fail_on_save(&self, fail: bool) {
        self.state.write().await.fail_on_save = fail;
    }

    /// Number of rows, soft-deleted ones included.
    pub async fn row_count(&self) -> usize {
        self.state.read().await.rows.len()
    }
}

#[async_trait]
impl FeatureToggleRepository for InMemoryFeatureToggleRepository {
    async fn save(&self, name: &str, toggle: bool) -> Result<FeatureToggle> {
        let mut state = self.state.write().await;

        if state.fail_on_save {
            return Err(BackofficeError::Database(sqlx::Error::PoolClosed));
        }

        let now = Utc::now();
        if let Some(row) = state.rows.iter_mut().find(|row| row.name == name) {
            row.toggle = toggle;
            row.updated_at = now;
            row.deleted_at = None;
            return Ok(row.clone());
        }

        state.next_id += 1;
        let row = FeatureToggle {
            id: state.next_id,
            name: name.to_string(),
            toggle,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<FeatureToggle>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .filter(|row| !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<FeatureToggle>> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .find(|row| row.name == name && !row.is_deleted())
            .cloned())
    }

    async fn delete(&self, name: &str) -> Result<Option<FeatureToggle>> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        Ok(state
            .rows
            .iter_mut()
            .find(|row| row.name == name && !row.is_deleted())
            .map(|row| {
                row.deleted_at = Some(now);
                row.updated_at = now;
                row.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let repo = InMemoryFeatureToggleRepository::new();
        let a = repo.save("a", true).await.unwrap();
        let b = repo.save("b", false).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn save_existing_name_updates_in_place() {
        let repo = InMemoryFeatureToggleRepository::new();
        let first = repo.save("checkout", false).await.unwrap();
        let second = repo.save("checkout", true).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.toggle);
        assert_eq!(repo.row_count().await, 1);
    }

    #[tokio::test]
    async fn deleted_toggle_is_hidden_and_revived_on_save() {
        let repo = InMemoryFeatureToggleRepository::new();
        let saved = repo.save("checkout", true).await.unwrap();

        let deleted = repo.delete("checkout").await.unwrap().unwrap();
        assert_eq!(deleted.id, saved.id);
        assert!(repo.find_by_name("checkout").await.unwrap().is_none());
        assert!(repo.find_all().await.unwrap().is_empty());
        assert!(repo.delete("checkout").await.unwrap().is_none());

        let revived = repo.save("checkout", false).await.unwrap();
        assert_eq!(revived.id, saved.id);
        assert!(!revived.is_deleted());
    }

    #[tokio::test]
    async fn fail_on_save_returns_database_error() {
        let repo = InMemoryFeatureToggleRepository::new();
        repo.set_fail_on_save(true).await;
        assert!(matches!(
            repo.save("a", true).await,
            Err(BackofficeError::Database(_))
        ));
    }
}
