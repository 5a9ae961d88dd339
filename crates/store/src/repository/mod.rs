//! Store persistence.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStoreRepository;
pub use postgres::PostgresStoreRepository;

use async_trait::async_trait;

use crate::domain::{Cancellation, NewStore, Store};
use crate::error::Result;

/// Storage for stores together with their integrations and history.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Persists the store, its integration and its first history line in
    /// one unit.
    async fn save(&self, store: NewStore) -> Result<Store>;

    /// Loads a store by id, cancelled ones included.
    async fn find_by_id(&self, id: i64) -> Result<Option<Store>>;

    /// Active stores of a user, oldest first.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Store>>;

    /// Soft-deletes the store and records the cancellation history.
    ///
    /// Returns `None` if there is no active store with this id.
    async fn cancel(&self, id: i64, cancellation: &Cancellation) -> Result<Option<Store>>;
}
