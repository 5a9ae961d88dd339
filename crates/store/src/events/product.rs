use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Product catalogue owned by other services.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Removes every product of a cancelled store.
    async fn clear_products(&self, store_id: i64) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryProductState {
    cleared: Vec<i64>,
    fail_on_clear: bool,
}

/// Records which stores had their products cleared.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductService {
    state: Arc<RwLock<InMemoryProductState>>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on the next clears.
    pub async fn set_fail_on_clear(&self, fail: bool) {
        self.state.write().await.fail_on_clear = fail;
    }

    pub async fn cleared_stores(&self) -> Vec<i64> {
        self.state.read().await.cleared.clone()
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    async fn clear_products(&self, store_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_clear {
            return Err(StoreError::ProductService(
                "product service unavailable".to_string(),
            ));
        }
        tracing::info!(store_id, "products cleared");
        state.cleared.push(store_id);
        Ok(())
    }
}
