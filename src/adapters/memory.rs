//! In-memory state storage
//!
//! Backs `database_target = "memory"` and the test suites. Everything is lost
//! when the process exits.

use crate::adapters::database::traits::{StateStorage, WorkQueue};
use crate::domain::ids::OrderId;
use crate::domain::resource::{CachedResources, ResourceKind};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    settings: HashMap<String, String>,
    resources: HashMap<ResourceKind, CachedResources>,
    queue: BTreeSet<OrderId>,
}

/// Process-local implementation of [`StateStorage`] and [`WorkQueue`]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage with a pre-filled work queue
    pub fn with_queue(order_ids: impl IntoIterator<Item = OrderId>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                queue: order_ids.into_iter().collect(),
                ..MemoryState::default()
            }),
        }
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn load_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.lock().await.settings.get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        self.state
            .lock()
            .await
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn load_resources(&self, kind: ResourceKind) -> Result<Option<CachedResources>> {
        Ok(self.state.lock().await.resources.get(&kind).cloned())
    }

    async fn save_resources(&self, cached: &CachedResources) -> Result<()> {
        self.state
            .lock()
            .await
            .resources
            .insert(cached.kind, cached.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkQueue for MemoryStorage {
    async fn replace(&self, order_ids: &[OrderId]) -> Result<()> {
        self.state.lock().await.queue = order_ids.iter().copied().collect();
        Ok(())
    }

    async fn add(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.state.lock().await.queue.insert(order_id))
    }

    async fn remove(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.state.lock().await.queue.remove(&order_id))
    }

    async fn list(&self) -> Result<Vec<OrderId>> {
        Ok(self.state.lock().await.queue.iter().copied().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.lock().await.queue.len() as u64)
    }
}
