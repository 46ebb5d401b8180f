//! State storage abstraction traits
//!
//! kitsync keeps three kinds of local state: key/value settings (refreshed
//! OAuth tokens), the cached Kit resource lists, and the unsynced-order work
//! queue. Backends implement both traits; see the factory for selection.

use crate::domain::ids::OrderId;
use crate::domain::resource::{CachedResources, ResourceKind};
use crate::domain::Result;
use async_trait::async_trait;

/// Settings key holding the current Kit access token
pub const SETTING_ACCESS_TOKEN: &str = "kit_access_token";

/// Settings key holding the current Kit refresh token
pub const SETTING_REFRESH_TOKEN: &str = "kit_refresh_token";

/// Settings and resource cache persistence
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Test the backend connection
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Load a setting
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key was never saved.
    async fn load_setting(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a setting
    async fn save_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Load the cached resource list of one kind
    async fn load_resources(&self, kind: ResourceKind) -> Result<Option<CachedResources>>;

    /// Insert or overwrite the cached resource list of `cached.kind`
    async fn save_resources(&self, cached: &CachedResources) -> Result<()>;
}

/// Row-level unsynced-order work queue
///
/// Each order id is one row, so concurrent runs never lose each other's
/// removals. The queue is only a hint; the order's sent-marker decides whether
/// purchase data was really sent.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Replace the whole queue with `order_ids`, dropping duplicates
    async fn replace(&self, order_ids: &[OrderId]) -> Result<()>;

    /// Add one order
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was not queued yet.
    async fn add(&self, order_id: OrderId) -> Result<bool>;

    /// Remove one order
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was queued.
    async fn remove(&self, order_id: OrderId) -> Result<bool>;

    /// All queued orders in ascending id order
    async fn list(&self) -> Result<Vec<OrderId>>;

    /// Number of queued orders
    async fn count(&self) -> Result<u64>;
}
