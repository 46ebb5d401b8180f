//! PostgreSQL row models
//!
//! Conversions between table rows and domain types. Order ids are stored as
//! BIGINT, so they cross the boundary as `i64`.

use crate::domain::ids::OrderId;
use crate::domain::resource::{CachedResources, Resource, ResourceKind};
use crate::domain::{KitSyncError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Row of the `resource_cache` table
#[derive(Debug, Clone)]
pub struct PostgreSQLResourceCache {
    pub kind: String,
    pub resources: Value,
    pub fetched_at: DateTime<Utc>,
}

impl PostgreSQLResourceCache {
    pub fn from_domain(cached: &CachedResources) -> Result<Self> {
        Ok(Self {
            kind: cached.kind.as_str().to_string(),
            resources: serde_json::to_value(&cached.resources)?,
            fetched_at: cached.fetched_at,
        })
    }

    pub fn to_domain(self) -> Result<CachedResources> {
        let kind: ResourceKind = self.kind.parse().map_err(|e: String| {
            KitSyncError::Database(format!("Corrupt resource cache row: {e}"))
        })?;
        let resources: Vec<Resource> = serde_json::from_value(self.resources)?;

        Ok(CachedResources {
            kind,
            resources,
            fetched_at: self.fetched_at,
        })
    }
}

/// Converts an order id into its BIGINT column value
pub fn order_id_to_row(order_id: OrderId) -> Result<i64> {
    i64::try_from(order_id.value())
        .map_err(|_| KitSyncError::Database(format!("Order ID {order_id} does not fit in BIGINT")))
}

/// Converts a BIGINT column value into an order id
pub fn order_id_from_row(value: i64) -> Result<OrderId> {
    u64::try_from(value)
        .map_err(|_| format!("negative order id {value}"))
        .and_then(OrderId::new)
        .map_err(|e| KitSyncError::Database(format!("Corrupt work queue row: {e}")))
}
