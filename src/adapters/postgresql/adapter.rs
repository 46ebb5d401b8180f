//! PostgreSQL adapter implementing the storage traits

use crate::adapters::database::traits::{StateStorage, WorkQueue};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    order_id_from_row, order_id_to_row, PostgreSQLResourceCache,
};
use crate::domain::ids::OrderId;
use crate::domain::resource::{CachedResources, ResourceKind};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL implementation of [`StateStorage`] and [`WorkQueue`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StateStorage for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn load_setting(&self, key: &str) -> Result<Option<String>> {
        let rows = self
            .client
            .query("SELECT value FROM settings WHERE key = $1", &[&key])
            .await?;

        Ok(rows.first().map(|row| row.get("value")))
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key = %key, "Saving setting to PostgreSQL");

        let upsert_query = r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
        "#;

        self.client.execute(upsert_query, &[&key, &value]).await?;
        Ok(())
    }

    async fn load_resources(&self, kind: ResourceKind) -> Result<Option<CachedResources>> {
        let rows = self
            .client
            .query(
                "SELECT kind, resources, fetched_at FROM resource_cache WHERE kind = $1",
                &[&kind.as_str()],
            )
            .await?;

        match rows.first() {
            Some(row) => {
                let pg_cache = PostgreSQLResourceCache {
                    kind: row.get("kind"),
                    resources: row.get("resources"),
                    fetched_at: row.get("fetched_at"),
                };
                pg_cache.to_domain().map(Some)
            }
            None => Ok(None),
        }
    }

    async fn save_resources(&self, cached: &CachedResources) -> Result<()> {
        let pg_cache = PostgreSQLResourceCache::from_domain(cached)?;

        let upsert_query = r#"
            INSERT INTO resource_cache (kind, resources, fetched_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind) DO UPDATE SET
                resources = EXCLUDED.resources,
                fetched_at = EXCLUDED.fetched_at
        "#;

        self.client
            .execute(
                upsert_query,
                &[&pg_cache.kind, &pg_cache.resources, &pg_cache.fetched_at],
            )
            .await?;

        tracing::debug!(
            kind = %cached.kind,
            count = cached.resources.len(),
            "Resource cache saved to PostgreSQL"
        );
        Ok(())
    }
}

#[async_trait]
impl WorkQueue for PostgreSQLAdapter {
    async fn replace(&self, order_ids: &[OrderId]) -> Result<()> {
        let rows = order_ids
            .iter()
            .map(|id| order_id_to_row(*id))
            .collect::<Result<Vec<i64>>>()?;

        self.client.replace_queue(&rows).await?;

        tracing::debug!(count = rows.len(), "Work queue replaced in PostgreSQL");
        Ok(())
    }

    async fn add(&self, order_id: OrderId) -> Result<bool> {
        let inserted = self
            .client
            .execute(
                "INSERT INTO unsynced_orders (order_id) VALUES ($1) ON CONFLICT (order_id) DO NOTHING",
                &[&order_id_to_row(order_id)?],
            )
            .await?;
        Ok(inserted > 0)
    }

    async fn remove(&self, order_id: OrderId) -> Result<bool> {
        let deleted = self
            .client
            .execute(
                "DELETE FROM unsynced_orders WHERE order_id = $1",
                &[&order_id_to_row(order_id)?],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn list(&self) -> Result<Vec<OrderId>> {
        let rows = self
            .client
            .query("SELECT order_id FROM unsynced_orders ORDER BY order_id", &[])
            .await?;

        rows.iter()
            .map(|row| order_id_from_row(row.get("order_id")))
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        let rows = self
            .client
            .query("SELECT COUNT(*) AS total FROM unsynced_orders", &[])
            .await?;

        let total: i64 = rows.first().map(|row| row.get("total")).unwrap_or(0);
        Ok(u64::try_from(total).unwrap_or(0))
    }
}
