//! State storage factory
//!
//! Builds the configured backend once and hands it out as both trait objects,
//! so settings, resource cache and work queue share one connection pool.

use crate::adapters::database::traits::{StateStorage, WorkQueue};
use crate::adapters::memory::MemoryStorage;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, KitSyncConfig};
use crate::domain::{KitSyncError, Result};
use std::sync::Arc;

/// Create the state storage and work queue for the configured target
///
/// # Errors
///
/// Returns an error if the PostgreSQL section is missing or the pool cannot be
/// created
pub async fn create_storage(
    config: &KitSyncConfig,
) -> Result<(Arc<dyn StateStorage>, Arc<dyn WorkQueue>)> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                KitSyncError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL state storage");
            let client = Arc::new(PostgreSQLClient::new(pg_config.clone()).await?);
            let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

            Ok((
                adapter.clone() as Arc<dyn StateStorage>,
                adapter as Arc<dyn WorkQueue>,
            ))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory state storage; the work queue is lost on exit");
            let storage = Arc::new(MemoryStorage::new());

            Ok((
                storage.clone() as Arc<dyn StateStorage>,
                storage as Arc<dyn WorkQueue>,
            ))
        }
    }
}
