//! Sync coordinator - entry point for every sync operation
//!
//! Owns the store, Kit and storage handles and wires them into the batches,
//! the sequential driver and the event handler.

use crate::adapters::database::create_storage;
use crate::adapters::database::traits::{StateStorage, WorkQueue, SETTING_ACCESS_TOKEN};
use crate::adapters::kit::{Credential, KitApi, KitClient};
use crate::adapters::memory::MemoryStorage;
use crate::adapters::woocommerce::store::MAX_PAGE_SIZE;
use crate::adapters::woocommerce::{OrderStore, WooCommerceClient};
use crate::config::schema::{ErrorPolicy, KitSyncConfig};
use crate::core::batch::{BatchRunner, OrderSyncBatch, RunSummary, UnsyncedOrderFinder};
use crate::core::driver::{DriverSummary, ProgressReporter, SyncDriver};
use crate::core::purchase::{OrderSender, PurchaseSender, SendOutcome};
use crate::core::resources::ResourceCache;
use crate::core::subscription::{EventReport, OrderEventHandler};
use crate::domain::ids::OrderId;
use crate::domain::resource::{CachedResources, ResourceKind};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Handles to the external systems
#[derive(Clone)]
pub struct SyncServices {
    pub store: Arc<dyn OrderStore>,
    pub kit: Arc<dyn KitApi>,
    pub storage: Arc<dyn StateStorage>,
    pub queue: Arc<dyn WorkQueue>,
}

/// Outcome of `sync-purchases`
#[derive(Debug, Clone)]
pub struct PurchaseSyncReport {
    /// Absent when discovery was skipped
    pub discovery: Option<RunSummary>,
    pub sync: RunSummary,
}

impl PurchaseSyncReport {
    /// The queue was empty when the sync batch started
    pub fn nothing_to_send(&self) -> bool {
        self.sync.total == 0 && !self.interrupted()
    }

    pub fn interrupted(&self) -> bool {
        self.sync.interrupted || self.discovery.as_ref().is_some_and(|d| d.interrupted)
    }
}

/// Age and size of one cached resource list
#[derive(Debug, Clone)]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub count: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Snapshot for the `status` command
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub queued_orders: u64,
    pub resources: Vec<ResourceStatus>,
    /// Tokens from a previous refresh are stored
    pub stored_tokens: bool,
}

pub struct SyncCoordinator {
    config: KitSyncConfig,
    services: SyncServices,
    shutdown: watch::Receiver<bool>,
}

impl SyncCoordinator {
    /// Connects to storage, Kit and the store described by `config`
    ///
    /// OAuth tokens saved by an earlier refresh take precedence over the
    /// configured ones.
    pub async fn connect(config: KitSyncConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let (storage, queue) = create_storage(&config).await?;
        storage.ensure_schema().await?;

        let credential = Credential::from_config(&config.kit)?
            .with_stored_tokens(storage.as_ref())
            .await?;
        let kit = KitClient::new(&config.kit, credential, &config.store.base_url)?
            .with_storage(storage.clone());
        let store = WooCommerceClient::new(&config.store)?;

        tracing::debug!(
            database_target = ?config.database_target,
            dry_run = config.application.dry_run,
            "Sync coordinator connected"
        );

        let services = SyncServices {
            store: Arc::new(store),
            kit: Arc::new(kit),
            storage,
            queue,
        };
        Ok(Self::new(config, services, shutdown))
    }

    pub fn new(
        config: KitSyncConfig,
        services: SyncServices,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            services,
            shutdown,
        }
    }

    /// Whether writes to the store, Kit and the work queue are suppressed
    pub fn dry_run(&self) -> bool {
        self.config.application.dry_run
    }

    fn purchase_sender(&self) -> Arc<PurchaseSender> {
        Arc::new(
            PurchaseSender::new(self.services.store.clone(), self.services.kit.clone())
                .dry_run(self.dry_run()),
        )
    }

    fn resource_cache(&self) -> Arc<ResourceCache> {
        Arc::new(ResourceCache::new(
            self.services.kit.clone(),
            self.services.storage.clone(),
            self.config.resources.cache_ttl_seconds,
        ))
    }

    fn batch_size(&self) -> u32 {
        u32::try_from(self.config.sync.batch_size).unwrap_or(MAX_PAGE_SIZE)
    }

    /// Rebuilds the work queue from the store
    pub async fn find_unsynced(&self) -> Result<RunSummary> {
        let mut finder = UnsyncedOrderFinder::new(
            self.services.store.clone(),
            self.services.queue.clone(),
        )
        .dry_run(self.dry_run());

        BatchRunner::new(MAX_PAGE_SIZE, self.shutdown.clone())
            .run(&mut finder)
            .await
    }

    /// Discovery (unless skipped) followed by the order sync batch
    ///
    /// In a dry run the queue is not rewritten, so the sync batch walks the
    /// ids discovery found instead.
    pub async fn sync_purchases(
        &self,
        limit: Option<u64>,
        skip_discovery: bool,
    ) -> Result<PurchaseSyncReport> {
        let mut queue = self.services.queue.clone();

        let discovery = if skip_discovery {
            None
        } else {
            let mut finder = UnsyncedOrderFinder::new(
                self.services.store.clone(),
                self.services.queue.clone(),
            )
            .dry_run(self.dry_run());
            let summary = BatchRunner::new(MAX_PAGE_SIZE, self.shutdown.clone())
                .run(&mut finder)
                .await?;

            if self.dry_run() {
                queue = Arc::new(MemoryStorage::with_queue(finder.found()));
            }
            if summary.interrupted {
                let mut sync = RunSummary::new("order_sync");
                sync.interrupted = true;
                return Ok(PurchaseSyncReport {
                    discovery: Some(summary),
                    sync,
                });
            }
            Some(summary)
        };

        let mut batch = OrderSyncBatch::new(queue, self.purchase_sender()).limit(limit);
        let sync = BatchRunner::new(self.batch_size(), self.shutdown.clone())
            .run(&mut batch)
            .await?;

        Ok(PurchaseSyncReport { discovery, sync })
    }

    /// Sends one order right away and dequeues it when sent
    pub async fn send_order(&self, order_id: OrderId) -> Result<SendOutcome> {
        let outcome = self.purchase_sender().send(order_id).await?;
        if outcome.clears_queue() {
            self.services.queue.remove(order_id).await?;
        }
        Ok(outcome)
    }

    /// Sends every queued order through the sequential driver
    pub async fn resend_queue(
        &self,
        policy: Option<ErrorPolicy>,
        reporter: &dyn ProgressReporter,
    ) -> Result<DriverSummary> {
        let order_ids = self.services.queue.list().await?;
        let driver = SyncDriver::new(
            self.purchase_sender(),
            self.services.queue.clone(),
            &self.config.sync,
            self.shutdown.clone(),
        )
        .with_policy(policy.unwrap_or(self.config.sync.on_error));

        driver.run(&order_ids, reporter).await
    }

    pub async fn refresh_resources(&self) -> Result<Vec<CachedResources>> {
        self.resource_cache().refresh_all().await
    }

    /// Applies the integration rules to an order status change
    pub async fn handle_order_event(&self, order_id: OrderId, status: &str) -> Result<EventReport> {
        let handler = OrderEventHandler::new(
            self.config.integration.clone(),
            self.services.store.clone(),
            self.services.kit.clone(),
            self.resource_cache(),
            self.purchase_sender(),
        )
        .dry_run(self.dry_run());

        handler.handle(order_id, status).await
    }

    pub async fn status(&self) -> Result<StatusReport> {
        let queued_orders = self.services.queue.count().await?;

        let mut resources = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let cached = self.services.storage.load_resources(kind).await?;
            resources.push(ResourceStatus {
                kind,
                count: cached.as_ref().map_or(0, |c| c.resources.len()),
                fetched_at: cached.map(|c| c.fetched_at),
            });
        }

        let stored_tokens = self
            .services
            .storage
            .load_setting(SETTING_ACCESS_TOKEN)
            .await?
            .is_some();

        Ok(StatusReport {
            queued_orders,
            resources,
            stored_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{order_id, FakeKit, FakeStore};

    fn coordinator(store: Arc<FakeStore>, kit: Arc<FakeKit>, dry_run: bool) -> SyncCoordinator {
        let memory = Arc::new(MemoryStorage::new());
        let mut config: KitSyncConfig = toml::from_str(
            r#"
            database_target = "memory"

            [kit]
            auth_type = "api_key"
            api_key = "key"

            [store]
            base_url = "https://shop.example.com"
            consumer_key = "ck"
            consumer_secret = "cs"
            "#,
        )
        .unwrap();
        config.application.dry_run = dry_run;

        let (_tx, rx) = watch::channel(false);
        SyncCoordinator::new(
            config,
            SyncServices {
                store,
                kit,
                storage: memory.clone(),
                queue: memory,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn test_limit_one_drains_queue_one_order_per_run() {
        let store = Arc::new(FakeStore::with_orders(&[1, 2, 3], &[]));
        let kit = Arc::new(FakeKit::new());
        let coordinator = coordinator(store.clone(), kit.clone(), false);

        for expected in 1..=3 {
            let report = coordinator.sync_purchases(Some(1), false).await.unwrap();
            assert_eq!(report.sync.succeeded, 1);
            assert_eq!(
                kit.purchases().last().unwrap().transaction_id,
                expected.to_string()
            );
        }

        let report = coordinator.sync_purchases(Some(1), false).await.unwrap();
        assert!(report.nothing_to_send());
        assert_eq!(kit.purchases().len(), 3);
    }

    #[tokio::test]
    async fn test_discovery_then_sync_persists_marker() {
        let store = Arc::new(FakeStore::with_orders(&[8], &[]));
        let kit = Arc::new(FakeKit::new());
        let coordinator = coordinator(store.clone(), kit, false);

        coordinator.find_unsynced().await.unwrap();
        assert_eq!(coordinator.services.queue.list().await.unwrap(), vec![order_id(8)]);

        let report = coordinator.sync_purchases(None, true).await.unwrap();

        assert_eq!(report.sync.succeeded, 1);
        assert!(coordinator.services.queue.list().await.unwrap().is_empty());
        assert!(store.order(8).sent_marker.unwrap().purchase_id.is_some());
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing_and_keeps_queue() {
        let store = Arc::new(FakeStore::with_orders(&[1, 2], &[]));
        let kit = Arc::new(FakeKit::new());
        let coordinator = coordinator(store.clone(), kit.clone(), true);

        let report = coordinator.sync_purchases(None, false).await.unwrap();

        assert_eq!(report.sync.succeeded, 2);
        assert!(kit.purchases().is_empty());
        assert_eq!(coordinator.services.queue.count().await.unwrap(), 0);
        assert!(!store.order(1).is_sent());
    }

    #[tokio::test]
    async fn test_send_order_dequeues() {
        let store = Arc::new(FakeStore::with_orders(&[4, 5], &[]));
        let kit = Arc::new(FakeKit::new());
        let coordinator = coordinator(store, kit, false);
        coordinator.find_unsynced().await.unwrap();

        let outcome = coordinator.send_order(order_id(4)).await.unwrap();

        assert!(matches!(outcome, SendOutcome::Sent { .. }));
        assert_eq!(coordinator.services.queue.list().await.unwrap(), vec![order_id(5)]);
    }

    #[tokio::test]
    async fn test_status_reports_queue_and_cache() {
        let store = Arc::new(FakeStore::with_orders(&[1, 2], &[2]));
        let kit = Arc::new(FakeKit::new());
        let coordinator = coordinator(store, kit, false);
        coordinator.find_unsynced().await.unwrap();
        coordinator.refresh_resources().await.unwrap();

        let status = coordinator.status().await.unwrap();

        assert_eq!(status.queued_orders, 1);
        assert!(status.resources.iter().all(|r| r.fetched_at.is_some()));
        assert!(!status.stored_tokens);
    }
}
