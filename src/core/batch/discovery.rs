//! Unsynced-order discovery
//!
//! Walks every store order and collects the ids of orders without a
//! purchase-data sent-marker. A completed run replaces the work queue with
//! what it found; an interrupted run leaves the queue untouched. Orders the
//! store cannot map are reported as failures and the walk carries on.

use super::cursor::BatchCursor;
use super::processor::{Batch, ItemOutcome};
use crate::adapters::database::traits::WorkQueue;
use crate::adapters::woocommerce::{ListedOrder, OrderStore};
use crate::domain::ids::OrderId;
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Batch that rebuilds the unsynced-order work queue
pub struct UnsyncedOrderFinder {
    store: Arc<dyn OrderStore>,
    queue: Arc<dyn WorkQueue>,
    found: BTreeSet<OrderId>,
    dry_run: bool,
}

impl UnsyncedOrderFinder {
    pub fn new(store: Arc<dyn OrderStore>, queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            store,
            queue,
            found: BTreeSet::new(),
            dry_run: false,
        }
    }

    /// Report what would be queued without touching the queue
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Ids found so far, ascending
    pub fn found(&self) -> Vec<OrderId> {
        self.found.iter().copied().collect()
    }
}

#[async_trait]
impl Batch for UnsyncedOrderFinder {
    type Item = ListedOrder;

    fn name(&self) -> &'static str {
        "discovery"
    }

    async fn count_total(&mut self) -> Result<u64> {
        self.found.clear();
        self.store.count_orders().await
    }

    async fn get_items(&mut self, cursor: &BatchCursor) -> Result<Vec<ListedOrder>> {
        self.store
            .list_orders(cursor.offset(), cursor.per_step())
            .await
    }

    async fn process_item(&mut self, listed: ListedOrder) -> ItemOutcome {
        let order = match listed {
            Ok(order) => order,
            Err(unreadable) => {
                return ItemOutcome::Failed(format!(
                    "Order ID #{} could not be read: {}",
                    unreadable.id, unreadable.reason
                ))
            }
        };

        if order.is_sent() {
            return ItemOutcome::Skipped;
        }

        if self.found.insert(order.id) {
            ItemOutcome::Succeeded(format!("Order ID #{} has not been sent to Kit", order.id))
        } else {
            ItemOutcome::Skipped
        }
    }

    async fn finish(&mut self) -> Result<()> {
        let ids = self.found();

        if self.dry_run {
            tracing::info!(count = ids.len(), "Dry run: work queue left unchanged");
            return Ok(());
        }

        self.queue.replace(&ids).await?;
        tracing::info!(count = ids.len(), "Work queue rebuilt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;
    use crate::core::batch::BatchRunner;
    use crate::core::test_support::{order_id, FakeStore};
    use tokio::sync::watch;

    async fn discover(store: Arc<FakeStore>, queue: Arc<MemoryStorage>) -> Vec<OrderId> {
        let (_tx, rx) = watch::channel(false);
        let mut finder = UnsyncedOrderFinder::new(store, queue.clone());
        BatchRunner::new(2, rx).run(&mut finder).await.unwrap();
        queue.list().await.unwrap()
    }

    #[tokio::test]
    async fn test_lists_each_unsent_order_once() {
        let store = Arc::new(FakeStore::with_orders(&[1, 2, 3, 4, 5], &[2, 4]));
        let queue = Arc::new(MemoryStorage::new());

        let queued = discover(store, queue).await;

        assert_eq!(queued, vec![order_id(1), order_id(3), order_id(5)]);
    }

    #[tokio::test]
    async fn test_repeated_discovery_is_idempotent() {
        let store = Arc::new(FakeStore::with_orders(&[10, 11, 12], &[11]));
        let queue = Arc::new(MemoryStorage::new());

        let first = discover(store.clone(), queue.clone()).await;
        let second = discover(store, queue).await;

        assert_eq!(first, second);
        assert_eq!(second, vec![order_id(10), order_id(12)]);
    }

    #[tokio::test]
    async fn test_replaces_stale_queue_entries() {
        let store = Arc::new(FakeStore::with_orders(&[1, 2], &[1]));
        let queue = Arc::new(MemoryStorage::with_queue([order_id(1), order_id(99)]));

        let queued = discover(store, queue).await;

        assert_eq!(queued, vec![order_id(2)]);
    }

    #[tokio::test]
    async fn test_unreadable_order_fails_without_stopping_the_walk() {
        let (_tx, rx) = watch::channel(false);
        let store = Arc::new(FakeStore::with_orders(&[1, 2, 3], &[]));
        store.make_unreadable(2);
        let queue = Arc::new(MemoryStorage::new());
        let mut finder = UnsyncedOrderFinder::new(store, queue.clone());

        let summary = BatchRunner::new(5, rx).run(&mut finder).await.unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.errors,
            vec!["Order ID #2 could not be read: invalid amount 'abc'".to_string()]
        );
        assert_eq!(queue.list().await.unwrap(), vec![order_id(1), order_id(3)]);
    }

    #[tokio::test]
    async fn test_dry_run_keeps_queue() {
        let (_tx, rx) = watch::channel(false);
        let store = Arc::new(FakeStore::with_orders(&[1, 2], &[]));
        let queue = Arc::new(MemoryStorage::with_queue([order_id(7)]));
        let mut finder = UnsyncedOrderFinder::new(store, queue.clone()).dry_run(true);

        BatchRunner::new(5, rx).run(&mut finder).await.unwrap();

        assert_eq!(finder.found(), vec![order_id(1), order_id(2)]);
        assert_eq!(queue.list().await.unwrap(), vec![order_id(7)]);
    }
}
