//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - The shutdown signal reaches every component watching it
//! - Batch runs stop between steps and skip their finish step
//! - The sequential driver never starts another order after the signal
//! - Unsent orders stay queued for the next run

use async_trait::async_trait;
use kitsync::adapters::database::traits::WorkQueue;
use kitsync::adapters::memory::MemoryStorage;
use kitsync::config::{ErrorPolicy, SyncConfig};
use kitsync::core::batch::{Batch, BatchCursor, BatchRunner, ItemOutcome};
use kitsync::core::purchase::{OrderSender, SendOutcome};
use kitsync::core::{LogReporter, SyncDriver};
use kitsync::domain::ids::{OrderId, PurchaseId};
use kitsync::domain::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

fn ids(raw: &[u64]) -> Vec<OrderId> {
    raw.iter().map(|id| OrderId::new(*id).unwrap()).collect()
}

/// Three pages of three numbers; raises the shutdown signal while handling
/// the item given in `stop_at`
struct NumberBatch {
    stop_at: u64,
    shutdown: watch::Sender<bool>,
    handled: Vec<u64>,
    finished: bool,
}

#[async_trait]
impl Batch for NumberBatch {
    type Item = u64;

    fn name(&self) -> &'static str {
        "numbers"
    }

    async fn count_total(&mut self) -> Result<u64> {
        Ok(9)
    }

    async fn get_items(&mut self, cursor: &BatchCursor) -> Result<Vec<u64>> {
        let start = cursor.offset() + 1;
        Ok((start..start + u64::from(cursor.per_step())).filter(|n| *n <= 9).collect())
    }

    async fn process_item(&mut self, item: u64) -> ItemOutcome {
        self.handled.push(item);
        if item == self.stop_at {
            let _ = self.shutdown.send(true);
        }
        ItemOutcome::Succeeded(format!("item {item}"))
    }

    async fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Sends every order successfully; raises the shutdown signal after `stop_after` sends
struct StoppingSender {
    stop_after: usize,
    shutdown: watch::Sender<bool>,
    sent: Mutex<Vec<OrderId>>,
}

#[async_trait]
impl OrderSender for StoppingSender {
    async fn send(&self, order_id: OrderId) -> Result<SendOutcome> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(order_id);
        if sent.len() >= self.stop_after {
            let _ = self.shutdown.send(true);
        }
        Ok(SendOutcome::Sent {
            purchase_id: PurchaseId::new(9000 + order_id.value()),
        })
    }
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_batch_run_finishes_current_step_then_stops() {
    let (tx, rx) = watch::channel(false);
    let mut batch = NumberBatch {
        stop_at: 2,
        shutdown: tx,
        handled: Vec::new(),
        finished: false,
    };

    let summary = BatchRunner::new(3, rx).run(&mut batch).await.unwrap();

    // The signal arrived during step 1; the step completes, step 2 never starts
    assert_eq!(batch.handled, vec![1, 2, 3]);
    assert!(summary.interrupted);
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.succeeded, 3);
    assert!(!batch.finished);
}

#[tokio::test]
async fn test_uninterrupted_batch_run_calls_finish() {
    let (tx, rx) = watch::channel(false);
    let mut batch = NumberBatch {
        stop_at: 0,
        shutdown: tx,
        handled: Vec::new(),
        finished: false,
    };

    let summary = BatchRunner::new(3, rx).run(&mut batch).await.unwrap();

    assert_eq!(batch.handled, (1..=9).collect::<Vec<_>>());
    assert_eq!(summary.steps, 3);
    assert!(!summary.interrupted);
    assert!(batch.finished);
}

#[tokio::test]
async fn test_driver_stops_between_orders() {
    let queue = Arc::new(MemoryStorage::with_queue(ids(&[1, 2, 3, 4])));
    let (tx, rx) = watch::channel(false);
    let sender = Arc::new(StoppingSender {
        stop_after: 2,
        shutdown: tx,
        sent: Mutex::new(Vec::new()),
    });

    let config = SyncConfig {
        on_error: ErrorPolicy::Skip,
        ..SyncConfig::default()
    };
    let driver = SyncDriver::new(sender.clone(), queue.clone(), &config, rx);
    let summary = driver.run(&ids(&[1, 2, 3, 4]), &LogReporter).await.unwrap();

    assert_eq!(*sender.sent.lock().unwrap(), ids(&[1, 2]));
    assert!(summary.interrupted);
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.remaining, 2);
    assert_eq!(queue.list().await.unwrap(), ids(&[3, 4]));
}

#[tokio::test]
async fn test_shutdown_before_start_sends_nothing() {
    let queue = Arc::new(MemoryStorage::with_queue(ids(&[1, 2])));
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let sender = Arc::new(StoppingSender {
        stop_after: usize::MAX,
        shutdown: watch::channel(false).0,
        sent: Mutex::new(Vec::new()),
    });

    let driver = SyncDriver::new(sender.clone(), queue.clone(), &SyncConfig::default(), rx);
    let summary = driver.run(&ids(&[1, 2]), &LogReporter).await.unwrap();

    assert!(sender.sent.lock().unwrap().is_empty());
    assert!(summary.interrupted);
    assert_eq!(queue.count().await.unwrap(), 2);
}
