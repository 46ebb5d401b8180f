//! Order sync batch
//!
//! Sends the queued orders to Kit through an injected [`OrderSender`]. The
//! queue is snapshotted once per run, so removing sent orders never shifts
//! later pages.

use super::cursor::BatchCursor;
use super::processor::{Batch, ItemOutcome};
use crate::adapters::database::traits::WorkQueue;
use crate::core::purchase::{OrderSender, SendOutcome};
use crate::domain::ids::OrderId;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Batch that sends queued orders and removes each one that was sent
pub struct OrderSyncBatch {
    queue: Arc<dyn WorkQueue>,
    sender: Arc<dyn OrderSender>,
    limit: Option<u64>,
    snapshot: Vec<OrderId>,
}

impl OrderSyncBatch {
    pub fn new(queue: Arc<dyn WorkQueue>, sender: Arc<dyn OrderSender>) -> Self {
        Self {
            queue,
            sender,
            limit: None,
            snapshot: Vec::new(),
        }
    }

    /// Only send the `limit` lowest queued ids
    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl Batch for OrderSyncBatch {
    type Item = OrderId;

    fn name(&self) -> &'static str {
        "order_sync"
    }

    async fn count_total(&mut self) -> Result<u64> {
        let mut ids = self.queue.list().await?;
        ids.sort_unstable();
        ids.dedup();
        if let Some(limit) = self.limit {
            ids.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        self.snapshot = ids;
        Ok(self.snapshot.len() as u64)
    }

    async fn get_items(&mut self, cursor: &BatchCursor) -> Result<Vec<OrderId>> {
        let len = self.snapshot.len();
        let start = usize::try_from(cursor.offset()).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(cursor.per_step() as usize).min(len);
        Ok(self.snapshot[start..end].to_vec())
    }

    async fn process_item(&mut self, order_id: OrderId) -> ItemOutcome {
        let outcome = match self.sender.send(order_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Failed to send order");
                return ItemOutcome::Failed(format!("Order ID #{order_id}: {e}"));
            }
        };

        if outcome.clears_queue() {
            if let Err(e) = self.queue.remove(order_id).await {
                tracing::warn!(
                    order_id = %order_id,
                    error = %e,
                    "Order sent but could not be removed from the work queue"
                );
            }
        }

        match outcome {
            SendOutcome::AlreadySent { .. } => ItemOutcome::Skipped,
            other => ItemOutcome::Succeeded(other.describe(order_id)),
        }
    }

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
