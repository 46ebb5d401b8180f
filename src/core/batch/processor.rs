//! Batch template: count, fetch a page, handle each item, finish

use super::cursor::BatchCursor;
use crate::domain::{KitSyncError, Result};
use async_trait::async_trait;

/// Result of handling a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Item handled; carries the line reported to the operator
    Succeeded(String),
    /// Item needed no work
    Skipped,
    /// Item failed; the batch continues with the next one
    Failed(String),
}

/// A paginated job driven by [`process_step`]
///
/// The runner never looks inside an item, so discovery walks orders while
/// the sync batch walks order ids through the same loop.
#[async_trait]
pub trait Batch: Send {
    type Item: Send;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Number of items the run will cover; called once per run
    async fn count_total(&mut self) -> Result<u64>;

    /// Items of the page the cursor points at
    async fn get_items(&mut self, cursor: &BatchCursor) -> Result<Vec<Self::Item>>;

    /// Handles one item; failures are reported, never raised
    async fn process_item(&mut self, item: Self::Item) -> ItemOutcome;

    /// Called once after the last page of a run that was not interrupted
    async fn finish(&mut self) -> Result<()>;
}

/// What one step did
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub step: u64,
    pub items: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub progress: u8,
}

impl StepReport {
    fn new(step: u64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        self.items += 1;
        match outcome {
            ItemOutcome::Succeeded(message) => {
                self.succeeded += 1;
                self.messages.push(message);
            }
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed(error) => {
                self.failed += 1;
                self.errors.push(error);
            }
        }
    }
}

/// Runs the step the cursor points at
///
/// Counts the total on the first call of a run and caches it in the cursor.
///
/// # Errors
///
/// Returns [`KitSyncError::NoItems`] when the page is empty, or the error of
/// the count or page query.
pub async fn process_step<B>(batch: &mut B, cursor: &mut BatchCursor) -> Result<StepReport>
where
    B: Batch + ?Sized,
{
    if cursor.total().is_none() {
        let total = batch.count_total().await?;
        cursor.set_total(total);
        crate::log_sync_start!(batch.name(), total);
    }

    let items = batch.get_items(cursor).await?;
    if items.is_empty() {
        return Err(KitSyncError::NoItems);
    }

    let mut report = StepReport::new(cursor.step());
    for item in items {
        let outcome = batch.process_item(item).await;
        report.record(outcome);
    }
    report.progress = cursor.progress();

    crate::log_batch_step!(batch.name(), report.step, report.items, report.progress);
    Ok(report)
}
