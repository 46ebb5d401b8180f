//! Step loop for batch runs
//!
//! Steps run one after another in a single task. The shutdown signal is
//! checked before each step; an interrupted run skips `finish`, so discovery
//! never replaces the work queue with a partial result.

use super::cursor::BatchCursor;
use super::processor::{process_step, Batch};
use super::summary::RunSummary;
use crate::domain::{KitSyncError, Result};
use std::time::Instant;
use tokio::sync::watch;

/// Drives a [`Batch`] from its first step to its last
pub struct BatchRunner {
    per_step: u32,
    shutdown: watch::Receiver<bool>,
}

impl BatchRunner {
    pub fn new(per_step: u32, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            per_step: per_step.max(1),
            shutdown,
        }
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Runs every step of `batch`
    ///
    /// The run is complete when the cursor covers the counted total or a page
    /// comes back empty.
    ///
    /// # Errors
    ///
    /// Returns the first count, page or finish error; item failures are only
    /// counted in the summary.
    pub async fn run<B>(&self, batch: &mut B) -> Result<RunSummary>
    where
        B: Batch + ?Sized,
    {
        let start = Instant::now();
        let mut summary = RunSummary::new(batch.name());
        let mut cursor = BatchCursor::new(1, self.per_step);

        loop {
            if self.is_shutdown() {
                tracing::warn!(
                    batch = batch.name(),
                    step = cursor.step(),
                    "Shutdown requested, stopping batch run"
                );
                summary.interrupted = true;
                break;
            }

            match process_step(batch, &mut cursor).await {
                Ok(report) => {
                    summary.absorb(report);
                    if cursor.is_complete() {
                        break;
                    }
                    cursor.advance();
                }
                Err(KitSyncError::NoItems) => {
                    tracing::debug!(batch = batch.name(), step = cursor.step(), "No more items");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        summary.total = cursor.total().unwrap_or_default();

        if !summary.interrupted {
            batch.finish().await?;
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}
