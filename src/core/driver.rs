//! Sequential sync driver
//!
//! Sends orders strictly one at a time: the next request is only issued once
//! the previous one finished. Failures follow the configured
//! [`ErrorPolicy`]; a shutdown signal is honoured between requests and after
//! every retry pause, never in the middle of a request.

use crate::adapters::database::traits::WorkQueue;
use crate::config::schema::{ErrorPolicy, SyncConfig};
use crate::core::purchase::{OrderSender, SendOutcome};
use crate::domain::ids::OrderId;
use crate::domain::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Receives driver progress
pub trait ProgressReporter: Send + Sync {
    /// Called after each order, whatever its outcome
    fn on_progress(&self, completed: usize, total: usize, percent: u8);

    /// One human-readable line per order outcome
    fn on_message(&self, line: &str);
}

/// Reports progress through `tracing` only
#[derive(Debug, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn on_progress(&self, completed: usize, total: usize, percent: u8) {
        tracing::debug!(completed, total, percent, "Sync progress");
    }

    fn on_message(&self, line: &str) {
        tracing::info!("{line}");
    }
}

/// Totals of a driver run
#[derive(Debug, Clone, Default)]
pub struct DriverSummary {
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Orders still queued when the run ended
    pub remaining: usize,
    /// The stop policy ended the run at a failure
    pub stopped: bool,
    pub interrupted: bool,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl DriverSummary {
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.stopped && !self.interrupted
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            sent = self.sent,
            skipped = self.skipped,
            failed = self.failed,
            remaining = self.remaining,
            stopped = self.stopped,
            interrupted = self.interrupted,
            duration_ms = self.duration.as_millis() as u64,
            "Sequential sync completed"
        );
    }
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed * 100) / total).min(100) as u8
}

pub struct SyncDriver {
    sender: Arc<dyn OrderSender>,
    queue: Arc<dyn WorkQueue>,
    policy: ErrorPolicy,
    retry_delay: Duration,
    max_retries: usize,
    shutdown: watch::Receiver<bool>,
}

impl SyncDriver {
    pub fn new(
        sender: Arc<dyn OrderSender>,
        queue: Arc<dyn WorkQueue>,
        config: &SyncConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            sender,
            queue,
            policy: config.on_error,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_retries: config.max_retries,
            shutdown,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sends `order_ids` in order
    ///
    /// # Errors
    ///
    /// Only fails when the work queue cannot be read at the end of the run;
    /// send failures are handled by the error policy.
    pub async fn run(
        &self,
        order_ids: &[OrderId],
        reporter: &dyn ProgressReporter,
    ) -> Result<DriverSummary> {
        let start = Instant::now();
        let total = order_ids.len();
        let mut summary = DriverSummary {
            total,
            ..DriverSummary::default()
        };

        tracing::info!(total, policy = ?self.policy, "Starting sequential sync");

        'orders: for (index, &order_id) in order_ids.iter().enumerate() {
            if self.is_shutdown() {
                summary.interrupted = true;
                break;
            }

            let mut attempt = 0;
            loop {
                match self.sender.send(order_id).await {
                    Ok(outcome) => {
                        self.record_success(order_id, outcome, &mut summary, reporter)
                            .await;
                        break;
                    }
                    Err(e) => {
                        let line = format!("Order ID #{order_id}: {e}");
                        match self.policy {
                            ErrorPolicy::Stop => {
                                reporter.on_message(&line);
                                summary.failed += 1;
                                summary.errors.push(line);
                                summary.stopped = true;
                                reporter.on_progress(index + 1, total, percent(index + 1, total));
                                break 'orders;
                            }
                            ErrorPolicy::Skip => {
                                reporter.on_message(&line);
                                summary.failed += 1;
                                summary.errors.push(line);
                                break;
                            }
                            ErrorPolicy::Retry if attempt >= self.max_retries => {
                                reporter.on_message(&line);
                                summary.failed += 1;
                                summary.errors.push(line);
                                break;
                            }
                            ErrorPolicy::Retry => {
                                attempt += 1;
                                crate::log_retry_attempt!(attempt, self.max_retries, e);
                                tokio::time::sleep(self.retry_delay * attempt as u32).await;
                                if self.is_shutdown() {
                                    summary.interrupted = true;
                                    break 'orders;
                                }
                            }
                        }
                    }
                }
            }

            reporter.on_progress(index + 1, total, percent(index + 1, total));
        }

        summary.remaining = self.queue.count().await? as usize;
        summary.duration = start.elapsed();
        summary.log_summary();
        Ok(summary)
    }

    async fn record_success(
        &self,
        order_id: OrderId,
        outcome: SendOutcome,
        summary: &mut DriverSummary,
        reporter: &dyn ProgressReporter,
    ) {
        if outcome.clears_queue() {
            if let Err(e) = self.queue.remove(order_id).await {
                tracing::warn!(order_id = %order_id, error = %e, "Failed to dequeue sent order");
            }
        }

        match outcome {
            SendOutcome::AlreadySent { .. } => summary.skipped += 1,
            _ => summary.sent += 1,
        }
        reporter.on_message(&outcome.describe(order_id));
    }
}
