//! Run summary and reporting

use super::processor::StepReport;
use std::time::Duration;

/// Totals of a batch run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Batch name
    pub batch: &'static str,

    /// Items the run was expected to cover
    pub total: u64,

    /// Steps executed
    pub steps: u64,

    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Operator-facing lines of successful items, in processing order
    pub messages: Vec<String>,

    /// Item errors, in processing order
    pub errors: Vec<String>,

    /// Set when a shutdown signal ended the run early
    pub interrupted: bool,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new(batch: &'static str) -> Self {
        Self {
            batch,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Folds one step into the totals
    pub fn absorb(&mut self, step: StepReport) {
        self.steps += 1;
        self.succeeded += step.succeeded;
        self.skipped += step.skipped;
        self.failed += step.failed;
        self.messages.extend(step.messages);
        self.errors.extend(step.errors);
    }

    /// Items handled, whatever the outcome
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// No item failed and the run was not interrupted
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }

    /// Share of handled items that did not fail, as a percentage
    pub fn success_rate(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            return 100.0;
        }
        ((processed - self.failed) as f64 / processed as f64) * 100.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            batch = self.batch,
            total = self.total,
            steps = self.steps,
            succeeded = self.succeeded,
            skipped = self.skipped,
            failed = self.failed,
            interrupted = self.interrupted,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch run completed"
        );

        for error in &self.errors {
            tracing::warn!(batch = self.batch, error = %error, "Batch item failed");
        }
    }
}
