//! Logging and observability
//!
//! Structured `tracing` output with a console layer and an optional rotating
//! JSON file layer, plus a few macros that keep field names consistent across
//! the sync code paths.
//!
//! # Example
//!
//! ```no_run
//! use kitsync::logging::init_logging;
//! use kitsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(order_id = 1042, "Order queued");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch run
///
/// # Example
///
/// ```no_run
/// use kitsync::log_sync_start;
///
/// log_sync_start!("order_sync", 42);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($batch:expr, $total:expr) => {
        tracing::info!(batch = $batch, total = $total, "Starting batch run");
    };
}

/// Log purchase data accepted by Kit for an order
///
/// # Example
///
/// ```no_run
/// use kitsync::log_order_sent;
///
/// log_order_sent!(1042, Some(88123));
/// ```
#[macro_export]
macro_rules! log_order_sent {
    ($order_id:expr, $purchase_id:expr) => {
        tracing::info!(
            order_id = %$order_id,
            purchase_id = ?$purchase_id,
            "Purchase data sent"
        );
    };
}

/// Log one processed batch step
///
/// # Example
///
/// ```no_run
/// use kitsync::log_batch_step;
///
/// log_batch_step!("discovery", 2, 5, 40.0);
/// ```
#[macro_export]
macro_rules! log_batch_step {
    ($batch:expr, $step:expr, $items:expr, $progress:expr) => {
        tracing::debug!(
            batch = $batch,
            step = $step,
            items = $items,
            progress_pct = $progress,
            "Processed batch step"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use kitsync::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
