//! Core business logic for kitsync.
//!
//! # Modules
//!
//! - [`batch`] - Paginated batch engine, unsynced-order discovery and the order sync batch
//! - [`purchase`] - Purchase payloads and the order sender
//! - [`subscription`] - Integration rules applied on order status changes
//! - [`resources`] - Cached Kit forms, tags, sequences and custom fields
//! - [`driver`] - One-at-a-time sync with stop/retry/skip error policies
//! - [`coordinator`] - Wires the above to the store, Kit and storage
//!
//! # Sync Workflow
//!
//! 1. **Discover**: walk every store order, queue those without a sent-marker
//! 2. **Snapshot**: read the queue once, ascending, truncated to `--limit`
//! 3. **Send**: post each order's purchase to Kit
//! 4. **Mark**: write the sent-marker on the order, then dequeue it
//! 5. **Report**: log and print a run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use kitsync::config::load_config;
//! use kitsync::core::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kitsync.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = SyncCoordinator::connect(config, shutdown_rx).await?;
//! let report = coordinator.sync_purchases(Some(10), false).await?;
//!
//! for line in &report.sync.messages {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod coordinator;
pub mod driver;
pub mod purchase;
pub mod resources;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{PurchaseSyncReport, StatusReport, SyncCoordinator, SyncServices};
pub use driver::{DriverSummary, LogReporter, ProgressReporter, SyncDriver};
