//! Paginated batch engine
//!
//! A [`Batch`] supplies a count, pages of items and a per-item handler;
//! [`BatchRunner`] walks it step by step with a [`BatchCursor`].
//!
//! Two batches exist:
//! - [`discovery::UnsyncedOrderFinder`] rebuilds the work queue from the store
//! - [`order_sync::OrderSyncBatch`] sends the queued orders to Kit

pub mod cursor;
pub mod discovery;
pub mod order_sync;
pub mod processor;
pub mod runner;
pub mod summary;

pub use cursor::BatchCursor;
pub use discovery::UnsyncedOrderFinder;
pub use order_sync::OrderSyncBatch;
pub use processor::{process_step, Batch, ItemOutcome, StepReport};
pub use runner::BatchRunner;
pub use summary::RunSummary;
