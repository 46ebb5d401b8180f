//! PostgreSQL state storage
//!
//! Persists settings, the Kit resource cache and the unsynced-order work queue.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
