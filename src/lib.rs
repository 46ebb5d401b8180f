// Kitsync - WooCommerce to Kit purchase and subscriber sync
// Copyright (c) 2025 Kitsync Contributors
// Licensed under the MIT License

//! # kitsync - WooCommerce to Kit sync
//!
//! kitsync sends WooCommerce order data to Kit (formerly ConvertKit): purchase
//! data for paid orders, and subscriber plus form/tag/sequence subscriptions
//! when an order changes status.
//!
//! ## Overview
//!
//! - **Discovering** orders that were never sent, into a persistent work queue
//! - **Sending** queued orders in resumable, paginated batches
//! - **Resending** the queue one order at a time with stop/retry/skip policies
//! - **Subscribing** customers according to the integration rules
//! - **Refreshing** OAuth tokens once per rejected request
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch engine, purchase sender, subscription rules, sync driver
//! - [`adapters`] - WooCommerce REST, Kit API and state storage
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kitsync::config::load_config;
//! use kitsync::core::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("kitsync.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = SyncCoordinator::connect(config, shutdown_rx).await?;
//!     let report = coordinator.sync_purchases(None, false).await?;
//!
//!     println!("Sent {} orders", report.sync.succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::KitSyncError`]; the CLI maps it onto exit
//! codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
