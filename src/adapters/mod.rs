//! External system integrations for kitsync.
//!
//! - [`kit`] - Kit API client with OAuth token refresh
//! - [`woocommerce`] - WooCommerce REST API order store
//! - [`database`] - State storage and work-queue traits
//! - [`postgresql`] - PostgreSQL implementation of the storage traits
//! - [`memory`] - In-memory implementation for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters isolate external systems behind traits (`KitApi`, `OrderStore`,
//! `StateStorage`, `WorkQueue`) so the sync core can run against test doubles.
//!
//! ```rust,no_run
//! use kitsync::adapters::kit::{Credential, KitClient};
//! use kitsync::config::KitConfig;
//!
//! # fn example(config: KitConfig) -> kitsync::domain::Result<()> {
//! let credential = Credential::from_config(&config)?;
//! let client = KitClient::new(&config, credential, "https://shop.example.com")?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod kit;
pub mod memory;
pub mod postgresql;
pub mod woocommerce;
