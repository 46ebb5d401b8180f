//! State storage abstraction layer
//!
//! Trait-based access to settings, the resource cache and the work queue,
//! with PostgreSQL and in-memory backends.

pub mod factory;
pub mod traits;

pub use factory::create_storage;
pub use traits::{StateStorage, WorkQueue, SETTING_ACCESS_TOKEN, SETTING_REFRESH_TOKEN};
