//! Kit (ConvertKit) API integration
//!
//! - [`api::KitApi`] - the operations kitsync needs from Kit
//! - [`client::KitClient`] - the HTTP implementation with one-shot token refresh
//! - [`credentials::Credential`] - OAuth token pair or legacy API key

pub mod api;
pub mod client;
pub mod credentials;
pub mod models;

pub use api::KitApi;
pub use client::KitClient;
pub use credentials::Credential;
pub use models::{Account, PurchaseProduct, PurchaseRequest, SubscriberRequest};
