//! WooCommerce store integration
//!
//! Orders, products and coupons are read through the WooCommerce REST API;
//! the purchase-data sent-marker and order notes are written back to it.

pub mod client;
pub mod models;
pub mod store;

pub use client::WooCommerceClient;
pub use store::{ListedOrder, OrderStore, UnreadableOrder};
