//! Integration rules for order status changes
//!
//! [`OrderEventHandler`] subscribes customers to the forms, tags and
//! sequences configured on the integration, the purchased products and the
//! applied coupons, and forwards purchase data when the order reaches the
//! purchase status.

pub mod handler;
pub mod subscriber;

pub use handler::{EventReport, OrderEventHandler};
pub use subscriber::{build_subscriber, subscriber_name};
