//! Order store abstraction
//!
//! Everything the sync core reads from or writes to the shop goes through
//! [`OrderStore`], so batches and handlers can be exercised without a shop.

use crate::domain::ids::{OrderId, ProductId};
use crate::domain::order::{Order, SentMarker};
use crate::domain::subscription::Subscription;
use crate::domain::Result;
use async_trait::async_trait;

/// Largest page the WooCommerce REST API serves
pub const MAX_PAGE_SIZE: u32 = 100;

/// Listed order whose fields could not be mapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableOrder {
    pub id: u64,
    pub reason: String,
}

/// One entry of an order listing page
pub type ListedOrder = std::result::Result<Order, UnreadableOrder>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders in ascending id order, starting at `offset`
    ///
    /// Refunds are a separate resource and never appear here. An order that
    /// cannot be mapped is listed as [`UnreadableOrder`] in its place.
    async fn list_orders(&self, offset: u64, limit: u32) -> Result<Vec<ListedOrder>>;

    /// Total number of orders
    async fn count_orders(&self) -> Result<u64>;

    async fn get_order(&self, order_id: OrderId) -> Result<Order>;

    /// Persists the purchase-data sent-marker on the order
    async fn save_sent_marker(&self, marker: &SentMarker) -> Result<()>;

    /// Adds a private note to the order
    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<()>;

    /// Subscription configured on a product, if any
    async fn product_subscription(&self, product_id: ProductId) -> Result<Option<Subscription>>;

    /// Subscription configured on the coupon with this code, if any
    async fn coupon_subscription(&self, code: &str) -> Result<Option<Subscription>>;
}
