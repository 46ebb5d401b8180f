//! Purchase sender
//!
//! Loads an order, sends its purchase to Kit, then writes the sent-marker and
//! an order note back to the store. The sent-marker is checked first, so an
//! order is never sent twice even when it is still queued.

use super::payload::build_purchase;
use super::{OrderSender, SendOutcome};
use crate::adapters::kit::KitApi;
use crate::adapters::woocommerce::OrderStore;
use crate::domain::ids::OrderId;
use crate::domain::order::{Order, SentMarker};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends purchase data for store orders
pub struct PurchaseSender {
    store: Arc<dyn OrderStore>,
    kit: Arc<dyn KitApi>,
    dry_run: bool,
}

impl PurchaseSender {
    pub fn new(store: Arc<dyn OrderStore>, kit: Arc<dyn KitApi>) -> Self {
        Self {
            store,
            kit,
            dry_run: false,
        }
    }

    /// Build purchases without sending them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sends an already loaded order
    ///
    /// # Errors
    ///
    /// Returns an error if the order has no email, Kit rejects the purchase,
    /// or the sent-marker cannot be saved. A failing order note is only
    /// logged.
    pub async fn send_order(&self, order: &Order) -> Result<SendOutcome> {
        if let Some(marker) = &order.sent_marker {
            tracing::debug!(order_id = %order.id, "Order already sent, skipping");
            return Ok(SendOutcome::AlreadySent {
                purchase_id: marker.purchase_id,
            });
        }

        let purchase = build_purchase(order)?;

        if self.dry_run {
            tracing::info!(
                order_id = %order.id,
                products = purchase.products.len(),
                total = purchase.total,
                "Dry run: purchase not sent"
            );
            return Ok(SendOutcome::Simulated);
        }

        let purchase_id = self.kit.create_purchase(&purchase).await?;

        self.store
            .save_sent_marker(&SentMarker::new(order.id, Some(purchase_id)))
            .await?;

        let note = format!("[Kit] Purchase Data sent successfully: ID [{purchase_id}]");
        if let Err(e) = self.store.add_order_note(order.id, &note).await {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to add order note");
        }

        crate::log_order_sent!(order.id, Some(purchase_id.value()));
        Ok(SendOutcome::Sent { purchase_id })
    }
}

#[async_trait]
impl OrderSender for PurchaseSender {
    async fn send(&self, order_id: OrderId) -> Result<SendOutcome> {
        let order = self.store.get_order(order_id).await?;
        self.send_order(&order).await
    }
}
