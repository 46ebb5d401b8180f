//! Purchase data
//!
//! [`OrderSender`] is the seam between the batch engine and Kit: batches and
//! the sequential driver only know how to ask for an order to be sent.
//! [`PurchaseSender`] is the implementation that talks to the store and Kit.

pub mod payload;
pub mod sender;

pub use payload::build_purchase;
pub use sender::PurchaseSender;

use crate::domain::ids::{OrderId, PurchaseId};
use crate::domain::Result;
use async_trait::async_trait;

/// What happened when an order was handed to an [`OrderSender`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Kit accepted the purchase and the sent-marker was written
    Sent { purchase_id: PurchaseId },
    /// The order already carried a sent-marker; nothing was sent
    AlreadySent { purchase_id: Option<PurchaseId> },
    /// Dry run; the purchase was built but not sent
    Simulated,
}

impl SendOutcome {
    /// Whether the order can leave the work queue
    pub fn clears_queue(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. } | SendOutcome::AlreadySent { .. })
    }

    /// Operator-facing line for this outcome
    pub fn describe(&self, order_id: OrderId) -> String {
        match self {
            SendOutcome::Sent { purchase_id } => format!(
                "Order ID #{order_id} added to Purchase Data successfully. Purchase ID: #{purchase_id}"
            ),
            SendOutcome::AlreadySent {
                purchase_id: Some(purchase_id),
            } => format!(
                "Order ID #{order_id} was already sent to Kit. Purchase ID: #{purchase_id}"
            ),
            SendOutcome::AlreadySent { purchase_id: None } => {
                format!("Order ID #{order_id} was already sent to Kit.")
            }
            SendOutcome::Simulated => {
                format!("Order ID #{order_id} would be added to Purchase Data (dry run).")
            }
        }
    }
}

/// Sends one order's purchase data to Kit
#[async_trait]
pub trait OrderSender: Send + Sync {
    async fn send(&self, order_id: OrderId) -> Result<SendOutcome>;
}
