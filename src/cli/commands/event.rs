//! Order-event command implementation
//!
//! Replays an order status change through the integration rules: subscribe
//! the customer, then send purchase data when configured to.

use super::{connect, exit_code, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::core::subscription::EventReport;
use crate::domain::ids::OrderId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the order-event command
#[derive(Args, Debug)]
pub struct OrderEventArgs {
    /// WooCommerce order ID
    pub order_id: OrderId,

    /// The status the order moved to (e.g. processing, completed, wc-completed)
    pub status: String,
}

impl OrderEventArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(
            order_id = %self.order_id,
            status = %self.status,
            "Starting order-event command"
        );

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let report = match coordinator
            .handle_order_event(self.order_id, &self.status)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(order_id = %self.order_id, error = %e, "Order event failed");
                eprintln!("❌ Order ID #{}: {e}", self.order_id);
                return Ok(exit_code(&e));
            }
        };

        Ok(print_report(&report))
    }
}

fn print_report(report: &EventReport) -> i32 {
    println!("📝 Order ID #{}", report.order_id);
    for subscription in &report.subscribed {
        println!("  ✅ Subscribed to {subscription}");
    }
    for error in &report.subscribe_errors {
        println!("  ❌ {error}");
    }
    if let Some(outcome) = &report.purchase {
        println!("  ✅ {}", outcome.describe(report.order_id));
    }
    for reason in &report.skipped {
        println!("  ⚠️  Skipped: {reason}");
    }

    if report.subscribe_errors.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    }
}
