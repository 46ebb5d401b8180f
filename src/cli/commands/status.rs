//! Status command implementation
//!
//! Shows the work queue size, the age of each cached Kit resource list and
//! whether refreshed tokens are stored.

use super::{connect, exit_code, EXIT_SUCCESS};
use crate::core::StatusReport;
use chrono::Utc;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let coordinator = match connect(config_path, false, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match coordinator.status().await {
            Ok(report) => {
                print_status(&report);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to load status");
                println!("   Error: {e}");
                Ok(exit_code(&e))
            }
        }
    }
}

fn print_status(report: &StatusReport) {
    if report.queued_orders == 0 {
        println!("  Queued orders: 0 (run 'kitsync find-unsynced' to rescan the store)");
    } else {
        println!("  Queued orders: {}", report.queued_orders);
    }
    println!(
        "  Stored OAuth tokens: {}",
        if report.stored_tokens { "yes" } else { "no" }
    );
    println!();
    println!("  Kit resources:");
    for resource in &report.resources {
        match resource.fetched_at {
            Some(at) => {
                let age = Utc::now().signed_duration_since(at);
                println!(
                    "    {:<14} {:>5}  fetched {} ({}m ago)",
                    resource.kind.as_str(),
                    resource.count,
                    at.format("%Y-%m-%d %H:%M:%S UTC"),
                    age.num_minutes()
                );
            }
            None => println!("    {:<14}     -  never fetched", resource.kind.as_str()),
        }
    }
    println!();
}
