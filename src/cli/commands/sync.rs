//! Purchase sync commands
//!
//! `sync-purchases`, `find-unsynced`, `send-order` and `resend-queue`.

use super::{connect, exit_code, EXIT_INTERRUPTED, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::config::ErrorPolicy;
use crate::core::batch::RunSummary;
use crate::core::{DriverSummary, ProgressReporter};
use crate::domain::ids::OrderId;
use clap::Args;
use std::io::Write;
use tokio::sync::watch;

const NOTHING_TO_SEND: &str = "No outstanding Orders to send to Kit.";

/// Arguments for the sync-purchases command
#[derive(Args, Debug)]
pub struct SyncPurchasesArgs {
    /// Send at most this many queued orders in this run
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Use the existing queue instead of scanning the store first
    #[arg(long)]
    pub skip_discovery: bool,
}

impl SyncPurchasesArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(
            limit = ?self.limit,
            skip_discovery = self.skip_discovery,
            "Starting sync-purchases command"
        );

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if !self.skip_discovery {
            println!("🔍 Searching the store for orders not yet sent to Kit...");
        }

        let report = match coordinator
            .sync_purchases(self.limit, self.skip_discovery)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Purchase sync failed");
                eprintln!("❌ Purchase sync failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        if let Some(discovery) = &report.discovery {
            println!(
                "   {} order(s) checked, {} not yet sent",
                discovery.processed(),
                discovery.succeeded
            );
            for line in &discovery.errors {
                println!("   ❌ {line}");
            }
            println!();
        }
        let unreadable = report.discovery.as_ref().map_or(0, |d| d.failed);

        if report.nothing_to_send() {
            println!("{NOTHING_TO_SEND}");
            return Ok(if unreadable > 0 { EXIT_PARTIAL } else { EXIT_SUCCESS });
        }

        if !report.interrupted() || report.sync.processed() > 0 {
            println!("🚀 Sending purchase data...");
            print_lines(&report.sync);
            print_run_summary(&report.sync);
        }

        Ok(finish(
            report.interrupted(),
            report.sync.failed + unreadable,
            "Purchase sync",
        ))
    }
}

/// Arguments for the find-unsynced command
#[derive(Args, Debug)]
pub struct FindUnsyncedArgs {}

impl FindUnsyncedArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting find-unsynced command");

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("🔍 Searching the store for orders not yet sent to Kit...");
        let summary = match coordinator.find_unsynced().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Discovery failed");
                eprintln!("❌ Discovery failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        print_lines(&summary);
        println!();
        println!("📊 Discovery Summary:");
        println!("  Orders in store: {}", summary.total);
        println!("  Orders checked: {}", summary.processed());
        println!("  Not yet sent: {}", summary.succeeded);
        println!("  Unreadable: {}", summary.failed);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if summary.interrupted {
            println!("⚠️  Discovery interrupted. The queue was left unchanged.");
            return Ok(EXIT_INTERRUPTED);
        }
        if summary.succeeded == 0 {
            println!("{NOTHING_TO_SEND}");
        } else {
            println!("{}", found_line(summary.succeeded, coordinator.dry_run()));
        }
        if summary.failed > 0 {
            println!("⚠️  {} order(s) could not be read from the store", summary.failed);
            return Ok(EXIT_PARTIAL);
        }
        Ok(EXIT_SUCCESS)
    }
}

/// Arguments for the send-order command
#[derive(Args, Debug)]
pub struct SendOrderArgs {
    /// WooCommerce order ID (a leading '#' is accepted)
    pub order_id: OrderId,
}

impl SendOrderArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(order_id = %self.order_id, "Starting send-order command");

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match coordinator.send_order(self.order_id).await {
            Ok(outcome) => {
                println!("✅ {}", outcome.describe(self.order_id));
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(order_id = %self.order_id, error = %e, "Send failed");
                eprintln!("❌ Order ID #{}: {e}", self.order_id);
                Ok(exit_code(&e))
            }
        }
    }
}

/// Arguments for the resend-queue command
#[derive(Args, Debug)]
pub struct ResendQueueArgs {
    /// What to do when an order fails: stop, retry or skip
    #[arg(long, value_name = "POLICY")]
    pub on_error: Option<ErrorPolicy>,

    /// Print one line per order instead of a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl ResendQueueArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(policy = ?self.on_error, "Starting resend-queue command");

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("🚀 Sending queued orders one at a time...");
        let reporter = ConsoleReporter::new(!self.no_progress);
        let summary = match coordinator.resend_queue(self.on_error, &reporter).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Resend failed");
                eprintln!("❌ Resend failed: {e}");
                return Ok(exit_code(&e));
            }
        };
        reporter.finish();

        if summary.total == 0 {
            println!("{NOTHING_TO_SEND}");
            return Ok(EXIT_SUCCESS);
        }

        print_driver_summary(&summary);
        if summary.stopped {
            println!(
                "⚠️  Stopped at the first failure. \
                 Use --on-error skip or retry to continue past it."
            );
        }
        Ok(finish(summary.interrupted, summary.failed, "Resend"))
    }
}

fn print_lines(summary: &RunSummary) {
    for line in &summary.messages {
        println!("  {line}");
    }
    for line in &summary.errors {
        println!("  ❌ {line}");
    }
}

/// Closing line of a discovery run that found unsent orders
fn found_line(found: usize, dry_run: bool) -> String {
    if dry_run {
        format!("🔎 {found} order(s) not yet sent (dry run, queue unchanged)")
    } else {
        format!("✅ {found} order(s) queued for sending")
    }
}

fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("📊 Sync Summary:");
    println!("  Orders: {}", summary.total);
    println!("  Sent: {}", summary.succeeded);
    println!("  Already sent: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();
}

fn print_driver_summary(summary: &DriverSummary) {
    println!();
    println!("📊 Resend Summary:");
    println!("  Orders: {}", summary.total);
    println!("  Sent: {}", summary.sent);
    println!("  Already sent: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    println!("  Still queued: {}", summary.remaining);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}

fn finish(interrupted: bool, failed: usize, what: &str) -> i32 {
    if interrupted {
        println!();
        println!("⚠️  {what} interrupted gracefully. Unsent orders stay queued.");
        println!("   Run the same command to continue.");
        tracing::info!("{what} interrupted by user signal");
        EXIT_INTERRUPTED
    } else if failed > 0 {
        println!("⚠️  {what} completed with failures");
        EXIT_PARTIAL
    } else {
        println!("✅ {what} completed successfully!");
        EXIT_SUCCESS
    }
}

/// Progress bar on stderr, outcome lines on stdout
struct ConsoleReporter {
    bar: bool,
}

impl ConsoleReporter {
    const WIDTH: usize = 30;

    fn new(bar: bool) -> Self {
        Self { bar }
    }

    fn clear_line(&self) {
        if self.bar {
            eprint!("\r{:width$}\r", "", width = Self::WIDTH + 24);
        }
    }

    fn finish(&self) {
        if self.bar {
            eprintln!();
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_progress(&self, completed: usize, total: usize, percent: u8) {
        if !self.bar {
            return;
        }
        let filled = Self::WIDTH * percent as usize / 100;
        eprint!(
            "\r[{}{}] {percent:>3}% ({completed}/{total})",
            "#".repeat(filled),
            "-".repeat(Self::WIDTH - filled)
        );
        let _ = std::io::stderr().flush();
    }

    fn on_message(&self, line: &str) {
        self.clear_line();
        println!("  {line}");
    }
}
