//! Refresh-resources command implementation

use super::{connect, exit_code, EXIT_SUCCESS};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the refresh-resources command
#[derive(Args, Debug)]
pub struct RefreshResourcesArgs {
    /// List every resource, not just the counts
    #[arg(short, long)]
    pub verbose: bool,
}

impl RefreshResourcesArgs {
    pub async fn execute(
        &self,
        config_path: &str,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting refresh-resources command");

        let coordinator = match connect(config_path, dry_run, shutdown_signal).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("🔍 Fetching resources from Kit...");
        let refreshed = match coordinator.refresh_resources().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Resource refresh failed");
                eprintln!("❌ Resource refresh failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        println!();
        for cached in &refreshed {
            println!("  {}: {}", cached.kind, cached.resources.len());
            if self.verbose {
                for resource in &cached.resources {
                    match &resource.key {
                        Some(key) => println!("    - {} [{}] ({key})", resource.name, resource.id),
                        None => println!("    - {} [{}]", resource.name, resource.id),
                    }
                }
            }
        }
        println!();
        println!("✅ Resources refreshed");
        Ok(EXIT_SUCCESS)
    }
}
