//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for kitsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// kitsync - WooCommerce to Kit purchase and subscriber sync
#[derive(Parser, Debug)]
#[command(name = "kitsync")]
#[command(version, about, long_about = None)]
#[command(author = "Kitsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kitsync.toml", env = "KITSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KITSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Simulate: build requests but send nothing to Kit and change no state
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find unsynced orders, then send their purchase data to Kit
    SyncPurchases(commands::sync::SyncPurchasesArgs),

    /// Rebuild the queue of orders whose purchase data was never sent
    FindUnsynced(commands::sync::FindUnsyncedArgs),

    /// Send one order's purchase data to Kit
    SendOrder(commands::sync::SendOrderArgs),

    /// Send every queued order, one at a time
    ResendQueue(commands::sync::ResendQueueArgs),

    /// Refetch Kit forms, tags, sequences and custom fields
    RefreshResources(commands::resources::RefreshResourcesArgs),

    /// Apply the integration rules to an order status change
    OrderEvent(commands::event::OrderEventArgs),

    /// Show queue size, cached resources and token state
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPolicy;

    #[test]
    fn test_cli_parse_sync_purchases() {
        let cli = Cli::parse_from(["kitsync", "sync-purchases"]);
        assert_eq!(cli.config, "kitsync.toml");
        match cli.command {
            Commands::SyncPurchases(args) => {
                assert_eq!(args.limit, None);
                assert!(!args.skip_discovery);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_limit() {
        let cli = Cli::parse_from(["kitsync", "sync-purchases", "--limit", "1"]);
        assert!(matches!(
            cli.command,
            Commands::SyncPurchases(commands::sync::SyncPurchasesArgs { limit: Some(1), .. })
        ));
    }

    #[test]
    fn test_cli_rejects_zero_limit() {
        assert!(Cli::try_parse_from(["kitsync", "sync-purchases", "--limit", "0"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["kitsync", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_dry_run_after_subcommand() {
        let cli = Cli::parse_from(["kitsync", "find-unsynced", "--dry-run"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_parse_send_order_accepts_hash() {
        let cli = Cli::parse_from(["kitsync", "send-order", "#1042"]);
        match cli.command {
            Commands::SendOrder(args) => assert_eq!(args.order_id.value(), 1042),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_resend_queue_policy() {
        let cli = Cli::parse_from(["kitsync", "resend-queue", "--on-error", "retry"]);
        match cli.command {
            Commands::ResendQueue(args) => assert_eq!(args.on_error, Some(ErrorPolicy::Retry)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_order_event() {
        let cli = Cli::parse_from(["kitsync", "order-event", "77", "completed"]);
        match cli.command {
            Commands::OrderEvent(args) => {
                assert_eq!(args.order_id.value(), 77);
                assert_eq!(args.status, "completed");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_and_init() {
        let cli = Cli::parse_from(["kitsync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
        let cli = Cli::parse_from(["kitsync", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
