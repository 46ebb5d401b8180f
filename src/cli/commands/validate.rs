//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the kitsync configuration file.

use super::{exit_code, EXIT_CONFIG, EXIT_SUCCESS};
use crate::adapters::database::create_storage;
use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::load_config;
use crate::config::schema::{DatabaseTarget, KitAuthType};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Kit API: {}", config.kit.base_url);
        println!(
            "  Kit Auth: {}",
            match config.kit.auth_type {
                KitAuthType::OAuth => "oauth",
                KitAuthType::ApiKey => "api_key",
            }
        );
        println!("  Store: {}", config.store.base_url);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Database Target: PostgreSQL");
                    let connection: &str = pg_config.connection_string.expose_secret().as_ref();
                    println!(
                        "  PostgreSQL Connection: {}",
                        redact_connection_string(connection)
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            DatabaseTarget::Memory => {
                println!("  Database Target: Memory (queue and tokens are not kept between runs)");
            }
        }

        println!("  Integration Enabled: {}", config.integration.enabled);
        if config.integration.enabled {
            println!("  Subscribe On: {}", config.integration.event);
            if !config.integration.subscription.is_empty() {
                println!("  Default Subscription: {}", config.integration.subscription);
            }
            println!("  Send Purchases: {}", config.integration.send_purchases);
        }
        println!("  Batch Size: {}", config.sync.batch_size);
        println!("  On Error: {:?}", config.sync.on_error);
        println!();

        println!("🔌 Checking state storage connection...");
        let connected = match create_storage(&config).await {
            Ok((storage, _queue)) => storage.test_connection().await,
            Err(e) => Err(e),
        };
        if let Err(e) = connected {
            tracing::error!(error = %e, "State storage connection failed");
            println!("❌ State storage is unreachable");
            println!("   Error: {e}");
            return Ok(exit_code(&e));
        }
        println!("✅ State storage connection OK");
        println!();
        Ok(EXIT_SUCCESS)
    }
}
