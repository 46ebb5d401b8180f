// Kitsync - WooCommerce to Kit purchase and subscriber sync
// Copyright (c) 2025 Kitsync Contributors
// Licensed under the MIT License

use clap::Parser;
use kitsync::cli::{Cli, Commands};
use kitsync::config::LoggingConfig;
use kitsync::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console only; file logging is configured per deployment
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    let logging_guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "kitsync - WooCommerce to Kit sync"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!(
                                "Received SIGINT (Ctrl+C), initiating graceful shutdown..."
                            );
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to install SIGTERM handler, listening for Ctrl+C only"
                    );
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                        return;
                    }
                    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
        }

        eprintln!("\n⚠️  Shutdown signal received, finishing the current order...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    let config = cli.config.as_str();
    let dry_run = cli.dry_run;

    match &cli.command {
        Commands::SyncPurchases(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::FindUnsynced(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::SendOrder(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::ResendQueue(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::RefreshResources(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::OrderEvent(args) => args.execute(config, dry_run, shutdown_signal).await,
        Commands::Status(args) => args.execute(config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(config).await,
        Commands::Init(args) => args.execute().await,
    }
}
