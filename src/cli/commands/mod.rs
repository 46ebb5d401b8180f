//! CLI command implementations
//!
//! Every command returns its process exit code:
//! 0 success, 1 partial failure, 2 configuration error, 4 connection error,
//! 5 fatal error, 130 interrupted.

pub mod event;
pub mod init;
pub mod resources;
pub mod status;
pub mod sync;
pub mod validate;

use crate::config::load_config;
use crate::core::SyncCoordinator;
use crate::domain::{KitApiError, KitSyncError, StoreError};
use tokio::sync::watch;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit code for a command that failed with `err`
pub fn exit_code(err: &KitSyncError) -> i32 {
    match err {
        KitSyncError::Configuration(_) | KitSyncError::Validation(_) => EXIT_CONFIG,
        KitSyncError::Database(_)
        | KitSyncError::Kit(
            KitApiError::ConnectionFailed(_)
            | KitApiError::Timeout(_)
            | KitApiError::Unauthorized(_)
            | KitApiError::TokenRefreshFailed(_),
        )
        | KitSyncError::Store(StoreError::ConnectionFailed(_) | StoreError::Timeout(_)) => {
            EXIT_CONNECTION
        }
        KitSyncError::Kit(_)
        | KitSyncError::Store(_)
        | KitSyncError::Precondition(_)
        | KitSyncError::NoItems => EXIT_PARTIAL,
        _ => EXIT_FATAL,
    }
}

/// Loads the configuration and connects the coordinator
///
/// On failure the error is printed and the exit code returned as `Err`.
pub(crate) async fn connect(
    config_path: &str,
    dry_run: bool,
    shutdown: watch::Receiver<bool>,
) -> Result<SyncCoordinator, i32> {
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("❌ Configuration error: {e}");
            return Err(EXIT_CONFIG);
        }
    };

    if dry_run {
        tracing::info!("Enabling dry-run mode from CLI");
        config.application.dry_run = true;
    }
    if config.application.dry_run {
        println!("🔍 DRY RUN MODE - nothing will be sent to Kit");
        println!();
    }

    SyncCoordinator::connect(config, shutdown)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize");
            eprintln!("❌ Failed to initialize: {e}");
            exit_code(&e)
        })
}
