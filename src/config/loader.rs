//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ErrorPolicy, KitSyncConfig};
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::KitSyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`KitSyncConfig`]
/// 4. Applies environment variable overrides (`KITSYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`KitSyncError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use kitsync::config::load_config;
///
/// let config = load_config("kitsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<KitSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(KitSyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        KitSyncError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: KitSyncConfig = toml::from_str(&contents)
        .map_err(|e| KitSyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        KitSyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched. Line structure is preserved.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| KitSyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut missing_vars: Vec<String> = Vec::new();

    let lines: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            re.replace_all(line, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                match std::env::var(var_name) {
                    Ok(value) => value,
                    Err(_) => {
                        if !missing_vars.iter().any(|v| v == var_name) {
                            missing_vars.push(var_name.to_string());
                        }
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
        })
        .collect();

    if !missing_vars.is_empty() {
        return Err(KitSyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        Some(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| KitSyncError::Configuration(format!("Invalid value '{val}' for {name}"))),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `KITSYNC_*` prefix
///
/// Variables follow the pattern `KITSYNC_<SECTION>_<KEY>`, for example
/// `KITSYNC_KIT_ACCESS_TOKEN` or `KITSYNC_SYNC_BATCH_SIZE`.
fn apply_env_overrides(config: &mut KitSyncConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("KITSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_env("KITSYNC_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Kit overrides
    if let Some(val) = env("KITSYNC_KIT_BASE_URL") {
        config.kit.base_url = val;
    }
    if let Some(val) = env("KITSYNC_KIT_CLIENT_ID") {
        config.kit.client_id = Some(val);
    }
    if let Some(val) = secret_string_opt(env("KITSYNC_KIT_ACCESS_TOKEN")) {
        config.kit.access_token = Some(val);
    }
    if let Some(val) = secret_string_opt(env("KITSYNC_KIT_REFRESH_TOKEN")) {
        config.kit.refresh_token = Some(val);
    }
    if let Some(val) = secret_string_opt(env("KITSYNC_KIT_API_KEY")) {
        config.kit.api_key = Some(val);
    }
    if let Some(val) = secret_string_opt(env("KITSYNC_KIT_API_SECRET")) {
        config.kit.api_secret = Some(val);
    }
    if let Some(val) = parse_env("KITSYNC_KIT_TIMEOUT_SECONDS")? {
        config.kit.timeout_seconds = val;
    }

    // Store overrides
    if let Some(val) = env("KITSYNC_STORE_BASE_URL") {
        config.store.base_url = val;
    }
    if let Some(val) = env("KITSYNC_STORE_CONSUMER_KEY") {
        config.store.consumer_key = val;
    }
    if let Some(val) = env("KITSYNC_STORE_CONSUMER_SECRET") {
        config.store.consumer_secret = secret_string(val);
    }
    if let Some(val) = parse_env("KITSYNC_STORE_TIMEOUT_SECONDS")? {
        config.store.timeout_seconds = val;
    }

    // Integration overrides
    if let Some(val) = parse_env("KITSYNC_INTEGRATION_ENABLED")? {
        config.integration.enabled = val;
    }
    if let Some(val) = env("KITSYNC_INTEGRATION_SUBSCRIPTION") {
        config.integration.subscription = val;
    }
    if let Some(val) = parse_env("KITSYNC_INTEGRATION_SEND_PURCHASES")? {
        config.integration.send_purchases = val;
    }

    // Sync overrides
    if let Some(val) = parse_env("KITSYNC_SYNC_BATCH_SIZE")? {
        config.sync.batch_size = val;
    }
    if let Some(val) = parse_env::<ErrorPolicy>("KITSYNC_SYNC_ON_ERROR")? {
        config.sync.on_error = val;
    }
    if let Some(val) = parse_env("KITSYNC_SYNC_MAX_RETRIES")? {
        config.sync.max_retries = val;
    }

    // PostgreSQL overrides (only if configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Some(val) = env("KITSYNC_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(val) = parse_env("KITSYNC_POSTGRESQL_MAX_CONNECTIONS")? {
            pg.max_connections = val;
        }
    }

    // Logging overrides
    if let Some(val) = parse_env("KITSYNC_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("KITSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
