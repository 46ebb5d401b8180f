//! Domain error types
//!
//! This module defines the error hierarchy for kitsync. All errors are
//! domain-specific and don't expose third-party HTTP or database types.

use thiserror::Error;

/// Main kitsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps the adapter-specific error types and provides context for
/// error handling at the CLI boundary.
#[derive(Debug, Error)]
pub enum KitSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Kit API errors
    #[error("Kit API error: {0}")]
    Kit(#[from] KitApiError),

    /// WooCommerce store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// State storage errors (work queue, settings, resource cache)
    #[error("Database error: {0}")]
    Database(String),

    /// A batch page came back empty
    #[error("No items found for this batch step")]
    NoItems,

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A local precondition was not met (missing email, disabled integration, ...)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Kit API errors
///
/// Errors that occur when talking to the Kit (ConvertKit) REST API.
#[derive(Debug, Error)]
pub enum KitApiError {
    /// Failed to reach the API
    #[error("Failed to connect to Kit API: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Credentials were rejected and could not be refreshed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The refresh token exchange failed
    #[error("Access token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// The API returned a structured error
    #[error("Kit API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The response body could not be parsed
    #[error("Invalid response from Kit API: {0}")]
    InvalidResponse(String),
}

impl KitApiError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            KitApiError::ConnectionFailed(_)
            | KitApiError::Timeout(_)
            | KitApiError::RateLimitExceeded(_) => true,
            KitApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// WooCommerce store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Order does not exist
    #[error("Order not found: #{0}")]
    OrderNotFound(u64),

    /// Product does not exist
    #[error("Product not found: #{0}")]
    ProductNotFound(u64),

    /// The store API returned an error
    #[error("Store API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be parsed
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for KitSyncError {
    fn from(err: std::io::Error) -> Self {
        KitSyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for KitSyncError {
    fn from(err: serde_json::Error) -> Self {
        KitSyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for KitSyncError {
    fn from(err: toml::de::Error) -> Self {
        KitSyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
