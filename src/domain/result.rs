//! Result type alias for kitsync

use super::errors::KitSyncError;

/// Result type alias for kitsync operations
///
/// # Examples
///
/// ```
/// use kitsync::domain::result::Result;
/// use kitsync::domain::errors::KitSyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(KitSyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, KitSyncError>;
