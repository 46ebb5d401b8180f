//! Secure credential handling using the secrecy crate
//!
//! Tokens, API secrets and the database connection string are held in
//! [`SecretString`], which zeroes its memory on drop and redacts itself in
//! `Debug` output. Call `expose_secret()` only at the point of use.
//!
//! ```rust
//! use kitsync::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("kit-access-token".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "kit-access-token");
//! assert!(!format!("{token:?}").contains("kit-access-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that satisfies the `Secret` trait bounds
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroizing, redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string into a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional plain string, treating blank values as absent
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("refresh-token".to_string());
        assert_eq!(secret.expose_secret(), "refresh-token");
    }

    #[test]
    fn test_secret_string_opt_blank_is_none() {
        assert!(secret_string_opt(Some("  ".to_string())).is_none());
        assert!(secret_string_opt(None).is_none());
        assert!(secret_string_opt(Some("key".to_string())).is_some());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("cs_live_secret".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("cs_live_secret"));
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            consumer_secret: SecretString,
        }

        let section: Section = toml::from_str("consumer_secret = \"cs_123\"").unwrap();
        assert_eq!(section.consumer_secret.expose_secret(), "cs_123");
    }
}
