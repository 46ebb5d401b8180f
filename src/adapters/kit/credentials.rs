//! Kit API credentials
//!
//! Kit accepts either an OAuth token pair or, for legacy accounts, an API key
//! and secret. Both are one [`Credential`] so request code has a single path.

use crate::adapters::database::traits::{
    StateStorage, SETTING_ACCESS_TOKEN, SETTING_REFRESH_TOKEN,
};
use crate::config::schema::{KitAuthType, KitConfig};
use crate::config::{secret_string, SecretString};
use crate::domain::{KitSyncError, Result};
use secrecy::ExposeSecret;

/// Authentication material for Kit requests
#[derive(Debug, Clone)]
pub enum Credential {
    /// Bearer token pair; the only variant that can be refreshed
    OAuth {
        client_id: String,
        access_token: SecretString,
        refresh_token: SecretString,
    },
    /// Legacy key and secret, sent as `api_key` / `api_secret` query parameters
    ApiKey {
        api_key: SecretString,
        api_secret: Option<SecretString>,
    },
}

impl Credential {
    /// Builds the credential described by the `[kit]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the selected mode is missing a value
    pub fn from_config(config: &KitConfig) -> Result<Self> {
        let missing =
            |field: &str| KitSyncError::Configuration(format!("kit.{field} is required"));

        match config.auth_type {
            KitAuthType::OAuth => Ok(Credential::OAuth {
                client_id: config.client_id.clone().ok_or_else(|| missing("client_id"))?,
                access_token: config
                    .access_token
                    .clone()
                    .ok_or_else(|| missing("access_token"))?,
                refresh_token: config
                    .refresh_token
                    .clone()
                    .ok_or_else(|| missing("refresh_token"))?,
            }),
            KitAuthType::ApiKey => Ok(Credential::ApiKey {
                api_key: config.api_key.clone().ok_or_else(|| missing("api_key"))?,
                api_secret: config.api_secret.clone(),
            }),
        }
    }

    /// Replaces configured OAuth tokens with the ones saved by a previous refresh
    ///
    /// Refresh tokens are single-use, so once a refresh happened the configured
    /// pair is stale and only the stored pair is valid.
    pub async fn with_stored_tokens(self, storage: &dyn StateStorage) -> Result<Self> {
        match self {
            Credential::OAuth {
                client_id,
                access_token,
                refresh_token,
            } => {
                let stored_access = storage.load_setting(SETTING_ACCESS_TOKEN).await?;
                let stored_refresh = storage.load_setting(SETTING_REFRESH_TOKEN).await?;

                match (stored_access, stored_refresh) {
                    (Some(access), Some(refresh)) => {
                        tracing::debug!("Using Kit tokens saved by a previous refresh");
                        Ok(Credential::OAuth {
                            client_id,
                            access_token: secret_string(access),
                            refresh_token: secret_string(refresh),
                        })
                    }
                    _ => Ok(Credential::OAuth {
                        client_id,
                        access_token,
                        refresh_token,
                    }),
                }
            }
            api_key => Ok(api_key),
        }
    }

    pub fn can_refresh(&self) -> bool {
        matches!(self, Credential::OAuth { .. })
    }

    /// Value of the `Authorization` header, if this credential uses one
    pub fn bearer(&self) -> Option<String> {
        match self {
            Credential::OAuth { access_token, .. } => Some(format!(
                "Bearer {}",
                access_token.expose_secret().as_ref()
            )),
            Credential::ApiKey { .. } => None,
        }
    }

    /// Query parameters carrying the credential, if this credential uses them
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Credential::OAuth { .. } => Vec::new(),
            Credential::ApiKey {
                api_key,
                api_secret,
            } => {
                let mut params = vec![("api_key", api_key.expose_secret().as_ref().to_string())];
                if let Some(secret) = api_secret {
                    params.push(("api_secret", secret.expose_secret().as_ref().to_string()));
                }
                params
            }
        }
    }
}
