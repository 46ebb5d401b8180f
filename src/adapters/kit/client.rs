//! Kit HTTP client
//!
//! Implements [`KitApi`] over the Kit v4 REST API.
//!
//! # Token refresh
//!
//! With OAuth credentials a `401` answer triggers exactly one refresh-token
//! exchange followed by exactly one retry of the original request. A second
//! `401` is returned to the caller as [`KitApiError::Unauthorized`]. Refreshed
//! tokens replace the in-memory pair and are written to the state storage
//! immediately, so the next run starts with the new pair.

use super::api::KitApi;
use super::credentials::Credential;
use super::models::{
    error_message, Account, EmailBody, Pagination, PurchaseEnvelope, PurchaseRequest,
    RefreshRequest, ResourceRow, SubscriberEnvelope, SubscriberRequest, TokenResponse,
};
use crate::adapters::database::traits::{
    StateStorage, SETTING_ACCESS_TOKEN, SETTING_REFRESH_TOKEN,
};
use crate::config::schema::KitConfig;
use crate::config::secret_string;
use crate::domain::ids::{PurchaseId, ResourceId};
use crate::domain::resource::{Resource, ResourceKind};
use crate::domain::{KitApiError, KitSyncError, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Page size requested from the resource list endpoints
const RESOURCE_PAGE_SIZE: u32 = 1000;

/// Longest response excerpt quoted in error messages
const MAX_ERROR_BODY: usize = 300;

/// Builds the `User-Agent` sent with every Kit request
///
/// # Example
///
/// ```
/// use kitsync::adapters::kit::client::user_agent;
///
/// let ua = user_agent("https://shop.example.com");
/// assert!(ua.starts_with("kitsync/"));
/// assert!(ua.ends_with("; https://shop.example.com"));
/// ```
pub fn user_agent(site_url: &str) -> String {
    format!("kitsync/{}; {}", env!("CARGO_PKG_VERSION"), site_url)
}

/// HTTP client for the Kit API
pub struct KitClient {
    base_url: String,
    token_url: String,
    client: Client,
    credential: Mutex<Credential>,
    storage: Option<Arc<dyn StateStorage>>,
}

impl KitClient {
    /// Create a new Kit client
    ///
    /// # Arguments
    ///
    /// * `config` - `[kit]` configuration section
    /// * `credential` - credential to authenticate with
    /// * `site_url` - store URL reported in the user agent
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &KitConfig, credential: Credential, site_url: &str) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(user_agent(site_url))
            .build()
            .map_err(|e| {
                KitSyncError::Configuration(format!("Failed to build Kit HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_url: config.oauth_token_url.clone(),
            client,
            credential: Mutex::new(credential),
            storage: None,
        })
    }

    /// Persist refreshed tokens to `storage`
    pub fn with_storage(mut self, storage: Arc<dyn StateStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Current credential, for status output and tests
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> std::result::Result<Response, KitApiError> {
        let credential = self.credential.lock().await.clone();

        let mut request = self
            .client
            .request(method, self.url(path))
            .query(query)
            .query(&credential.query_params());

        if let Some(bearer) = credential.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(transport_error)
    }

    /// Sends a request, refreshing the access token once on `401`
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T> {
        let response = self
            .send_once(method.clone(), path, query, body.as_ref())
            .await?;

        let refreshable = self.credential.lock().await.can_refresh();
        let response = if response.status() == StatusCode::UNAUTHORIZED && refreshable {
            tracing::info!(path = %path, "Kit rejected the access token, refreshing");
            self.refresh_access_token().await?;
            self.send_once(method, path, query, body.as_ref()).await?
        } else {
            response
        };

        Ok(parse_response(response).await?)
    }

    /// Exchanges the refresh token for a new token pair
    async fn refresh_access_token(&self) -> std::result::Result<(), KitApiError> {
        let mut credential = self.credential.lock().await;

        let (client_id, refresh_token) = match &*credential {
            Credential::OAuth {
                client_id,
                refresh_token,
                ..
            } => (
                client_id.clone(),
                refresh_token.expose_secret().as_ref().to_string(),
            ),
            Credential::ApiKey { .. } => {
                return Err(KitApiError::Unauthorized(
                    "API key credentials cannot be refreshed".to_string(),
                ))
            }
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&RefreshRequest {
                client_id: &client_id,
                grant_type: "refresh_token",
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|e| KitApiError::TokenRefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| excerpt(&text));
            return Err(KitApiError::TokenRefreshFailed(format!(
                "token endpoint returned {status}: {message}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            KitApiError::TokenRefreshFailed(format!("invalid token response: {e}"))
        })?;

        let new_refresh = token.refresh_token.unwrap_or(refresh_token);
        *credential = Credential::OAuth {
            client_id,
            access_token: secret_string(token.access_token.clone()),
            refresh_token: secret_string(new_refresh.clone()),
        };
        drop(credential);

        tracing::info!(expires_in = ?token.expires_in, "Kit access token refreshed");
        self.persist_tokens(&token.access_token, &new_refresh).await;
        Ok(())
    }

    async fn persist_tokens(&self, access_token: &str, refresh_token: &str) {
        let Some(storage) = &self.storage else {
            tracing::warn!("No state storage attached; refreshed Kit tokens live only in memory");
            return;
        };

        let saved = async {
            storage
                .save_setting(SETTING_ACCESS_TOKEN, access_token)
                .await?;
            storage
                .save_setting(SETTING_REFRESH_TOKEN, refresh_token)
                .await
        }
        .await;

        if let Err(e) = saved {
            tracing::error!(error = %e, "Failed to persist refreshed Kit tokens");
        }
    }
}

fn transport_error(e: reqwest::Error) -> KitApiError {
    if e.is_timeout() {
        KitApiError::Timeout(e.to_string())
    } else {
        KitApiError::ConnectionFailed(e.to_string())
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

/// Maps a response onto a typed body or a [`KitApiError`]
async fn parse_response<T: DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, KitApiError> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    let body: Option<Value> = serde_json::from_str(&text).ok();
    let message = body
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| excerpt(&text));

    if status == StatusCode::UNAUTHORIZED {
        return Err(KitApiError::Unauthorized(message));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(KitApiError::RateLimitExceeded(message));
    }
    if !status.is_success() {
        return Err(KitApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = match body {
        Some(body) => body,
        // 204 and friends
        None if text.trim().is_empty() => Value::Null,
        None => {
            return Err(KitApiError::InvalidResponse(format!(
                "expected JSON, got: {}",
                excerpt(&text)
            )))
        }
    };

    let has_errors = body
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty());
    if has_errors {
        return Err(KitApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_value(body).map_err(|e| KitApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl KitApi for KitClient {
    async fn get_account(&self) -> Result<Account> {
        self.request(Method::GET, "account", &[], None).await
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("per_page", RESOURCE_PAGE_SIZE.to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page: Value = self.request(Method::GET, kind.as_str(), &query, None).await?;

            let rows = page.get(kind.as_str()).cloned().ok_or_else(|| {
                KitApiError::InvalidResponse(format!("response has no '{kind}' list"))
            })?;
            let rows: Vec<ResourceRow> = serde_json::from_value(rows)
                .map_err(|e| KitApiError::InvalidResponse(format!("malformed {kind}: {e}")))?;
            for row in rows {
                resources.push(row.into_resource().map_err(KitApiError::InvalidResponse)?);
            }

            let pagination: Pagination = match page.get("pagination") {
                Some(p) => serde_json::from_value(p.clone()).map_err(|e| {
                    KitApiError::InvalidResponse(format!("malformed pagination: {e}"))
                })?,
                None => Pagination::default(),
            };

            match pagination.end_cursor {
                Some(cursor) if pagination.has_next_page && after.as_ref() != Some(&cursor) => {
                    after = Some(cursor);
                }
                _ => break,
            }
        }

        tracing::debug!(kind = %kind, count = resources.len(), "Fetched Kit resources");
        Ok(resources)
    }

    async fn upsert_subscriber(&self, subscriber: &SubscriberRequest) -> Result<u64> {
        let body = serde_json::to_value(subscriber)?;
        let envelope: SubscriberEnvelope = self
            .request(Method::POST, "subscribers", &[], Some(body))
            .await?;
        Ok(envelope.subscriber.id)
    }

    async fn add_subscriber_to_form(&self, form_id: ResourceId, email: &str) -> Result<()> {
        self.add_to(ResourceKind::Forms, form_id, email).await
    }

    async fn add_subscriber_to_tag(&self, tag_id: ResourceId, email: &str) -> Result<()> {
        self.add_to(ResourceKind::Tags, tag_id, email).await
    }

    async fn add_subscriber_to_sequence(
        &self,
        sequence_id: ResourceId,
        email: &str,
    ) -> Result<()> {
        self.add_to(ResourceKind::Sequences, sequence_id, email)
            .await
    }

    async fn create_purchase(&self, purchase: &PurchaseRequest) -> Result<PurchaseId> {
        let body = serde_json::to_value(purchase)?;
        let envelope: PurchaseEnvelope = self
            .request(Method::POST, "purchases", &[], Some(body))
            .await?;
        Ok(PurchaseId::new(envelope.purchase.id))
    }
}

impl KitClient {
    async fn add_to(&self, kind: ResourceKind, id: ResourceId, email: &str) -> Result<()> {
        let body = serde_json::to_value(EmailBody {
            email_address: email,
        })?;
        let _: Value = self
            .request(Method::POST, &format!("{kind}/{id}/subscribers"), &[], Some(body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> KitClient {
        let config = KitConfig {
            base_url: base_url.to_string(),
            client_id: Some("client".to_string()),
            access_token: Some(secret_string("a".to_string())),
            refresh_token: Some(secret_string("r".to_string())),
            ..KitConfig::default()
        };
        let credential = Credential::from_config(&config).unwrap();
        KitClient::new(&config, credential, "https://shop.example.com").unwrap()
    }

    #[test]
    fn test_user_agent_format() {
        assert_eq!(
            user_agent("https://shop.example.com"),
            format!("kitsync/{}; https://shop.example.com", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_url_join() {
        let client = client("https://api.kit.com/v4/");
        assert_eq!(client.url("/forms"), "https://api.kit.com/v4/forms");
        assert_eq!(client.url("tags/1/subscribers"), "https://api.kit.com/v4/tags/1/subscribers");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  "), "empty response body");
        assert_eq!(excerpt(&"x".repeat(1000)).len(), MAX_ERROR_BODY);
    }
}
