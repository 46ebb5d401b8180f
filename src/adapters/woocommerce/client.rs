//! WooCommerce REST API client
//!
//! Talks to `/wp-json/wc/v3` with consumer key/secret Basic authentication.

use super::models::{
    meta_subscription, MetaUpdate, NoteRequest, WcCoupon, WcOrder, WcProduct, WpError,
};
use super::store::{ListedOrder, OrderStore, UnreadableOrder, MAX_PAGE_SIZE};
use crate::config::schema::StoreConfig;
use crate::domain::ids::{OrderId, ProductId};
use crate::domain::order::{Order, SentMarker};
use crate::domain::subscription::Subscription;
use crate::domain::{KitSyncError, Result, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_PREFIX: &str = "wp-json/wc/v3";

/// Header carrying the collection size
const TOTAL_HEADER: &str = "x-wp-total";

/// WooCommerce REST API client
pub struct WooCommerceClient {
    api_url: String,
    site_url: String,
    client: Client,
    auth_header: String,
}

impl WooCommerceClient {
    /// Create a new WooCommerce client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("kitsync/{}", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for the store");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            KitSyncError::Configuration(format!("Failed to build store HTTP client: {e}"))
        })?;

        let credentials = format!(
            "{}:{}",
            config.consumer_key,
            config.consumer_secret.expose_secret().as_ref()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

        let site_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            api_url: format!("{site_url}/{API_PREFIX}"),
            site_url,
            client,
            auth_header: format!("Basic {encoded}"),
        })
    }

    /// Site URL without a trailing slash
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/{path}", self.api_url))
            .header(AUTHORIZATION, &self.auth_header)
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Response, StoreError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(e.to_string())
            } else {
                StoreError::ConnectionFailed(e.to_string())
            }
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(self.send(request).await?).await?;
        response
            .json()
            .await
            .map_err(|e| KitSyncError::from(StoreError::InvalidResponse(e.to_string())))
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<WpError>(&text) {
        Ok(err) if !err.message.is_empty() => format!("{} ({})", err.message, err.code),
        _ => text.trim().chars().take(300).collect(),
    };

    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

fn not_found_as(err: KitSyncError, missing: StoreError) -> KitSyncError {
    match err {
        KitSyncError::Store(StoreError::Api { status: 404, .. }) => missing.into(),
        other => other,
    }
}

#[async_trait]
impl OrderStore for WooCommerceClient {
    async fn list_orders(&self, offset: u64, limit: u32) -> Result<Vec<ListedOrder>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let request = self.get("orders").query(&[
            ("offset", offset.to_string()),
            ("per_page", limit.to_string()),
            ("orderby", "id".to_string()),
            ("order", "asc".to_string()),
        ]);

        let orders: Vec<WcOrder> = self.fetch(request).await?;
        Ok(orders
            .into_iter()
            .map(|o| {
                let id = o.id;
                o.into_order().map_err(|reason| {
                    tracing::warn!(order_id = id, reason = %reason, "Unreadable order in listing");
                    UnreadableOrder { id, reason }
                })
            })
            .collect())
    }

    async fn count_orders(&self) -> Result<u64> {
        let request = self.get("orders").query(&[("per_page", "1")]);
        let response = check_status(self.send(request).await?).await?;

        let total = response
            .headers()
            .get(TOTAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                StoreError::InvalidResponse(format!("missing or invalid {TOTAL_HEADER} header"))
            })?;

        tracing::debug!(total = total, "Counted store orders");
        Ok(total)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        let order: WcOrder = self
            .fetch(self.get(&format!("orders/{order_id}")))
            .await
            .map_err(|e| not_found_as(e, StoreError::OrderNotFound(order_id.value())))?;

        order
            .into_order()
            .map_err(|e| KitSyncError::from(StoreError::InvalidResponse(e)))
    }

    async fn save_sent_marker(&self, marker: &SentMarker) -> Result<()> {
        let request = self
            .client
            .put(format!("{}/orders/{}", self.api_url, marker.order_id))
            .header(AUTHORIZATION, &self.auth_header)
            .json(&MetaUpdate::sent_marker(marker));

        check_status(self.send(request).await?)
            .await
            .map_err(|e| match e {
                StoreError::Api { status: 404, .. } => {
                    StoreError::OrderNotFound(marker.order_id.value())
                }
                other => other,
            })?;
        Ok(())
    }

    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<()> {
        let request = self
            .client
            .post(format!("{}/orders/{order_id}/notes", self.api_url))
            .header(AUTHORIZATION, &self.auth_header)
            .json(&NoteRequest { note });

        check_status(self.send(request).await?).await?;
        Ok(())
    }

    async fn product_subscription(&self, product_id: ProductId) -> Result<Option<Subscription>> {
        let product: WcProduct = self
            .fetch(self.get(&format!("products/{product_id}")))
            .await
            .map_err(|e| not_found_as(e, StoreError::ProductNotFound(product_id.value())))?;

        meta_subscription(&product.meta_data).map_err(|e| {
            KitSyncError::Validation(format!("product #{product_id} subscription: {e}"))
        })
    }

    async fn coupon_subscription(&self, code: &str) -> Result<Option<Subscription>> {
        let coupons: Vec<WcCoupon> = self
            .fetch(self.get("coupons").query(&[("code", code)]))
            .await?;

        match coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
        {
            Some(coupon) => meta_subscription(&coupon.meta_data).map_err(|e| {
                KitSyncError::Validation(format!("coupon '{code}' subscription: {e}"))
            }),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for WooCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
