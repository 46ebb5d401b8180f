//! Kit API request and response bodies

use crate::domain::ids::ResourceId;
use crate::domain::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Kit account details from `GET /account`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub account: AccountInfo,
    pub user: AccountUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountUser {
    pub email: String,
}

/// Cursor pagination block of list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One entry of a forms/tags/sequences/custom_fields list
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRow {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl ResourceRow {
    /// Converts to a domain resource; custom fields carry a label instead of a name
    pub fn into_resource(self) -> Result<Resource, String> {
        let name = self
            .name
            .or(self.label)
            .unwrap_or_else(|| format!("#{}", self.id));
        Ok(Resource {
            id: ResourceId::new(self.id)?,
            name,
            key: self.key,
        })
    }
}

/// Body of `POST /subscribers`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberRequest {
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub state: &'static str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl SubscriberRequest {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            first_name: None,
            state: "active",
            fields: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriberEnvelope {
    pub subscriber: IdOnly,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub id: u64,
}

/// Body of the add-to-form/tag/sequence endpoints
#[derive(Debug, Serialize)]
pub(crate) struct EmailBody<'a> {
    pub email_address: &'a str,
}

/// One purchased product of a purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseProduct {
    /// Product id in the store
    pub pid: u64,
    /// Line item id in the store
    pub lid: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Body of `POST /purchases`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRequest {
    pub transaction_id: String,
    pub email_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub currency: String,
    /// RFC 3339, UTC
    pub transaction_time: String,
    pub status: &'static str,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub discount: f64,
    pub total: f64,
    pub products: Vec<PurchaseProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchaseEnvelope {
    pub purchase: IdOnly,
}

/// Response of the OAuth token endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Body of the OAuth refresh grant
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub client_id: &'a str,
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

/// Extracts the error message from a Kit error body
///
/// Kit v4 answers `{"errors": ["..."]}`; the OAuth endpoints and v3 answer
/// `{"error": "...", "message": "..."}`.
pub fn error_message(body: &Value) -> Option<String> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let messages: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
        if !messages.is_empty() {
            return Some(messages.join("; "));
        }
    }

    match (
        body.get("error").and_then(Value::as_str),
        body.get("message").and_then(Value::as_str),
    ) {
        (Some(error), Some(message)) => Some(format!("{error}: {message}")),
        (Some(error), None) => Some(error.to_string()),
        (None, Some(message)) => Some(message.to_string()),
        (None, None) => body
            .get("error_description")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
