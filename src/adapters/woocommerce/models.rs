//! WooCommerce REST API bodies and their mapping onto domain types
//!
//! WooCommerce sends money as decimal strings (`"12.50"`) in most places and
//! as numbers in a few (`line_items[].price`); [`Money`] accepts both.

use crate::domain::ids::{OrderId, ProductId, PurchaseId};
use crate::domain::order::{Customer, LineItem, Order, OrderBuilder, OrderTotals, SentMarker};
use crate::domain::subscription::Subscription;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order meta key marking purchase data as sent
pub const META_PURCHASE_SENT: &str = "ckwc_purchase_data_sent";

/// Order meta key holding the Kit purchase id
pub const META_PURCHASE_ID: &str = "ckwc_purchase_data_id";

/// Order meta key holding the opt-in checkbox answer
pub const META_OPT_IN: &str = "ckwc_opt_in";

/// Product and coupon meta key holding a subscription selector
pub const META_SUBSCRIPTION: &str = "ckwc_subscription";

const WC_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Decimal amount sent either as a string or a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Money {
    Text(String),
    Number(f64),
}

impl Money {
    pub fn amount(&self) -> Result<f64, String> {
        match self {
            Money::Number(n) => Ok(*n),
            Money::Text(s) if s.trim().is_empty() => Ok(0.0),
            Money::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("invalid amount '{s}'")),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::Number(0.0)
    }
}

/// One `meta_data` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaData {
    pub key: String,
    pub value: Value,
}

impl MetaData {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: Value::String(value.into()),
        }
    }

    /// The value as text; numbers are rendered, other JSON types are ignored
    pub fn text(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Finds the last value stored under `key`
///
/// WordPress allows repeated meta keys; the newest entry wins.
pub fn meta_value(meta: &[MetaData], key: &str) -> Option<String> {
    meta.iter().rev().find(|m| m.key == key).and_then(MetaData::text)
}

/// Parses a `ckwc_subscription` meta value; blank means "none"
pub fn meta_subscription(meta: &[MetaData]) -> Result<Option<Subscription>, String> {
    match meta_value(meta, META_SUBSCRIPTION) {
        Some(value) => Subscription::parse_optional(&value),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WcAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl WcAddress {
    /// Single-line postal address, or `None` when every part is blank
    pub fn formatted(&self) -> Option<String> {
        let region = [self.state.trim(), self.postcode.trim()]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        let parts: Vec<&str> = [
            self.company.trim(),
            self.address_1.trim(),
            self.address_2.trim(),
            self.city.trim(),
            region.as_str(),
            self.country.trim(),
        ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcLineItem {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_id: u64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcCouponLine {
    pub code: String,
}

/// Order as returned by `GET /orders` and `GET /orders/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct WcOrder {
    pub id: u64,
    pub status: String,
    #[serde(default)]
    pub currency: String,
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub billing: WcAddress,
    #[serde(default)]
    pub shipping: WcAddress,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub customer_note: String,
    #[serde(default)]
    pub line_items: Vec<WcLineItem>,
    #[serde(default)]
    pub coupon_lines: Vec<WcCouponLine>,
    #[serde(default)]
    pub total_tax: Money,
    #[serde(default)]
    pub shipping_total: Money,
    #[serde(default)]
    pub discount_total: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_gmt(value: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), WC_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid date '{value}': {e}"))
}

impl WcOrder {
    /// Maps the wire order onto the domain [`Order`]
    pub fn into_order(self) -> Result<Order, String> {
        let id = OrderId::new(self.id)?;

        let created_at = match self.date_created_gmt.as_deref() {
            Some(date) if !date.is_empty() => parse_gmt(date)?,
            _ => return Err(format!("order {} has no creation date", self.id)),
        };

        let sent_marker = match meta_value(&self.meta_data, META_PURCHASE_SENT).as_deref() {
            Some("yes") => {
                let purchase_id = meta_value(&self.meta_data, META_PURCHASE_ID)
                    .and_then(|v| v.parse::<PurchaseId>().ok());
                Some(SentMarker::new(id, purchase_id))
            }
            _ => None,
        };

        let opted_in = meta_value(&self.meta_data, META_OPT_IN).map(|v| v == "yes");

        let mut builder = OrderBuilder::new(id)
            .status(self.status)
            .created_at(created_at)
            .customer(Customer {
                first_name: self.billing.first_name.trim().to_string(),
                last_name: self.billing.last_name.trim().to_string(),
                email: self.billing.email.as_deref().and_then(non_blank),
                phone: self.billing.phone.as_deref().and_then(non_blank),
            })
            .totals(OrderTotals {
                tax: self.total_tax.amount()?,
                shipping: self.shipping_total.amount()?,
                discount: self.discount_total.amount()?,
                total: self.total.amount()?,
            });

        if let Some(currency) = non_blank(&self.currency) {
            builder = builder.currency(currency);
        }
        if let Some(address) = self.billing.formatted() {
            builder = builder.billing_address(address);
        }
        if let Some(address) = self.shipping.formatted() {
            builder = builder.shipping_address(address);
        }
        if let Some(method) = non_blank(&self.payment_method_title) {
            builder = builder.payment_method(method);
        }
        if let Some(note) = non_blank(&self.customer_note) {
            builder = builder.customer_note(note);
        }
        if let Some(opted_in) = opted_in {
            builder = builder.opted_in(opted_in);
        }
        if let Some(marker) = sent_marker {
            builder = builder.sent_marker(marker);
        }

        for coupon in self.coupon_lines {
            builder = builder.coupon_code(coupon.code);
        }

        for item in self.line_items {
            let subtotal = item.subtotal.amount()?;
            let unit_price = match item.quantity {
                0 => item.price.amount()?,
                quantity => subtotal / f64::from(quantity),
            };
            builder = builder.line_item(LineItem {
                id: item.id,
                product_id: ProductId::new(item.product_id).ok(),
                name: item.name,
                sku: item.sku.as_deref().and_then(non_blank),
                quantity: item.quantity,
                unit_price,
                subtotal,
            });
        }

        builder.build()
    }
}

/// Product as returned by `GET /products/{id}`; only the meta matters here
#[derive(Debug, Clone, Deserialize)]
pub struct WcProduct {
    pub id: u64,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

/// Coupon as returned by `GET /coupons?code=`
#[derive(Debug, Clone, Deserialize)]
pub struct WcCoupon {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

/// Body of `PUT /orders/{id}` writing the sent-marker
#[derive(Debug, Serialize)]
pub struct MetaUpdate {
    pub meta_data: Vec<MetaData>,
}

impl MetaUpdate {
    pub fn sent_marker(marker: &SentMarker) -> Self {
        let mut meta_data = vec![MetaData::new(META_PURCHASE_SENT, "yes")];
        if let Some(purchase_id) = marker.purchase_id {
            meta_data.push(MetaData::new(
                META_PURCHASE_ID,
                purchase_id.value().to_string(),
            ));
        }
        Self { meta_data }
    }
}

/// Body of `POST /orders/{id}/notes`
#[derive(Debug, Serialize)]
pub struct NoteRequest<'a> {
    pub note: &'a str,
}

/// Error body of the WordPress REST API
#[derive(Debug, Deserialize)]
pub struct WpError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
