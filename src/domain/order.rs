//! Order domain model
//!
//! A store order as kitsync sees it: the customer, the purchased line items,
//! the money totals and the purchase-data sent-marker.

use super::ids::{OrderId, ProductId, PurchaseId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records that an order's purchase data reached Kit
///
/// Persisted with the order itself, so it survives work-queue rebuilds and is
/// the idempotency guard against sending the same order twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMarker {
    /// Order the marker belongs to
    pub order_id: OrderId,

    /// Kit purchase id, when the API returned one
    pub purchase_id: Option<PurchaseId>,
}

impl SentMarker {
    /// Creates a marker for a successful send
    pub fn new(order_id: OrderId, purchase_id: Option<PurchaseId>) -> Self {
        Self {
            order_id,
            purchase_id,
        }
    }
}

/// Customer details taken from the order's billing data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    /// First and last name joined with a space, skipping blanks
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A purchased line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item id, unique within the store
    pub id: u64,

    /// Product the line refers to; deleted products have none
    pub product_id: Option<ProductId>,

    pub name: String,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,

    /// Line subtotal before discounts
    pub subtotal: f64,
}

/// Money totals of an order, in the order currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub tax: f64,
    pub shipping: f64,
    pub discount: f64,
    pub total: f64,
}

/// A WooCommerce order
///
/// # Examples
///
/// ```
/// use kitsync::domain::order::{Customer, OrderBuilder};
/// use kitsync::domain::ids::OrderId;
/// use chrono::Utc;
///
/// let order = OrderBuilder::new(OrderId::new(1042).unwrap())
///     .status("processing")
///     .created_at(Utc::now())
///     .customer(Customer {
///         first_name: "Ada".to_string(),
///         email: Some("ada@example.com".to_string()),
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
///
/// assert!(!order.is_sent());
/// assert_eq!(order.email(), Some("ada@example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub customer: Customer,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub customer_note: Option<String>,
    pub line_items: Vec<LineItem>,
    pub coupon_codes: Vec<String>,
    pub totals: OrderTotals,

    /// Customer's answer to the opt-in checkbox, if it was shown
    pub opted_in: Option<bool>,

    /// Present once purchase data was sent
    pub sent_marker: Option<SentMarker>,
}

impl Order {
    /// Whether purchase data was already sent for this order
    pub fn is_sent(&self) -> bool {
        self.sent_marker.is_some()
    }

    /// Billing email, ignoring blank values
    pub fn email(&self) -> Option<&str> {
        self.customer
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Sum of line subtotals
    pub fn subtotal(&self) -> f64 {
        self.line_items.iter().map(|item| item.subtotal).sum()
    }
}

/// Builder for constructing Order instances
#[derive(Debug)]
pub struct OrderBuilder {
    id: OrderId,
    status: Option<String>,
    currency: String,
    created_at: Option<DateTime<Utc>>,
    customer: Customer,
    billing_address: Option<String>,
    shipping_address: Option<String>,
    payment_method: Option<String>,
    customer_note: Option<String>,
    line_items: Vec<LineItem>,
    coupon_codes: Vec<String>,
    totals: OrderTotals,
    opted_in: Option<bool>,
    sent_marker: Option<SentMarker>,
}

impl OrderBuilder {
    /// Creates a new OrderBuilder
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            status: None,
            currency: "USD".to_string(),
            created_at: None,
            customer: Customer::default(),
            billing_address: None,
            shipping_address: None,
            payment_method: None,
            customer_note: None,
            line_items: Vec::new(),
            coupon_codes: Vec::new(),
            totals: OrderTotals::default(),
            opted_in: None,
            sent_marker: None,
        }
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = customer;
        self
    }

    pub fn billing_address(mut self, address: impl Into<String>) -> Self {
        self.billing_address = Some(address.into());
        self
    }

    pub fn shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn customer_note(mut self, note: impl Into<String>) -> Self {
        self.customer_note = Some(note.into());
        self
    }

    pub fn line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn coupon_code(mut self, code: impl Into<String>) -> Self {
        self.coupon_codes.push(code.into());
        self
    }

    pub fn totals(mut self, totals: OrderTotals) -> Self {
        self.totals = totals;
        self
    }

    pub fn opted_in(mut self, opted_in: bool) -> Self {
        self.opted_in = Some(opted_in);
        self
    }

    pub fn sent_marker(mut self, marker: SentMarker) -> Self {
        self.sent_marker = Some(marker);
        self
    }

    /// Builds the Order
    ///
    /// # Errors
    ///
    /// Returns an error if the status or creation time is missing, or if the
    /// sent-marker belongs to a different order
    pub fn build(self) -> Result<Order, String> {
        if let Some(marker) = &self.sent_marker {
            if marker.order_id != self.id {
                return Err(format!(
                    "sent marker for order #{} attached to order #{}",
                    marker.order_id, self.id
                ));
            }
        }

        Ok(Order {
            id: self.id,
            status: self.status.ok_or("status is required")?,
            currency: self.currency,
            created_at: self.created_at.ok_or("created_at is required")?,
            customer: self.customer,
            billing_address: self.billing_address,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            customer_note: self.customer_note,
            line_items: self.line_items,
            coupon_codes: self.coupon_codes,
            totals: self.totals,
            opted_in: self.opted_in,
            sent_marker: self.sent_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_id(id: u64) -> OrderId {
        OrderId::new(id).unwrap()
    }

    fn line(id: u64, subtotal: f64) -> LineItem {
        LineItem {
            id,
            product_id: ProductId::new(id * 10).ok(),
            name: format!("Product {id}"),
            sku: None,
            quantity: 1,
            unit_price: subtotal,
            subtotal,
        }
    }

    #[test]
    fn test_builder_requires_status() {
        let result = OrderBuilder::new(order_id(1)).created_at(Utc::now()).build();
        assert_eq!(result.unwrap_err(), "status is required");
    }

    #[test]
    fn test_builder_rejects_foreign_marker() {
        let result = OrderBuilder::new(order_id(1))
            .status("completed")
            .created_at(Utc::now())
            .sent_marker(SentMarker::new(order_id(2), None))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_subtotal_sums_line_items() {
        let order = OrderBuilder::new(order_id(5))
            .status("completed")
            .created_at(Utc::now())
            .line_item(line(1, 10.0))
            .line_item(line(2, 2.5))
            .build()
            .unwrap();

        assert!((order.subtotal() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_email_is_none() {
        let order = OrderBuilder::new(order_id(5))
            .status("completed")
            .created_at(Utc::now())
            .customer(Customer {
                email: Some("   ".to_string()),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(order.email(), None);
    }

    #[test]
    fn test_full_name_skips_blanks() {
        let customer = Customer {
            first_name: "Ada".to_string(),
            last_name: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(customer.full_name(), "Ada");

        let customer = Customer {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        };
        assert_eq!(customer.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_full_name_of_generated_customers() {
        use fake::faker::internet::en::SafeEmail;
        use fake::faker::name::en::{FirstName, LastName};
        use fake::Fake;

        for _ in 0..20 {
            let customer = Customer {
                first_name: FirstName().fake(),
                last_name: LastName().fake(),
                email: Some(SafeEmail().fake()),
                phone: None,
            };
            assert_eq!(
                customer.full_name(),
                format!("{} {}", customer.first_name.trim(), customer.last_name.trim())
            );
        }
    }
}
