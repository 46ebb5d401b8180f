//! Order to Kit purchase mapping

use crate::adapters::kit::models::{PurchaseProduct, PurchaseRequest};
use crate::domain::order::Order;
use crate::domain::{KitSyncError, Result};
use chrono::SecondsFormat;

/// Purchase status sent for every order
const PURCHASE_STATUS: &str = "paid";

/// Builds the Kit purchase for an order
///
/// Line items whose product was deleted have no product id and are left out.
///
/// # Errors
///
/// Returns [`KitSyncError::Precondition`] when the order has no billing email.
pub fn build_purchase(order: &Order) -> Result<PurchaseRequest> {
    let email = order.email().ok_or_else(|| {
        KitSyncError::Precondition(format!(
            "Order ID #{} has no billing email address",
            order.id
        ))
    })?;

    let products = order
        .line_items
        .iter()
        .filter_map(|item| {
            let Some(product_id) = item.product_id else {
                tracing::debug!(
                    order_id = %order.id,
                    line_item = item.id,
                    "Line item has no product, left out of purchase"
                );
                return None;
            };
            Some(PurchaseProduct {
                pid: product_id.value(),
                lid: item.id,
                name: item.name.clone(),
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
        })
        .collect();

    let first_name = Some(order.customer.first_name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(PurchaseRequest {
        transaction_id: order.id.to_string(),
        email_address: email.to_string(),
        first_name,
        currency: order.currency.clone(),
        transaction_time: order
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        status: PURCHASE_STATUS,
        subtotal: order.subtotal(),
        tax: order.totals.tax,
        shipping: order.totals.shipping,
        discount: order.totals.discount,
        total: order.totals.total,
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrderId, ProductId};
    use crate::domain::order::{Customer, LineItem, OrderBuilder, OrderTotals};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn order(email: Option<&str>) -> Order {
        OrderBuilder::new(OrderId::new(1042).unwrap())
            .status("processing")
            .currency("EUR")
            .created_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
            .customer(Customer {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: email.map(str::to_string),
                phone: None,
            })
            .line_item(LineItem {
                id: 7,
                product_id: ProductId::new(55).ok(),
                name: "Notebook".to_string(),
                sku: Some("NB-1".to_string()),
                quantity: 2,
                unit_price: 10.0,
                subtotal: 20.0,
            })
            .line_item(LineItem {
                id: 8,
                product_id: None,
                name: "Deleted product".to_string(),
                sku: None,
                quantity: 1,
                unit_price: 4.0,
                subtotal: 4.0,
            })
            .totals(OrderTotals {
                tax: 2.0,
                shipping: 5.0,
                discount: 3.0,
                total: 28.0,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_purchase_payload() {
        let purchase = build_purchase(&order(Some("ada@example.com"))).unwrap();

        assert_eq!(
            serde_json::to_value(&purchase).unwrap(),
            json!({
                "transaction_id": "1042",
                "email_address": "ada@example.com",
                "first_name": "Ada",
                "currency": "EUR",
                "transaction_time": "2024-03-01T09:30:00Z",
                "status": "paid",
                "subtotal": 24.0,
                "tax": 2.0,
                "shipping": 5.0,
                "discount": 3.0,
                "total": 28.0,
                "products": [
                    {"pid": 55, "lid": 7, "name": "Notebook", "sku": "NB-1",
                     "quantity": 2, "unit_price": 10.0}
                ]
            })
        );
    }

    #[test]
    fn test_missing_email_is_precondition_error() {
        let result = build_purchase(&order(Some("   ")));
        assert!(matches!(result, Err(KitSyncError::Precondition(_))));
    }
}
