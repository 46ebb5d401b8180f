//! Order to Kit subscriber mapping

use crate::adapters::kit::SubscriberRequest;
use crate::config::schema::{CustomFieldMapping, NameFormat};
use crate::domain::order::Order;

/// Subscriber name for the configured format; `None` when blank
pub fn subscriber_name(order: &Order, format: NameFormat) -> Option<String> {
    let name = match format {
        NameFormat::First => order.customer.first_name.trim().to_string(),
        NameFormat::Last => order.customer.last_name.trim().to_string(),
        NameFormat::Both => order.customer.full_name(),
    };
    (!name.is_empty()).then_some(name)
}

/// Builds the subscriber upsert for an order's billing email
///
/// Only mapped custom fields with a non-blank value are included.
pub fn build_subscriber(
    order: &Order,
    email: &str,
    format: NameFormat,
    mapping: &CustomFieldMapping,
) -> SubscriberRequest {
    let mut request = SubscriberRequest::new(email);
    request.first_name = subscriber_name(order, format);

    let values = [
        (&mapping.phone, order.customer.phone.as_deref()),
        (&mapping.billing_address, order.billing_address.as_deref()),
        (&mapping.shipping_address, order.shipping_address.as_deref()),
        (&mapping.payment_method, order.payment_method.as_deref()),
        (&mapping.customer_note, order.customer_note.as_deref()),
    ];

    for (key, value) in values {
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };
        let value = value.trim();
        if !key.trim().is_empty() && !value.is_empty() {
            request.fields.insert(key.clone(), value.to_string());
        }
    }

    request
}
