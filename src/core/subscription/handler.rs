//! Order status change handling
//!
//! Applies the integration rules when an order changes status: subscribe the
//! customer to every configured form, tag or sequence, then forward the
//! purchase data.

use super::subscriber::build_subscriber;
use crate::adapters::kit::KitApi;
use crate::adapters::woocommerce::OrderStore;
use crate::config::schema::IntegrationConfig;
use crate::core::purchase::{PurchaseSender, SendOutcome};
use crate::core::resources::ResourceCache;
use crate::domain::ids::OrderId;
use crate::domain::order::Order;
use crate::domain::subscription::Subscription;
use crate::domain::Result;
use std::sync::Arc;

/// What handling one status change did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub order_id: OrderId,
    /// Resources the customer was added to
    pub subscribed: Vec<Subscription>,
    /// Per-resource failures; the remaining resources were still attempted
    pub subscribe_errors: Vec<String>,
    /// Set when purchase data was considered
    pub purchase: Option<SendOutcome>,
    /// Why a step was skipped
    pub skipped: Vec<String>,
}

impl EventReport {
    fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            subscribed: Vec::new(),
            subscribe_errors: Vec::new(),
            purchase: None,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(order_id = %self.order_id, reason = %reason, "Skipped");
        self.skipped.push(reason);
    }

    pub fn is_successful(&self) -> bool {
        self.subscribe_errors.is_empty()
    }
}

fn label(subscription: Subscription) -> &'static str {
    match subscription {
        Subscription::Form(_) => "Form",
        Subscription::Tag(_) => "Tag",
        Subscription::Sequence(_) => "Sequence",
    }
}

/// `wc-processing` and `Processing` both mean `processing`
fn normalize_status(status: &str) -> String {
    let status = status.trim().to_ascii_lowercase();
    status
        .strip_prefix("wc-")
        .map(str::to_string)
        .unwrap_or(status)
}

pub struct OrderEventHandler {
    config: IntegrationConfig,
    store: Arc<dyn OrderStore>,
    kit: Arc<dyn KitApi>,
    resources: Arc<ResourceCache>,
    purchases: Arc<PurchaseSender>,
    dry_run: bool,
}

impl OrderEventHandler {
    pub fn new(
        config: IntegrationConfig,
        store: Arc<dyn OrderStore>,
        kit: Arc<dyn KitApi>,
        resources: Arc<ResourceCache>,
        purchases: Arc<PurchaseSender>,
    ) -> Self {
        Self {
            config,
            store,
            kit,
            resources,
            purchases,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Applies the integration rules for `order_id` entering `new_status`
    ///
    /// Does nothing when the integration is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be loaded, the subscriber cannot
    /// be created, or the purchase cannot be sent. Failing to add the
    /// subscriber to one resource is recorded in the report instead.
    pub async fn handle(&self, order_id: OrderId, new_status: &str) -> Result<EventReport> {
        let mut report = EventReport::new(order_id);

        if !self.config.enabled {
            report.skip("integration is disabled");
            return Ok(report);
        }

        let status = normalize_status(new_status);
        let subscribes = status == self.config.event;
        let sends_purchase =
            self.config.send_purchases && status == self.config.send_purchases_event;

        if !subscribes && !sends_purchase {
            report.skip(format!("no rule for status '{status}'"));
            return Ok(report);
        }

        let order = self.store.get_order(order_id).await?;

        if subscribes {
            self.subscribe(&order, &mut report).await?;
        }

        if sends_purchase {
            report.purchase = Some(self.purchases.send_order(&order).await?);
        }

        Ok(report)
    }

    async fn subscribe(&self, order: &Order, report: &mut EventReport) -> Result<()> {
        if self.config.display_opt_in && order.opted_in != Some(true) {
            report.skip("customer did not opt in");
            return Ok(());
        }

        let Some(email) = order.email() else {
            report.skip("order has no billing email address");
            return Ok(());
        };

        let (subscriptions, lookup_errors) = self.collect_subscriptions(order).await;
        if !self.dry_run {
            for error in &lookup_errors {
                self.note(order.id, &format!("[Kit] Subscribe Error: {error}"))
                    .await;
            }
        }
        report.subscribe_errors.extend(lookup_errors);

        if subscriptions.is_empty() {
            report.skip("no subscription configured for this order");
            return Ok(());
        }

        if self.dry_run {
            let names: Vec<String> = subscriptions.iter().map(ToString::to_string).collect();
            report.skip(format!("dry run: would subscribe to {}", names.join(", ")));
            return Ok(());
        }

        let subscriber = build_subscriber(
            order,
            email,
            self.config.name_format,
            &self.config.custom_fields,
        );
        let subscriber_id = self.kit.upsert_subscriber(&subscriber).await?;
        tracing::debug!(order_id = %order.id, subscriber_id = subscriber_id, "Subscriber upserted");

        for subscription in subscriptions {
            let resource_name = match self.resources.resolve(subscription).await {
                Ok(Some(resource)) => resource.name,
                Ok(None) => {
                    let error = format!("{subscription}: no such {} in Kit", label(subscription));
                    self.note(order.id, &format!("[Kit] Subscribe Error: {error}"))
                        .await;
                    report.subscribe_errors.push(error);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not resolve resource name");
                    format!("#{}", subscription.resource_id())
                }
            };

            match self.kit.subscribe(subscription, email).await {
                Ok(()) => {
                    self.note(
                        order.id,
                        &format!(
                            "[Kit] Customer subscribed to the {}: {} [{}]",
                            label(subscription),
                            resource_name,
                            subscription.resource_id()
                        ),
                    )
                    .await;
                    report.subscribed.push(subscription);
                }
                Err(e) => {
                    self.note(order.id, &format!("[Kit] Subscribe Error: {e}"))
                        .await;
                    report.subscribe_errors.push(format!("{subscription}: {e}"));
                }
            }
        }

        Ok(())
    }

    /// Integration default, then product, then coupon subscriptions, without
    /// duplicates, along with the lookups that failed
    async fn collect_subscriptions(&self, order: &Order) -> (Vec<Subscription>, Vec<String>) {
        let mut errors = Vec::new();
        let mut subscriptions: Vec<Subscription> =
            self.config.default_subscription().into_iter().collect();
        let mut push = |subscription: Subscription| {
            if !subscriptions.contains(&subscription) {
                subscriptions.push(subscription);
            }
        };

        for product_id in order.line_items.iter().filter_map(|item| item.product_id) {
            match self.store.product_subscription(product_id).await {
                Ok(Some(subscription)) => push(subscription),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        product_id = %product_id,
                        error = %e,
                        "Product subscription lookup failed"
                    );
                    errors.push(format!("Product #{product_id}: {e}"));
                }
            }
        }

        for code in &order.coupon_codes {
            match self.store.coupon_subscription(code).await {
                Ok(Some(subscription)) => push(subscription),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(coupon = %code, error = %e, "Coupon subscription lookup failed");
                    errors.push(format!("Coupon {code}: {e}"));
                }
            }
        }

        (subscriptions, errors)
    }

    async fn note(&self, order_id: OrderId, note: &str) {
        if let Err(e) = self.store.add_order_note(order_id, note).await {
            tracing::warn!(order_id = %order_id, error = %e, "Failed to add order note");
        }
    }
}
