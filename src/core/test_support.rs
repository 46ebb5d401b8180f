//! In-process doubles for the store, Kit and the order sender

use crate::adapters::kit::models::{Account, AccountInfo, AccountUser};
use crate::adapters::kit::{KitApi, PurchaseRequest, SubscriberRequest};
use crate::adapters::woocommerce::{ListedOrder, OrderStore, UnreadableOrder};
use crate::core::purchase::{OrderSender, SendOutcome};
use crate::domain::ids::{OrderId, ProductId, PurchaseId, ResourceId};
use crate::domain::order::{Customer, LineItem, Order, OrderBuilder, OrderTotals, SentMarker};
use crate::domain::resource::{Resource, ResourceKind};
use crate::domain::subscription::Subscription;
use crate::domain::{KitApiError, KitSyncError, Result, StoreError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn order_id(id: u64) -> OrderId {
    OrderId::new(id).unwrap()
}

pub(crate) fn resource(id: u64, name: &str) -> Resource {
    Resource {
        id: ResourceId::new(id).unwrap(),
        name: name.to_string(),
        key: None,
    }
}

/// Processing order with one line item of product `id * 10`
pub(crate) fn sample_order(id: u64, sent: bool) -> Order {
    let mut builder = OrderBuilder::new(order_id(id))
        .status("processing")
        .created_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
        .customer(Customer {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some(format!("customer{id}@example.com")),
            phone: Some("+44 20 7946 0000".to_string()),
        })
        .billing_address("12 Analytical Way, London")
        .line_item(LineItem {
            id: id * 100,
            product_id: ProductId::new(id * 10).ok(),
            name: "Notebook".to_string(),
            sku: None,
            quantity: 1,
            unit_price: 12.0,
            subtotal: 12.0,
        })
        .totals(OrderTotals {
            total: 12.0,
            ..Default::default()
        });
    if sent {
        builder = builder.sent_marker(SentMarker::new(order_id(id), Some(PurchaseId::new(1))));
    }
    builder.build().unwrap()
}

#[derive(Default)]
pub(crate) struct FakeStore {
    orders: Mutex<BTreeMap<OrderId, Order>>,
    notes: Mutex<Vec<(OrderId, String)>>,
    product_subscriptions: Mutex<HashMap<ProductId, Subscription>>,
    coupon_subscriptions: Mutex<HashMap<String, Subscription>>,
    unreadable: Mutex<HashSet<OrderId>>,
    failing_products: Mutex<HashSet<ProductId>>,
}

impl FakeStore {
    pub(crate) fn with_orders(ids: &[u64], sent: &[u64]) -> Self {
        let store = Self::default();
        for id in ids {
            store.insert(sample_order(*id, sent.contains(id)));
        }
        store
    }

    pub(crate) fn insert(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id, order);
    }

    pub(crate) fn order(&self, id: u64) -> Order {
        self.orders.lock().unwrap()[&order_id(id)].clone()
    }

    pub(crate) fn notes(&self, id: u64) -> Vec<String> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .filter(|(order, _)| *order == order_id(id))
            .map(|(_, note)| note.clone())
            .collect()
    }

    pub(crate) fn set_product_subscription(&self, product_id: u64, subscription: Subscription) {
        self.product_subscriptions
            .lock()
            .unwrap()
            .insert(ProductId::new(product_id).unwrap(), subscription);
    }

    pub(crate) fn set_coupon_subscription(&self, code: &str, subscription: Subscription) {
        self.coupon_subscriptions
            .lock()
            .unwrap()
            .insert(code.to_string(), subscription);
    }

    /// Lists the order as unmappable
    pub(crate) fn make_unreadable(&self, id: u64) {
        self.unreadable.lock().unwrap().insert(order_id(id));
    }

    /// Makes subscription lookups for the product fail
    pub(crate) fn fail_product_lookup(&self, product_id: u64) {
        self.failing_products
            .lock()
            .unwrap()
            .insert(ProductId::new(product_id).unwrap());
    }
}

#[async_trait]
impl OrderStore for FakeStore {
    async fn list_orders(&self, offset: u64, limit: u32) -> Result<Vec<ListedOrder>> {
        let unreadable = self.unreadable.lock().unwrap();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|order| {
                if unreadable.contains(&order.id) {
                    Err(UnreadableOrder {
                        id: order.id.value(),
                        reason: "invalid amount 'abc'".to_string(),
                    })
                } else {
                    Ok(order.clone())
                }
            })
            .collect())
    }

    async fn count_orders(&self) -> Result<u64> {
        Ok(self.orders.lock().unwrap().len() as u64)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound(order_id.value()).into())
    }

    async fn save_sent_marker(&self, marker: &SentMarker) -> Result<()> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&marker.order_id)
            .ok_or(StoreError::OrderNotFound(marker.order_id.value()))?;
        order.sent_marker = Some(marker.clone());
        Ok(())
    }

    async fn add_order_note(&self, order_id: OrderId, note: &str) -> Result<()> {
        self.notes
            .lock()
            .unwrap()
            .push((order_id, note.to_string()));
        Ok(())
    }

    async fn product_subscription(&self, product_id: ProductId) -> Result<Option<Subscription>> {
        if self.failing_products.lock().unwrap().contains(&product_id) {
            return Err(StoreError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            }
            .into());
        }
        Ok(self
            .product_subscriptions
            .lock()
            .unwrap()
            .get(&product_id)
            .copied())
    }

    async fn coupon_subscription(&self, code: &str) -> Result<Option<Subscription>> {
        Ok(self.coupon_subscriptions.lock().unwrap().get(code).copied())
    }
}

/// Kit double recording every call; purchase ids count up from 5000
#[derive(Default)]
pub(crate) struct FakeKit {
    purchases: Mutex<Vec<PurchaseRequest>>,
    subscribers: Mutex<Vec<SubscriberRequest>>,
    subscriptions: Mutex<Vec<(Subscription, String)>>,
    resources: Mutex<HashMap<ResourceKind, Vec<Resource>>>,
    list_calls: Mutex<usize>,
    reject_purchases: HashSet<String>,
}

impl FakeKit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reject_purchases_for(mut self, order_ids: &[u64]) -> Self {
        self.reject_purchases = order_ids.iter().map(u64::to_string).collect();
        self
    }

    pub(crate) fn with_resources(self, kind: ResourceKind, resources: Vec<Resource>) -> Self {
        self.resources.lock().unwrap().insert(kind, resources);
        self
    }

    pub(crate) fn purchases(&self) -> Vec<PurchaseRequest> {
        self.purchases.lock().unwrap().clone()
    }

    pub(crate) fn subscribers(&self) -> Vec<SubscriberRequest> {
        self.subscribers.lock().unwrap().clone()
    }

    pub(crate) fn subscriptions(&self) -> Vec<(Subscription, String)> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    fn record(&self, subscription: Subscription, email: &str) {
        self.subscriptions
            .lock()
            .unwrap()
            .push((subscription, email.to_string()));
    }
}

#[async_trait]
impl KitApi for FakeKit {
    async fn get_account(&self) -> Result<Account> {
        Ok(Account {
            account: AccountInfo {
                id: 1,
                name: "Test Shop".to_string(),
                plan_type: None,
            },
            user: AccountUser {
                email: "owner@example.com".to_string(),
            },
        })
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>> {
        *self.list_calls.lock().unwrap() += 1;
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_subscriber(&self, subscriber: &SubscriberRequest) -> Result<u64> {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.push(subscriber.clone());
        Ok(subscribers.len() as u64)
    }

    async fn add_subscriber_to_form(&self, form_id: ResourceId, email: &str) -> Result<()> {
        self.record(Subscription::Form(form_id), email);
        Ok(())
    }

    async fn add_subscriber_to_tag(&self, tag_id: ResourceId, email: &str) -> Result<()> {
        self.record(Subscription::Tag(tag_id), email);
        Ok(())
    }

    async fn add_subscriber_to_sequence(
        &self,
        sequence_id: ResourceId,
        email: &str,
    ) -> Result<()> {
        self.record(Subscription::Sequence(sequence_id), email);
        Ok(())
    }

    async fn create_purchase(&self, purchase: &PurchaseRequest) -> Result<PurchaseId> {
        if self.reject_purchases.contains(&purchase.transaction_id) {
            return Err(KitApiError::Api {
                status: 422,
                message: "Purchase is invalid".to_string(),
            }
            .into());
        }
        let mut purchases = self.purchases.lock().unwrap();
        purchases.push(purchase.clone());
        Ok(PurchaseId::new(5000 + purchases.len() as u64))
    }
}

/// Sender that succeeds with purchase id `1000 + order id` unless told otherwise
#[derive(Default)]
pub(crate) struct ScriptedSender {
    failing: HashSet<OrderId>,
    already_sent: HashMap<OrderId, PurchaseId>,
    /// Remaining failures per order before it succeeds
    flaky: Mutex<HashMap<OrderId, usize>>,
    sent: Mutex<Vec<OrderId>>,
}

impl ScriptedSender {
    pub(crate) fn failing(ids: &[u64]) -> Self {
        Self {
            failing: ids.iter().map(|id| order_id(*id)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn already_sent(mut self, id: u64, purchase_id: PurchaseId) -> Self {
        self.already_sent.insert(order_id(id), purchase_id);
        self
    }

    pub(crate) fn flaky(self, id: u64, failures: usize) -> Self {
        self.flaky.lock().unwrap().insert(order_id(id), failures);
        self
    }

    /// Every order handed to `send`, including failed attempts
    pub(crate) fn sent(&self) -> Vec<OrderId> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSender for ScriptedSender {
    async fn send(&self, order_id: OrderId) -> Result<SendOutcome> {
        self.sent.lock().unwrap().push(order_id);

        if self.failing.contains(&order_id) {
            return Err(KitSyncError::Kit(KitApiError::ConnectionFailed(
                "connection reset".to_string(),
            )));
        }

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&order_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(KitSyncError::Kit(KitApiError::Timeout(
                    "request timed out".to_string(),
                )));
            }
        }

        if let Some(purchase_id) = self.already_sent.get(&order_id) {
            return Ok(SendOutcome::AlreadySent {
                purchase_id: Some(*purchase_id),
            });
        }

        Ok(SendOutcome::Sent {
            purchase_id: PurchaseId::new(1000 + order_id.value()),
        })
    }
}
