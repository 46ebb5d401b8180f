//! Shared fixtures: mockito servers standing in for the store and Kit,
//! wired into a coordinator with in-memory state storage

#![allow(dead_code)]

use kitsync::adapters::database::traits::WorkQueue;
use kitsync::adapters::kit::{Credential, KitClient};
use kitsync::adapters::memory::MemoryStorage;
use kitsync::adapters::woocommerce::WooCommerceClient;
use kitsync::config::KitSyncConfig;
use kitsync::core::{SyncCoordinator, SyncServices};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;

pub struct Harness {
    pub store: ServerGuard,
    pub kit: ServerGuard,
    pub queue: Arc<MemoryStorage>,
    /// Mocks are removed from their server when dropped
    mocks: Vec<Mock>,
    shutdown: watch::Sender<bool>,
    pub coordinator: SyncCoordinator,
}

pub fn config(store_url: &str, kit_url: &str, dry_run: bool) -> KitSyncConfig {
    let mut config: KitSyncConfig = toml::from_str(&format!(
        r#"
        database_target = "memory"

        [kit]
        base_url = "{kit_url}"
        auth_type = "api_key"
        api_key = "key"

        [store]
        base_url = "{store_url}"
        consumer_key = "ck"
        consumer_secret = "cs"

        [sync]
        batch_size = 2
        "#
    ))
    .unwrap();
    config.application.dry_run = dry_run;
    config
}

pub async fn harness(dry_run: bool) -> Harness {
    let store = Server::new_async().await;
    let kit = Server::new_async().await;
    let config = config(&store.url(), &kit.url(), dry_run);

    let queue = Arc::new(MemoryStorage::new());
    let credential = Credential::from_config(&config.kit).unwrap();
    let services = SyncServices {
        store: Arc::new(WooCommerceClient::new(&config.store).unwrap()),
        kit: Arc::new(KitClient::new(&config.kit, credential, &store.url()).unwrap()),
        storage: queue.clone(),
        queue: queue.clone(),
    };

    let (tx, rx) = watch::channel(false);
    Harness {
        store,
        kit,
        queue,
        mocks: Vec::new(),
        shutdown: tx,
        coordinator: SyncCoordinator::new(config, services, rx),
    }
}

pub fn order_json(id: u64, sent: bool) -> Value {
    let meta = if sent {
        json!([{"key": "ckwc_purchase_data_sent", "value": "yes"}])
    } else {
        json!([])
    };
    json!({
        "id": id,
        "status": "processing",
        "currency": "USD",
        "date_created_gmt": "2025-02-14T08:30:00",
        "billing": {
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": format!("buyer{id}@example.com")
        },
        "line_items": [{
            "id": id * 10,
            "name": "Compiler",
            "product_id": 7,
            "quantity": 1,
            "subtotal": "40.00",
            "price": 40
        }],
        "total_tax": "0.00",
        "shipping_total": "0.00",
        "discount_total": "0.00",
        "total": "40.00",
        "meta_data": meta
    })
}

impl Harness {
    /// Serves a store holding `orders` as (id, sent) pairs
    pub async fn store_orders(&mut self, orders: &[(u64, bool)]) {
        let page: Vec<Value> = orders.iter().map(|(id, sent)| order_json(*id, *sent)).collect();
        self.store_listing(page).await;

        for (id, sent) in orders {
            let order = self
                .store
                .mock("GET", format!("/wp-json/wc/v3/orders/{id}").as_str())
                .with_status(200)
                .with_body(order_json(*id, *sent).to_string())
                .create_async()
                .await;
            let note = self
                .store
                .mock("POST", format!("/wp-json/wc/v3/orders/{id}/notes").as_str())
                .with_status(201)
                .with_body(r#"{"id": 1}"#)
                .create_async()
                .await;
            self.mocks.push(order);
            self.mocks.push(note);
        }
    }

    /// Serves the order count and a single listing page of raw order bodies
    pub async fn store_listing(&mut self, page: Vec<Value>) {
        let count = self
            .store
            .mock("GET", "/wp-json/wc/v3/orders")
            .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
            .with_status(200)
            .with_header("X-WP-Total", &page.len().to_string())
            .with_body("[]")
            .create_async()
            .await;
        self.mocks.push(count);

        let list = self
            .store
            .mock("GET", "/wp-json/wc/v3/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("offset".into(), "0".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(Value::Array(page).to_string())
            .create_async()
            .await;
        self.mocks.push(list);
    }

    /// Expects exactly `hits` sent-marker writes for `order_id`
    pub async fn expect_marker(&mut self, order_id: u64, purchase_id: u64, hits: usize) -> Mock {
        self.store
            .mock("PUT", format!("/wp-json/wc/v3/orders/{order_id}").as_str())
            .match_body(Matcher::PartialJson(json!({
                "meta_data": [
                    {"key": "ckwc_purchase_data_sent", "value": "yes"},
                    {"key": "ckwc_purchase_data_id", "value": purchase_id.to_string()}
                ]
            })))
            .with_status(200)
            .with_body(order_json(order_id, true).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Kit accepts the purchase for `order_id` as `purchase_id`
    pub async fn expect_purchase(&mut self, order_id: u64, purchase_id: u64, hits: usize) -> Mock {
        self.kit
            .mock("POST", "/purchases")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "transaction_id": order_id.to_string(),
                "email_address": format!("buyer{order_id}@example.com"),
                "status": "paid"
            })))
            .with_status(201)
            .with_body(json!({"purchase": {"id": purchase_id}}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Raises the shutdown signal seen by the coordinator
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub async fn queued(&self) -> Vec<u64> {
        self.queue
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|id| id.value())
            .collect()
    }
}
