//! Shared test fixtures: a shop instance backed by a temporary database,
//! a scriptable gateway, and a notifier that records every delivery.

// Not every test binary uses every fixture
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use shop_server::core::{Config, ServerState};
use shop_server::db::DbService;
use shop_server::db::repository::NewProduct;
use shop_server::gateway::MockGateway;
use shop_server::notify::Notifier;
use shared::models::order::{LineItemInput, Order, PlaceOrderRequest};

/// Notifier that records one line per delivered notification
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn order_confirmed(&self, order: &Order) {
        self.events
            .lock()
            .unwrap()
            .push(format!("confirmed:{}", order.id));
    }

    async fn payment_failed(&self, order: &Order, reason: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed:{}:{}", order.id, reason));
    }

    async fn order_cancelled(&self, order: &Order) {
        self.events
            .lock()
            .unwrap()
            .push(format!("cancelled:{}", order.id));
    }
}

pub struct TestShop {
    pub state: ServerState,
    pub gateway: Arc<MockGateway>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: tempfile::TempDir,
}

/// Spin up a shop over a fresh temporary database
pub async fn test_shop() -> TestShop {
    test_shop_with(|_| {}).await
}

/// Same, with a config tweak (e.g. the restock policy)
pub async fn test_shop_with(tweak: impl FnOnce(&mut Config)) -> TestShop {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.db");
    let db = DbService::new(db_path.to_str().unwrap()).await.unwrap();

    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.restock_on_payment_failure = false;
    tweak(&mut config);

    let gateway = Arc::new(MockGateway::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = ServerState::new(config, db.pool, gateway.clone(), notifier.clone());

    TestShop {
        state,
        gateway,
        notifier,
        _dir: dir,
    }
}

pub async fn seed_product(shop: &TestShop, name: &str, price: i64, units: i64) -> i64 {
    shop.state
        .product_repository()
        .create(NewProduct {
            name: name.to_string(),
            description: String::new(),
            price,
            image: None,
            available_units: units,
        })
        .await
        .unwrap()
        .id
}

pub async fn available_units(shop: &TestShop, product_id: i64) -> i64 {
    shop.state
        .product_repository()
        .find_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .available_units
}

pub fn single_item(product_id: i64, quantity: i64) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_ref: Some("chat-100".to_string()),
        items: vec![LineItemInput {
            product_id,
            quantity,
        }],
    }
}
