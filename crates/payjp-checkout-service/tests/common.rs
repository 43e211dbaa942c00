//! Common test utilities for payjp-checkout-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use payjp_checkout_gateway::{ApiKeys, GatewaySettings};
use payjp_checkout_service::{create_router, AppState, ServiceConfig};
use payjp_checkout_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Mock Pay.jp API.
    pub payjp: MockServer,
    /// Mock store-front order API.
    pub orders: MockServer,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with an in-memory store.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Create a new test harness over the given store.
    pub async fn with_store(store: Arc<dyn Store>) -> Self {
        let payjp = MockServer::start().await;
        let orders = MockServer::start().await;
        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            service_api_key: Some(service_api_key.clone()),
            order_api_url: orders.uri(),
            payjp_api_base: payjp.uri(),
            gateway: GatewaySettings {
                test_keys: ApiKeys {
                    secret_key: "sk_test_svc".into(),
                    publishable_key: "pk_test_svc".into(),
                },
                ..GatewaySettings::default()
            },
            request_timeout_seconds: 5,
            ..ServiceConfig::default()
        };

        let state = AppState::new(store, config).expect("Failed to build app state");
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            payjp,
            orders,
            service_api_key,
        }
    }

    /// Serve an order from the mock order API and accept every write to it.
    pub async fn mount_order(&self, order: serde_json::Value) {
        let id = order["id"].as_u64().expect("order id");
        Mock::given(method("GET"))
            .and(path(format!("/orders/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(order))
            .mount(&self.orders)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(format!(r"^/orders/{id}/meta/.+$")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.orders)
            .await;
    }

    /// Expect `count` order writes of `verb` to `/orders/{id}/{what}`.
    pub async fn expect_order_write(&self, verb: &str, id: u64, what: &str, count: u64) {
        Mock::given(method(verb))
            .and(path(format!("/orders/{id}/{what}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(count)
            .mount(&self.orders)
            .await;
    }
}

/// A pending JPY order placed by a guest.
pub fn order_json(id: u64, total: i64) -> serde_json::Value {
    json!({
        "id": id,
        "number": id.to_string(),
        "order_key": format!("wc_order_{id}"),
        "status": "pending",
        "currency": "jpy",
        "total": total,
        "billing": {
            "first_name": "Aiko",
            "last_name": "Tanaka",
            "email": "aiko@example.com",
            "postcode": "1500002",
            "country": "JP"
        },
        "items": [{"name": "Green Tea"}]
    })
}

/// A Pay.jp charge object.
pub fn charge_json(id: &str, amount: i64) -> serde_json::Value {
    json!({
        "id": id,
        "object": "charge",
        "amount": amount,
        "currency": "jpy",
        "captured": true,
        "refunded": false,
        "amount_refunded": 0,
        "balance_transaction": {"id": "txn_1", "fee": 36}
    })
}
