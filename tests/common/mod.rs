#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use labelbase_api::{
    config::AppConfig,
    db::{self, DbConfig},
    inventory_store::MaterialInventoryStore,
    AppState,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        tweak(&mut cfg);

        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (state, event_rx) = AppState::new(Arc::new(pool), cfg);
        state.hydrate_store().await.expect("hydrate store");
        let event_task = state.spawn_event_loop(event_rx);
        let router = labelbase_api::build_router(state.clone()).expect("router builds");

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send an unencoded JSON body as-is.
    pub async fn request_raw(&self, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Request and decode the JSON body (`Null` for empty bodies).
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// POST and return `data` of the envelope, asserting 201.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, value) = self.json(Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {value}");
        value["data"].clone()
    }

    pub async fn create_vendor(&self, name: &str) -> Value {
        self.create("/api/v1/vendors", json!({ "name": name })).await
    }

    pub async fn create_material(&self, name: &str, code: &str) -> Value {
        self.create(
            "/api/v1/materials",
            json!({ "name": name, "material_id": code, "category": "Roll Stock" }),
        )
        .await
    }

    pub async fn create_order(
        &self,
        material_id: &str,
        feet_per_roll: &str,
        rolls: i32,
        arrived: bool,
    ) -> Value {
        self.create(
            "/api/v1/material-orders",
            json!({
                "material_id": material_id,
                "purchase_order_number": format!("PO-{feet_per_roll}-{rolls}"),
                "feet_per_roll": feet_per_roll,
                "total_rolls": rolls,
                "has_arrived": arrived,
            }),
        )
        .await
    }

    /// Polls the inventory store until `check` holds; the store trails
    /// writes through the event loop.
    pub async fn wait_for<F>(&self, mut check: F)
    where
        F: FnMut(&MaterialInventoryStore) -> bool,
    {
        for _ in 0..200 {
            if check(&*self.state.store.read().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("inventory store never reached the expected state");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimal carried as a JSON string or number.
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

/// URL-encoded query string from key/value pairs.
pub fn query(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("query string")
}
