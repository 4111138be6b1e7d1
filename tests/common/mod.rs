#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use rephone_api::{
    config::AppConfig,
    db::{self, DbConfig},
    events, AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up the application against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Fresh schema with built-in field configs seeded and strict custom data.
    pub async fn new() -> Self {
        Self::with_strict(true).await
    }

    pub async fn with_strict(strict: bool) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.custom_data_strict = strict;

        let pool = db::establish_connection_with_config(&DbConfig::sqlite_in_memory())
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        state
            .services
            .field_config
            .seed_system_fields()
            .await
            .expect("failed to seed built-in fields");

        let router = rephone_api::build_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

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

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    /// Like [`TestApp::call`] but asserts the status and returns the envelope's `data`.
    pub async fn data(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let (status, body) = self.call(method, uri, body).await;
        assert_eq!(status, expected, "unexpected status, body: {}", body);
        assert_eq!(body["success"], Value::Bool(true), "body: {}", body);
        body["data"].clone()
    }

    pub async fn field_configs(&self, table: &str) -> Vec<Value> {
        let data = self
            .data(
                Method::GET,
                &format!("/api/field-config?table={}", table),
                None,
                StatusCode::OK,
            )
            .await;
        data.as_array().cloned().expect("config list")
    }

    /// Id of the config named `field_name` for `table`
    pub async fn config_id(&self, table: &str, field_name: &str) -> String {
        self.field_configs(table)
            .await
            .into_iter()
            .find(|c| c["field_name"] == field_name)
            .and_then(|c| c["id"].as_str().map(str::to_string))
            .unwrap_or_else(|| panic!("no config '{}' on {}", field_name, table))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

/// Field names of a config list in the order returned
pub fn names(configs: &[Value]) -> Vec<String> {
    configs
        .iter()
        .filter_map(|c| c["field_name"].as_str().map(str::to_string))
        .collect()
}
