//! Rephone API Library
//!
//! Storefront and CRM backend for a pre-owned phone retailer. Phones,
//! customers, orders and inquiries carry a `custom_data` bag whose fields
//! are defined and laid out at runtime through the field configuration API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod fields;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Builds the shared state around an established pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            config.custom_data_strict,
        );
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, clamped to the configured maximum
    pub limit: Option<u64>,
    /// Free-text search over the entity's main text columns
    pub search: Option<String>,
    /// Phones only: exact brand match
    pub brand: Option<String>,
    /// Status filter, lowercase
    pub status: Option<String>,
    /// Orders only: restrict to one customer
    pub customer_id: Option<Uuid>,
}

fn default_page() -> u64 {
    1
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn list_query_defaults_to_first_page() {
        let query: ListQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.page, 1);
        assert!(query.limit.is_none());
    }
}

/// Every `/api` route, relative to the `/api` prefix
pub fn api_routes() -> Router<AppState> {
    use handlers::{custom_fields, customers, field_config, forms, inquiries, orders, phones};

    let field_definitions = Router::new().route(
        "/custom-fields",
        get(custom_fields::list_custom_fields)
            .post(custom_fields::create_custom_field)
            .delete(custom_fields::delete_custom_field),
    );

    let field_configs = Router::new()
        .route(
            "/field-config",
            get(field_config::list_field_configs)
                .post(field_config::create_field_config)
                .put(field_config::bulk_save_field_configs)
                .delete(field_config::delete_field_config),
        )
        .route(
            "/field-config/:id",
            axum::routing::patch(field_config::update_field_config),
        )
        .route(
            "/field-config/:id/move",
            post(field_config::move_field_config),
        );

    let form_layouts = Router::new()
        .route("/forms/:table", get(forms::blank_form))
        .route("/forms/:table/:id", get(forms::record_form));

    let phone_routes = Router::new()
        .route("/phones", get(phones::list_phones).post(phones::create_phone))
        .route(
            "/phones/:id",
            get(phones::get_phone)
                .put(phones::update_phone)
                .delete(phones::delete_phone),
        );

    let customer_routes = Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        );

    let order_routes = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        );

    let inquiry_routes = Router::new()
        .route(
            "/inquiries",
            get(inquiries::list_inquiries).post(inquiries::create_inquiry),
        )
        .route(
            "/inquiries/:id",
            get(inquiries::get_inquiry)
                .put(inquiries::update_inquiry)
                .delete(inquiries::delete_inquiry),
        );

    Router::new()
        .merge(field_definitions)
        .merge(field_configs)
        .merge(form_layouts)
        .merge(phone_routes)
        .merge(customer_routes)
        .merge(order_routes)
        .merge(inquiry_routes)
}

/// Application router with health, API, docs, tracing and request ids.
///
/// CORS and compression are environment concerns and are layered on by the
/// binary.
pub fn build_router(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/", get(|| async { "rephone-api up" }))
        .nest("/health", health::health_routes())
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
