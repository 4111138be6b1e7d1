/*!
 * # Health Check Module
 *
 * - Liveness (`/health`) answers as long as the process serves requests
 * - Readiness (`/health/ready`) pings the database and reports 503 when it is down
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::AppState;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthDetail {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub details: BTreeMap<String, HealthDetail>,
}

impl HealthInfo {
    fn new(details: BTreeMap<String, HealthDetail>) -> Self {
        let status = if details.values().any(|d| d.status == HealthStatus::Down) {
            HealthStatus::Down
        } else {
            HealthStatus::Up
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            details,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Liveness check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up", body = HealthInfo)),
    tag = "Health"
)]
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");
    Json(HealthInfo::new(BTreeMap::new()))
}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = HealthInfo),
        (status = 503, description = "Database unreachable", body = HealthInfo)
    ),
    tag = "Health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match crate::db::check_connection(&state.db).await {
        Ok(()) => HealthDetail {
            status: HealthStatus::Up,
            message: None,
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthDetail {
                status: HealthStatus::Down,
                message: Some("database unreachable".to_string()),
            }
        }
    };

    let mut details = BTreeMap::new();
    details.insert("database".to_string(), database);
    let health = HealthInfo::new(details);

    (health.status_code(), Json(health))
}

/// Health routes, nested under `/health`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(status: HealthStatus) -> HealthDetail {
        HealthDetail {
            status,
            message: None,
        }
    }

    #[test]
    fn any_down_component_marks_the_service_down() {
        let mut details = BTreeMap::new();
        details.insert("database".to_string(), detail(HealthStatus::Down));
        details.insert("events".to_string(), detail(HealthStatus::Up));

        let health = HealthInfo::new(details);
        assert_eq!(health.status, HealthStatus::Down);
        assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn no_components_means_up() {
        let health = HealthInfo::new(BTreeMap::new());
        assert_eq!(health.status, HealthStatus::Up);
        assert_eq!(health.status_code(), StatusCode::OK);
    }
}
