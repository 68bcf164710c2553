//! Liveness and health endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::{success_status, AliveResponse, Json};

use super::state::AppState;

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// `GET /`: always answers while the process is up
pub async fn alive(State(state): State<AppState>) -> impl IntoResponse {
    (success_status(state.response_codes), Json(AliveResponse::alive()))
}

/// `GET /health`: 503 when the store does not answer a PING
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = check_store(&state).await;

    let status_code = match store.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: store.status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: vec![store],
    };

    (status_code, Json(response))
}

async fn check_store(state: &AppState) -> HealthCheck {
    let name = format!("cache:{}", state.cache_admin.backend_name());

    match state.cache_admin.check_store().await {
        Ok(latency) => HealthCheck {
            name,
            status: HealthStatus::Healthy,
            message: None,
            latency_ms: Some(latency.as_millis() as u64),
        },
        Err(e) => HealthCheck {
            name,
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
            latency_ms: None,
        },
    }
}
