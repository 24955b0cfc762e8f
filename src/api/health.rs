//! Liveness and readiness endpoints
//!
//! Readiness is judged by the audit log store the query service actually
//! uses, so a deployment wired to another store reports on that store.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
}

impl Health {
    fn status_code(self) -> StatusCode {
        match self {
            Health::Healthy => StatusCode::OK,
            Health::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: Health,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub status: Health,
    /// Reason the store could not be reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Components {
    pub audit_store: StoreHealth,
}

#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: Health,
    pub version: &'static str,
    pub components: Components,
}

async fn audit_store_health(state: &AppState) -> StoreHealth {
    match state.audit_log.check_store().await {
        Ok(()) => StoreHealth {
            status: Health::Healthy,
            message: None,
        },
        Err(e) => StoreHealth {
            status: Health::Unhealthy,
            message: Some(e.to_string()),
        },
    }
}

/// `GET /api/health`: the process is up.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: Health::Healthy,
        version: VERSION,
    })
}

/// `GET /api/health/detailed`: 503 while the audit log store is unreachable.
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let audit_store = audit_store_health(&state).await;
    let status = audit_store.status;

    (
        status.status_code(),
        Json(DetailedHealthResponse {
            status,
            version: VERSION,
            components: Components { audit_store },
        }),
    )
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    audit_store_health(&state).await.status.status_code()
}
