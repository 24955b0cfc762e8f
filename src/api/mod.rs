//! API routes and handlers
//!
//! This module defines all API endpoints and their routing. Session
//! authentication is applied by the fronting POS gateway, not here.

use axum::{routing::get, Router};

use crate::AppState;

mod audit_logs;
mod health;

pub use health::*;

/// Health and probe routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}

/// Create the full API router, to be nested under `/api`
pub fn routes() -> Router<AppState> {
    health_routes().nest("/audit-logs", audit_logs::routes())
}
