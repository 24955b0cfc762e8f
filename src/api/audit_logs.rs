//! Audit log API endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    models::{AuditLogListResponse, AuditLogParams},
    utils::{validate_audit_log_params, AppResult},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

/// List audit log entries
///
/// GET /api/audit-logs
///
/// Query parameters (all optional):
/// - `staff_id`: actor id (integer)
/// - `entity_type`, `entity_id`, `action_type`: exact match
/// - `start_date`, `end_date`: inclusive calendar days, UTC
/// - `limit`: page size, at least 1, capped at 1000
/// - `offset`: entries to skip, at least 0
async fn list_audit_logs(
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> AppResult<Json<AuditLogListResponse>> {
    let filter = validate_audit_log_params(&params)?;
    let page = state.audit_log.query(filter).await?;

    Ok(Json(AuditLogListResponse::from(page)))
}
