//! POS Audit Log Service Library
//!
//! This crate provides the filtered, paginated audit log query API of the
//! point-of-sale backend.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
use services::AuditLogService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Audit log query service
    pub audit_log: AuditLogService,
}
