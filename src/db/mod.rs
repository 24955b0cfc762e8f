//! Database layer
//!
//! This module owns the audit log store: the [`AuditLogStore`] trait the
//! query service depends on and its SQLite-backed implementation.

pub mod audit_repository;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::models::{AuditLogFilter, AuditLogPage};

pub use audit_repository::SqliteAuditLogStore;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Failures reported by an audit log store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded
    #[error("corrupt audit log row {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("{0}")]
    Unavailable(String),
}

/// Read access to the append-only audit log.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Return the entries matching every predicate in `filter`, sliced by
    /// its `offset`/`limit`, together with the unpaginated match count.
    ///
    /// Implementations substitute their own defaults for an absent limit
    /// or offset and report the values they applied in the page.
    async fn query(&self, filter: &AuditLogFilter) -> Result<AuditLogPage, StoreError>;

    /// Cheap reachability check used by the readiness probes.
    ///
    /// Stores without an external backend are always reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}
