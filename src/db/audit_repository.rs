//! Audit log repository

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite};

use super::{AuditLogStore, DbPool, StoreError};
use crate::models::{AuditLogEntry, AuditLogFilter, AuditLogPage, NewAuditLogEntry};

/// Page size used when a query does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i64,
    staff_id: i64,
    entity_type: String,
    entity_id: String,
    action_type: String,
    timestamp: String,
    payload: Option<String>,
}

/// SQLite-backed audit log store
#[derive(Clone)]
pub struct SqliteAuditLogStore {
    pool: DbPool,
    default_page_size: u32,
}

impl SqliteAuditLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size applied when a query has no limit
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Record a new entry.
    ///
    /// This is the write path used by the POS application; the query
    /// service never calls it.
    pub async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, StoreError> {
        let timestamp = format_db_timestamp(&entry.timestamp);
        let payload = entry.payload.as_ref().map(|p| p.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO audit_log (staff_id, entity_type, entity_id, action_type, timestamp, payload)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.staff_id)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.action_type)
        .bind(&timestamp)
        .bind(payload.as_deref())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        Ok(AuditLogEntry {
            id,
            staff_id: entry.staff_id,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            action_type: entry.action_type,
            timestamp: parse_db_timestamp(id, &timestamp)?,
            payload: entry.payload,
        })
    }
}

#[async_trait]
impl AuditLogStore for SqliteAuditLogStore {
    async fn query(&self, filter: &AuditLogFilter) -> Result<AuditLogPage, StoreError> {
        let limit = filter.limit.unwrap_or(self.default_page_size);
        let offset = filter.offset.unwrap_or(0);

        // Count and page are read in one transaction so they agree.
        let mut tx = self.pool.begin().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM audit_log");
        push_predicates(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT id, staff_id, entity_type, entity_id, action_type, timestamp, payload FROM audit_log",
        );
        push_predicates(&mut select, filter);
        select
            .push(" ORDER BY timestamp DESC, id DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset as i64);
        let rows: Vec<AuditRow> = select.build_query_as::<AuditRow>().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        let entries = rows
            .into_iter()
            .map(row_to_audit)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AuditLogPage {
            entries,
            total: total.max(0) as u64,
            limit,
            offset,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log WHERE 1 = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Append the WHERE clause for every predicate present in the filter
fn push_predicates(builder: &mut QueryBuilder<'_, Sqlite>, filter: &AuditLogFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(staff_id) = filter.staff_id {
        builder.push(" AND staff_id = ").push_bind(staff_id);
    }
    if let Some(ref entity_type) = filter.entity_type {
        builder.push(" AND entity_type = ").push_bind(entity_type.clone());
    }
    if let Some(ref entity_id) = filter.entity_id {
        builder.push(" AND entity_id = ").push_bind(entity_id.clone());
    }
    if let Some(ref action_type) = filter.action_type {
        builder.push(" AND action_type = ").push_bind(action_type.clone());
    }
    if let Some(ref start) = filter.start_date {
        builder.push(" AND timestamp >= ").push_bind(format_db_timestamp(start));
    }
    if let Some(ref end) = filter.end_date {
        builder.push(" AND timestamp <= ").push_bind(format_db_timestamp(end));
    }
}

/// Fixed-width UTC form, so text order equals time order.
fn format_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_db_timestamp(id: i64, ts: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            id,
            reason: format!("bad timestamp {:?}: {}", ts, e),
        })
}

fn row_to_audit(row: AuditRow) -> Result<AuditLogEntry, StoreError> {
    let timestamp = parse_db_timestamp(row.id, &row.timestamp)?;
    let payload = row
        .payload
        .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
        .transpose()
        .map_err(|e| StoreError::Corrupt {
            id: row.id,
            reason: format!("bad payload: {}", e),
        })?;

    Ok(AuditLogEntry {
        id: row.id,
        staff_id: row.staff_id,
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        action_type: row.action_type,
        timestamp,
        payload,
    })
}
