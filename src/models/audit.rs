//! Audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound applied to any requested page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// One immutable record of a change made by a staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub staff_id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub action_type: String,
    pub timestamp: DateTime<Utc>,
    /// Opaque change description; never interpreted by the query path.
    pub payload: Option<serde_json::Value>,
}

/// Entry as submitted by the POS application before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogEntry {
    pub staff_id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub action_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Option<serde_json::Value>,
}

/// Raw query string parameters for `GET /api/audit-logs`.
///
/// Every value is kept as text so that the validator decides what is
/// malformed, rather than the extractor rejecting the request wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogParams {
    pub staff_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Validated filter handed to the audit log store.
///
/// `None` means "no constraint"; the store applies its own defaults for
/// an absent `limit` or `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    pub staff_id: Option<i64>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action_type: Option<String>,
    /// Inclusive lower bound on `timestamp`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`.
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

impl AuditLogFilter {
    /// Whether an entry satisfies every predicate in the filter.
    ///
    /// Pagination is ignored.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.staff_id.map_or(true, |id| entry.staff_id == id)
            && self
                .entity_type
                .as_deref()
                .map_or(true, |t| entry.entity_type == t)
            && self
                .entity_id
                .as_deref()
                .map_or(true, |id| entry.entity_id == id)
            && self
                .action_type
                .as_deref()
                .map_or(true, |a| entry.action_type == a)
            && self.start_date.map_or(true, |start| entry.timestamp >= start)
            && self.end_date.map_or(true, |end| entry.timestamp <= end)
    }
}

/// One page of matching entries plus the size of the full match set.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogPage {
    pub entries: Vec<AuditLogEntry>,
    /// Count of all entries matching the filter, ignoring pagination.
    pub total: u64,
    /// Page size the store actually applied.
    pub limit: u32,
    /// Offset the store actually applied.
    pub offset: u64,
}

/// Pagination metadata returned alongside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

/// Success envelope for `GET /api/audit-logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogListResponse {
    pub success: bool,
    pub data: Vec<AuditLogEntry>,
    pub pagination: Pagination,
}

impl From<AuditLogPage> for AuditLogListResponse {
    fn from(page: AuditLogPage) -> Self {
        let has_more = page.offset + (page.entries.len() as u64) < page.total;
        Self {
            success: true,
            pagination: Pagination {
                total: page.total,
                limit: page.limit,
                offset: page.offset,
                has_more,
            },
            data: page.entries,
        }
    }
}
