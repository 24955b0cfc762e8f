//! Audit log query service
//!
//! Runs a validated [`AuditLogFilter`] against the injected store. The
//! service is read-only and issues exactly one store query per call.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::db::{AuditLogStore, StoreError};
use crate::models::{AuditLogFilter, AuditLogPage};

#[derive(Clone)]
pub struct AuditLogService {
    store: Arc<dyn AuditLogStore>,
}

impl AuditLogService {
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self { store }
    }

    /// Fetch one page of entries matching `filter`.
    ///
    /// An absent limit or offset is passed through untouched so the store
    /// applies its own defaults. Store failures are logged and returned
    /// without retry.
    pub async fn query(&self, filter: AuditLogFilter) -> Result<AuditLogPage, StoreError> {
        debug!(?filter, "Querying audit log");

        match self.store.query(&filter).await {
            Ok(page) => {
                debug!(
                    total = page.total,
                    returned = page.entries.len(),
                    limit = page.limit,
                    offset = page.offset,
                    "Audit log query complete"
                );
                Ok(page)
            }
            Err(e) => {
                error!(error = %e, "Failed to query audit log store");
                Err(e)
            }
        }
    }

    /// Whether the backing store can currently serve queries.
    pub async fn check_store(&self) -> Result<(), StoreError> {
        self.store.ping().await.inspect_err(|e| {
            warn!(error = %e, "Audit log store is not reachable");
        })
    }
}
