//! Repository trait for the audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::AuditRecord;
use crate::error::AppError;

/// Sortable columns for audit listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSort {
    EventTime,
    Action,
    CreatedAt,
}

/// Dynamic filter for audit queries.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub offset: i64,
    pub limit: i64,
    /// Case-insensitive substring match over action or entity name.
    pub search: Option<String>,
    /// Exact action match, e.g. "CREATE".
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort: AuditSort,
    pub descending: bool,
}

impl AuditFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            search: None,
            action: None,
            from: None,
            to: None,
            sort: AuditSort::EventTime,
            descending: false,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_sort(mut self, sort: AuditSort, descending: bool) -> Self {
        self.sort = sort;
        self.descending = descending;
        self
    }
}

/// Repository interface for audit records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAuditRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Inserts a record idempotently.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` when the record was stored
    /// - `Ok(false)` when a record with the same `audit_id` already existed
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, record: &AuditRecord) -> Result<bool, AppError>;

    /// Lists records matching the filter, honoring pagination and sorting.
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AppError>;

    /// Counts records matching the filter (pagination bounds ignored).
    async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError>;

    /// Deletes records with `event_time` strictly before the cutoff.
    ///
    /// Used by the retention task in the ops CLI. Returns the number of
    /// deleted rows.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
