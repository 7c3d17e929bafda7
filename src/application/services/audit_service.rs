//! Audit trail query service.

use std::sync::Arc;

use crate::domain::entities::AuditRecord;
use crate::domain::repositories::{AuditFilter, AuditRepository};
use crate::error::AppError;

/// Read side of the audit trail.
///
/// Writing goes through the event pipeline
/// ([`crate::domain::audit_worker`]); this service only serves administrator
/// queries.
pub struct AuditService<A: AuditRepository> {
    repository: Arc<A>,
}

impl<A: AuditRepository> AuditService<A> {
    /// Creates a new audit service.
    pub fn new(repository: Arc<A>) -> Self {
        Self { repository }
    }

    /// Lists audit records with the total count for pagination metadata.
    pub async fn list_records(
        &self,
        filter: &AuditFilter,
    ) -> Result<(Vec<AuditRecord>, i64), AppError> {
        tracing::debug!(?filter, "Fetching audit records");
        tokio::try_join!(self.repository.list(filter), self.repository.count(filter))
    }
}
