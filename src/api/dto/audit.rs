//! DTOs for audit trail endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::dto::pagination::{DateFilterParams, PaginationMeta, PaginationParams, parse_sort};
use crate::domain::entities::AuditRecord;
use crate::domain::repositories::AuditSort;

/// Query parameters for the audit list endpoint.
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,

    /// Case-insensitive substring match over action or entity name.
    pub search: Option<String>,

    /// Exact action match, e.g. `CREATE`.
    pub action: Option<String>,

    /// `field` or `field,desc`; whitelisted fields only.
    pub sort: Option<String>,
}

impl AuditQueryParams {
    /// Resolves the sort parameter against the whitelist.
    ///
    /// Defaults to `event_time` ascending.
    pub fn sort_params(&self) -> Result<(AuditSort, bool), String> {
        let Some(raw) = self.sort.as_deref() else {
            return Ok((AuditSort::EventTime, false));
        };

        let (field, descending) = parse_sort(raw)?;

        let sort = match field {
            "event_time" => AuditSort::EventTime,
            "action" => AuditSort::Action,
            "created_at" => AuditSort::CreatedAt,
            other => return Err(format!("Unsortable field '{other}'")),
        };

        Ok((sort, descending))
    }
}

/// JSON representation of an audit record.
///
/// The stored `audit_id` is surfaced as `event_id`: externally the business
/// identifier of the event, internally the primary key.
#[derive(Debug, Serialize)]
pub struct AuditRecordResponse {
    pub event_id: Uuid,
    pub event_time: DateTime<Utc>,
    pub actor_id: Option<String>,
    pub entity_name: String,
    pub entity_id: Option<Uuid>,
    pub action: String,
    pub message: Option<String>,
    pub source_service: String,
    pub correlation_id: Option<String>,
    pub payload: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<AuditRecord> for AuditRecordResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            event_id: record.audit_id,
            event_time: record.event_time,
            actor_id: record.actor_id,
            entity_name: record.entity_name,
            entity_id: record.entity_id,
            action: record.action,
            message: record.message,
            source_service: record.source_service,
            correlation_id: record.correlation_id,
            payload: record.payload,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
        }
    }
}

/// Paginated audit listing.
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<AuditRecordResponse>,
}
