//! Persisted audit trail record.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// An immutable audit log row.
///
/// `audit_id` is the producer-assigned event id and serves as the idempotency
/// key: the pipeline delivers at-least-once, and a second insert with the same
/// id is a no-op.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub audit_id: Uuid,
    /// When the event happened in the producing context (business time).
    pub event_time: DateTime<Utc>,
    /// Identity provider subject of the actor, if the action had one.
    pub actor_id: Option<String>,
    /// Entity class the event refers to, e.g. "EMPLOYEE".
    pub entity_name: String,
    pub entity_id: Option<Uuid>,
    /// Performed action, e.g. "CREATE", "UPDATE", "TERMINATE".
    pub action: String,
    pub message: Option<String>,
    /// Logical producer name, e.g. "people-service".
    pub source_service: String,
    pub correlation_id: Option<String>,
    /// Snapshot of the affected entity, stored as JSONB.
    pub payload: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Technical insert time, set by the database.
    pub created_at: DateTime<Utc>,
}
