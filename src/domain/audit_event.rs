//! Audit event model for the asynchronous audit pipeline.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::AuditRecord;

/// Actor recorded for actions performed outside a user request
/// (startup tasks, the ops CLI).
pub const SYSTEM_ACTOR_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Logical producer name stamped on every event this service emits.
pub const SOURCE_SERVICE: &str = "people-service";

/// Request-scoped metadata attached to emitted audit events.
///
/// Collected in the HTTP layer (authenticated subject + headers) and passed
/// down to services so events carry who/where/what-request context.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Identity provider subject of the caller.
    pub actor_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub correlation_id: Option<String>,
}

impl RequestMeta {
    /// Metadata for non-request contexts; actor is the system sentinel.
    pub fn system() -> Self {
        Self {
            actor_id: SYSTEM_ACTOR_ID.to_string(),
            ip_address: None,
            user_agent: None,
            correlation_id: None,
        }
    }
}

/// An in-memory audit event queued for background persistence.
///
/// # Design
///
/// - `event_id` is assigned at emission time and doubles as the idempotency
///   key when the record is stored.
/// - The payload is an arbitrary JSON snapshot; consumers must tolerate
///   fields they do not know.
/// - Events are emitted only after the corresponding database commit, so the
///   trail never references state that was rolled back.
///
/// # Usage Flow
///
/// 1. An application service completes a mutating operation
/// 2. The event is sent to a bounded channel (non-blocking)
/// 3. [`crate::domain::audit_worker::run_audit_worker`] persists it with
///    retry and duplicate suppression
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_time: DateTime<Utc>,
    pub actor_id: String,
    pub entity_name: String,
    pub entity_id: Option<Uuid>,
    pub action: String,
    pub message: Option<String>,
    pub correlation_id: Option<String>,
    pub payload: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEvent {
    /// Creates a new event for an entity-level action.
    pub fn new(
        entity_name: &str,
        entity_id: Uuid,
        action: &str,
        payload: Option<Value>,
        meta: &RequestMeta,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_time: Utc::now(),
            actor_id: meta.actor_id.clone(),
            entity_name: entity_name.to_string(),
            entity_id: Some(entity_id),
            action: action.to_string(),
            message: None,
            correlation_id: meta.correlation_id.clone(),
            payload,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        }
    }

    /// Attaches a human-readable description for administrators.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Converts the event into its persisted form.
    pub fn into_record(self) -> AuditRecord {
        AuditRecord {
            audit_id: self.event_id,
            event_time: self.event_time,
            actor_id: Some(self.actor_id),
            entity_name: self.entity_name,
            entity_id: self.entity_id,
            action: self.action,
            message: self.message,
            source_service: SOURCE_SERVICE.to_string(),
            correlation_id: self.correlation_id,
            payload: self.payload,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: Utc::now(),
        }
    }
}
