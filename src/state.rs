//! Shared application state injected into all HTTP handlers.

use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuditService, AuthService, EmployeeService};
use crate::domain::audit_event::AuditEvent;
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::persistence::{PgAuditRepository, PgEmployeeRepository};

/// Application state shared across requests.
///
/// Cloning is cheap: every field is an `Arc` or a channel sender.
#[derive(Clone)]
pub struct AppState {
    pub employee_service: Arc<EmployeeService<PgEmployeeRepository>>,
    pub audit_service: Arc<AuditService<PgAuditRepository>>,
    pub auth_service: Arc<AuthService>,
    /// Direct identity provider handle, used by the health endpoint.
    pub identity: Arc<dyn IdentityProvider>,
    /// Producer side of the audit pipeline, used by the health endpoint.
    pub audit_sender: mpsc::Sender<AuditEvent>,
    /// Connection pool, used by the health endpoint for the database ping.
    pub db: Arc<PgPool>,
}
