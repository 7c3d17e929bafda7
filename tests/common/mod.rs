#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use people_service::application::services::{AuditService, AuthContext, AuthService, EmployeeService};
use people_service::domain::audit_event::AuditEvent;
use people_service::error::AppError;
use people_service::infrastructure::identity::{
    IdentityProvider, IdentityUser, IdentityUserUpdate, NewIdentityUser, TokenIntrospection,
};
use people_service::infrastructure::persistence::{PgAuditRepository, PgEmployeeRepository};
use people_service::state::AppState;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// In-memory identity provider for integration tests.
///
/// Provisioning succeeds with generated subjects; introspection accepts the
/// token "test-token" with every role.
#[derive(Default)]
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn introspect(&self, token: &str) -> Result<TokenIntrospection, AppError> {
        if token == "test-token" {
            Ok(TokenIntrospection {
                active: true,
                subject: Some("test-subject".to_string()),
                username: Some("tester".to_string()),
                roles: all_roles(),
            })
        } else {
            Ok(TokenIntrospection {
                active: false,
                subject: None,
                username: None,
                roles: vec![],
            })
        }
    }

    async fn create_user(&self, _user: &NewIdentityUser) -> Result<String, AppError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn get_user(&self, subject: &str) -> Result<IdentityUser, AppError> {
        Ok(IdentityUser {
            subject: subject.to_string(),
            username: "stub".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            enabled: true,
        })
    }

    async fn update_user(
        &self,
        _subject: &str,
        _update: &IdentityUserUpdate,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn restore_user(&self, _subject: &str, _snapshot: &IdentityUser) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete_user(&self, _subject: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn assign_group(&self, _subject: &str, group: &str) -> Result<(), AppError> {
        if group == "MISSING" {
            return Err(AppError::not_found(
                "Group not found in identity provider",
                json!({ "group": group }),
            ));
        }
        Ok(())
    }

    async fn remove_group(&self, _subject: &str, _group: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn all_roles() -> Vec<String> {
    use people_service::application::services::roles;
    [
        roles::EMPLOYEE_CREATE,
        roles::EMPLOYEE_READ,
        roles::EMPLOYEE_READ_ALL,
        roles::EMPLOYEE_UPDATE,
        roles::EMPLOYEE_TERMINATE,
        roles::AUDIT_LOG_READ_ALL,
        roles::MANAGE_ROLES,
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

/// Auth context carrying every role.
pub fn admin_ctx() -> AuthContext {
    AuthContext::new("admin-subject".to_string(), Some("admin".to_string()), all_roles())
}

/// Auth context with an explicit role set.
pub fn ctx_with_roles(subject: &str, roles: &[&str]) -> AuthContext {
    AuthContext::new(
        subject.to_string(),
        None,
        roles.iter().map(|r| r.to_string()).collect(),
    )
}

pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<AuditEvent>) {
    let pool = Arc::new(pool);
    let (tx, rx) = mpsc::channel(100);

    let employee_repo = Arc::new(PgEmployeeRepository::new(pool.clone()));
    let audit_repo = Arc::new(PgAuditRepository::new(pool.clone()));
    let identity: Arc<dyn IdentityProvider> = Arc::new(StubIdentityProvider);

    let state = AppState {
        employee_service: Arc::new(EmployeeService::new(
            employee_repo,
            identity.clone(),
            tx.clone(),
        )),
        audit_service: Arc::new(AuditService::new(audit_repo)),
        auth_service: Arc::new(AuthService::new(identity.clone())),
        identity,
        audit_sender: tx,
        db: pool,
    };

    (state, rx)
}

/// Inserts an employee row directly; returns its id.
pub async fn seed_employee(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    username: &str,
    status: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO employees (
            employee_id, subject_id, username, first_name, last_name, email,
            status, started_work
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, '2024-03-01')
        "#,
    )
    .bind(id)
    .bind(format!("subject-{id}"))
    .bind(username)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(status)
    .execute(pool)
    .await
    .unwrap();

    id
}

/// Inserts an address row for an employee.
pub async fn seed_address(pool: &PgPool, employee_id: Uuid, street: &str, city: &str) {
    sqlx::query(
        r#"
        INSERT INTO addresses (address_id, employee_id, kind, street, city)
        VALUES ($1, $2, 'HOME', $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(street)
    .bind(city)
    .execute(pool)
    .await
    .unwrap();
}

/// Inserts an audit record directly; returns its id.
pub async fn seed_audit_record(
    pool: &PgPool,
    action: &str,
    entity_name: &str,
    event_time: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_log (
            audit_id, event_time, actor_id, entity_name, entity_id, action,
            message, source_service
        )
        VALUES ($1, $2, 'seed-actor', $3, $4, $5, 'seeded', 'people-service')
        "#,
    )
    .bind(id)
    .bind(event_time)
    .bind(entity_name)
    .bind(Uuid::new_v4())
    .bind(action)
    .execute(pool)
    .await
    .unwrap();

    id
}

/// Looks up the subject id stored for an employee.
pub async fn subject_of(pool: &PgPool, employee_id: Uuid) -> String {
    sqlx::query_scalar("SELECT subject_id FROM employees WHERE employee_id = $1")
        .bind(employee_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
