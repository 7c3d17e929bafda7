//! Employee lifecycle orchestration.
//!
//! Coordinates the repository, the identity provider, and the audit pipeline.
//! The identity provider holds the source of truth for credentials, the local
//! database for employment data; every mutation keeps the two consistent with
//! explicit compensation when the second write fails.

use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::audit_event::{AuditEvent, RequestMeta};
use crate::domain::entities::{
    Address, Employee, EmployeeRuleError, EmployeeStatus, EmployeeUpdate, NewEmployee,
};
use crate::domain::repositories::{EmployeeFilter, EmployeeRepository};
use crate::error::AppError;
use crate::infrastructure::identity::{IdentityProvider, IdentityUserUpdate, NewIdentityUser};
use crate::utils::temp_password::generate_temp_password;

/// Entity name stamped on audit events emitted by this service.
const ENTITY_NAME: &str = "EMPLOYEE";

/// Service for managing the employee lifecycle.
pub struct EmployeeService<E: EmployeeRepository> {
    repository: Arc<E>,
    identity: Arc<dyn IdentityProvider>,
    audit_sender: mpsc::Sender<AuditEvent>,
}

impl<E: EmployeeRepository> EmployeeService<E> {
    /// Creates a new employee service.
    pub fn new(
        repository: Arc<E>,
        identity: Arc<dyn IdentityProvider>,
        audit_sender: mpsc::Sender<AuditEvent>,
    ) -> Self {
        Self {
            repository,
            identity,
            audit_sender,
        }
    }

    /// Creates an employee and its identity provider account.
    ///
    /// # Flow
    ///
    /// 1. Fail-fast uniqueness checks on email and username (saves the
    ///    identity provider round trip on obvious conflicts)
    /// 2. Provision the identity provider account (temporary password,
    ///    forced change on first login)
    /// 3. Persist employee + addresses in one transaction
    /// 4. Emit a `CREATE` audit event
    ///
    /// # Compensation
    ///
    /// If step 3 fails, the freshly created identity provider account is
    /// deleted so no orphaned login remains. The compensation itself is
    /// best-effort; its failure is logged and the original error surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when email or username is taken (local
    /// or provider side), [`AppError::Dependency`] when the provider is
    /// unreachable.
    pub async fn create_employee(
        &self,
        input: NewEmployee,
        meta: &RequestMeta,
    ) -> Result<(Employee, Vec<Address>), AppError> {
        tracing::info!(email = %input.email, username = %input.username, "Creating employee");

        if self.repository.exists_by_email(&input.email).await? {
            return Err(AppError::conflict(
                "Employee with this email already exists",
                json!({ "email": input.email }),
            ));
        }

        if self.repository.exists_by_username(&input.username).await? {
            return Err(AppError::conflict(
                "Username already exists",
                json!({ "username": input.username }),
            ));
        }

        let subject_id = self
            .identity
            .create_user(&NewIdentityUser {
                username: input.username.clone(),
                email: input.email.clone(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                temporary_password: generate_temp_password(),
            })
            .await?;

        let actor = actor_uuid(meta);
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            subject_id: subject_id.clone(),
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            status: EmployeeStatus::Active,
            started_work: input.started_work,
            end_work: None,
            termination_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
            created_by: actor,
            updated_by: actor,
        };

        let addresses: Vec<Address> = input
            .addresses
            .into_iter()
            .map(|a| Address {
                id: Uuid::new_v4(),
                employee_id: employee.id,
                kind: a.kind,
                street: a.street,
                city: a.city,
                postal_code: a.postal_code,
                country: a.country,
                created_at: now,
                updated_at: now,
            })
            .collect();

        if let Err(e) = self.repository.insert(&employee, &addresses).await {
            // The account exists but the employee does not: undo the account
            // so the username stays claimable.
            tracing::error!(error = %e, %subject_id, "Database insert failed, rolling back identity provider user");
            if let Err(cleanup) = self.identity.delete_user(&subject_id).await {
                tracing::error!(
                    error = %cleanup,
                    %subject_id,
                    "Identity provider rollback failed, manual cleanup required"
                );
            }
            return Err(e);
        }

        self.emit(
            AuditEvent::new(
                ENTITY_NAME,
                employee.id,
                "CREATE",
                Some(json!({
                    "id": employee.id,
                    "full_name": employee.full_name(),
                    "email": employee.email,
                    "username": employee.username,
                    "status": employee.status.as_str(),
                    "started_work": employee.started_work,
                })),
                meta,
            )
            .with_message(format!("Employee {} created", employee.full_name())),
        );

        tracing::info!(employee_id = %employee.id, %subject_id, "Employee created");

        Ok((employee, addresses))
    }

    /// Fetches an employee with addresses.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no employee matches the id.
    pub async fn get_employee(&self, id: Uuid) -> Result<(Employee, Vec<Address>), AppError> {
        let employee = self.require_employee(id).await?;
        let addresses = self.repository.addresses_for(id).await?;

        Ok((employee, addresses))
    }

    /// Lists employees with the total count for pagination metadata.
    pub async fn list_employees(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<(Vec<Employee>, i64), AppError> {
        tokio::try_join!(self.repository.list(filter), self.repository.count(filter))
    }

    /// Updates an employee profile, pushing the change to the identity
    /// provider first.
    ///
    /// # Compensation
    ///
    /// The provider account is snapshotted before the update; if the local
    /// write fails afterwards, the snapshot is written back. A failed
    /// restore leaves the two systems inconsistent and is logged as critical.
    pub async fn update_employee(
        &self,
        id: Uuid,
        update: EmployeeUpdate,
        meta: &RequestMeta,
    ) -> Result<Employee, AppError> {
        tracing::info!(employee_id = %id, "Updating employee");

        let employee = self.require_employee(id).await?;

        let snapshot = self.identity.get_user(&employee.subject_id).await?;

        self.identity
            .update_user(
                &employee.subject_id,
                &IdentityUserUpdate {
                    username: update.username.clone(),
                    first_name: update.first_name.clone(),
                    last_name: update.last_name.clone(),
                },
            )
            .await?;

        let actor = actor_uuid(meta);
        let saved = match self.repository.update_profile(id, &update, actor).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(employee_id = %id, "Database update failed, reverting identity provider user");
                if let Err(revert) = self
                    .identity
                    .restore_user(&employee.subject_id, &snapshot)
                    .await
                {
                    tracing::error!(
                        error = %revert,
                        subject_id = %employee.subject_id,
                        "CRITICAL: identity provider revert failed, data is inconsistent"
                    );
                }
                return Err(e);
            }
        };

        self.emit(
            AuditEvent::new(
                ENTITY_NAME,
                saved.id,
                "UPDATE",
                Some(json!({
                    "first_name": saved.first_name,
                    "last_name": saved.last_name,
                    "phone": saved.phone,
                    "username": saved.username,
                })),
                meta,
            )
            .with_message(format!("Employee {} updated", saved.full_name())),
        );

        Ok(saved)
    }

    /// Terminates an employment.
    ///
    /// The state transition rules live on the entity; this method loads,
    /// decides, persists, and emits the audit event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] for a second termination and
    /// [`AppError::Validation`] when the end date precedes the start date.
    pub async fn terminate_employee(
        &self,
        id: Uuid,
        end_work: NaiveDate,
        reason: &str,
        meta: &RequestMeta,
    ) -> Result<(), AppError> {
        tracing::info!(employee_id = %id, "Terminating employee");

        let mut employee = self.require_employee(id).await?;

        employee
            .terminate(end_work, reason)
            .map_err(|e| match e {
                EmployeeRuleError::AlreadyTerminated => {
                    AppError::conflict(e.to_string(), json!({ "employee_id": id }))
                }
                EmployeeRuleError::EndBeforeStart => AppError::bad_request(
                    e.to_string(),
                    json!({ "end_work": end_work, "started_work": employee.started_work }),
                ),
            })?;

        let saved = self
            .repository
            .record_termination(id, end_work, reason, actor_uuid(meta))
            .await?;

        self.emit(
            AuditEvent::new(
                ENTITY_NAME,
                saved.id,
                "TERMINATE",
                Some(json!({ "end_work": end_work, "reason": reason })),
                meta,
            )
            .with_message(format!("Employee {} terminated", saved.full_name())),
        );

        Ok(())
    }

    /// Adds the employee's identity provider account to a group.
    ///
    /// Group names are normalized to uppercase before lookup.
    pub async fn assign_group(&self, id: Uuid, group: &str) -> Result<(), AppError> {
        let employee = self.require_employee(id).await?;
        self.identity
            .assign_group(&employee.subject_id, &group.to_uppercase())
            .await
    }

    /// Removes the employee's identity provider account from a group.
    pub async fn remove_group(&self, id: Uuid, group: &str) -> Result<(), AppError> {
        let employee = self.require_employee(id).await?;
        self.identity
            .remove_group(&employee.subject_id, &group.to_uppercase())
            .await
    }

    async fn require_employee(&self, id: Uuid) -> Result<Employee, AppError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            AppError::not_found("Employee not found", json!({ "employee_id": id }))
        })
    }

    /// Queues an audit event; a full queue drops the event with a warning.
    fn emit(&self, event: AuditEvent) {
        if let Err(e) = self.audit_sender.try_send(event) {
            metrics::counter!("audit_events_dropped_total").increment(1);
            tracing::warn!(error = %e, "Audit queue full, event dropped");
        }
    }
}

fn actor_uuid(meta: &RequestMeta) -> Option<Uuid> {
    Uuid::parse_str(&meta.actor_id).ok()
}
