//! Employee entity, the aggregate root of the employee lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::NewAddress;

/// Lifecycle state of an employee.
///
/// Serialized in uppercase both in the API and in the database so the stored
/// value reads the same everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Terminated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "ACTIVE",
            EmployeeStatus::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(EmployeeStatus::Active),
            "TERMINATED" => Ok(EmployeeStatus::Terminated),
            other => Err(format!("unknown employee status '{other}'")),
        }
    }
}

/// Rule violations raised by employee state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmployeeRuleError {
    #[error("Employee is already terminated")]
    AlreadyTerminated,
    #[error("End date cannot be before start date")]
    EndBeforeStart,
}

/// An employee record.
///
/// The id is application-assigned before insert; `subject_id` is the opaque
/// identifier of the matching identity provider account. `version` increments
/// on every profile update and guards against lost updates.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: Uuid,
    pub subject_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: EmployeeStatus,
    pub started_work: Option<NaiveDate>,
    pub end_work: Option<NaiveDate>,
    pub termination_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

impl Employee {
    /// Display name used in API responses.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_terminated(&self) -> bool {
        self.status == EmployeeStatus::Terminated
    }

    /// Applies the termination state transition in memory.
    ///
    /// Rules:
    /// - an already terminated employee cannot be terminated again;
    /// - the end date must not precede the recorded start date.
    ///
    /// The caller persists the resulting state after this returns `Ok`.
    pub fn terminate(&mut self, end_work: NaiveDate, reason: &str) -> Result<(), EmployeeRuleError> {
        if self.status == EmployeeStatus::Terminated {
            return Err(EmployeeRuleError::AlreadyTerminated);
        }

        if let Some(started) = self.started_work {
            if end_work < started {
                return Err(EmployeeRuleError::EndBeforeStart);
            }
        }

        self.status = EmployeeStatus::Terminated;
        self.end_work = Some(end_work);
        self.termination_reason = Some(reason.to_string());

        Ok(())
    }
}

/// Input data for creating a new employee.
///
/// `subject_id` is absent here: it is assigned by the application service
/// after the identity provider account has been created.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub started_work: Option<NaiveDate>,
    pub addresses: Vec<NewAddress>,
}

/// Profile fields that may change after creation.
///
/// Status, dates, and identity linkage are deliberately absent; they change
/// only through dedicated operations.
#[derive(Debug, Clone)]
pub struct EmployeeUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub username: String,
}
