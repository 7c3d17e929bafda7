//! Repository trait for employee data access.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::{Address, Employee, EmployeeStatus, EmployeeUpdate};
use crate::error::AppError;

/// Sortable columns for employee listings.
///
/// A closed set so user-supplied sort keys can never reach SQL directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSort {
    LastName,
    FirstName,
    Email,
    StartedWork,
    CreatedAt,
}

/// Dynamic filter for employee queries.
///
/// Composed by the API layer from query parameters; the infrastructure layer
/// translates it into a WHERE clause. Mirrors the builder style used by the
/// other filters in this crate.
#[derive(Debug, Clone)]
pub struct EmployeeFilter {
    pub offset: i64,
    pub limit: i64,
    /// Case-insensitive substring match over first name, last name, or email.
    pub search: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub sort: EmployeeSort,
    pub descending: bool,
}

impl EmployeeFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            search: None,
            status: None,
            sort: EmployeeSort::LastName,
            descending: false,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_status(mut self, status: Option<EmployeeStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_sort(mut self, sort: EmployeeSort, descending: bool) -> Self {
        self.sort = sort;
        self.descending = descending;
        self
    }
}

/// Repository interface for the employee aggregate.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgEmployeeRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_employee.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Inserts an employee and its addresses in a single transaction.
    ///
    /// All ids are assigned by the caller before insert.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when email, username, or subject id
    /// collide with an existing row. Returns [`AppError::Internal`] on other
    /// database errors.
    async fn insert(&self, employee: &Employee, addresses: &[Address]) -> Result<(), AppError>;

    /// Finds an employee by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError>;

    /// Lists the addresses attached to an employee.
    async fn addresses_for(&self, employee_id: Uuid) -> Result<Vec<Address>, AppError>;

    /// Returns true when an employee with the given email exists.
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Returns true when an employee with the given username exists.
    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    /// Lists employees matching the filter, honoring pagination and sorting.
    async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError>;

    /// Counts employees matching the filter (pagination bounds ignored).
    async fn count(&self, filter: &EmployeeFilter) -> Result<i64, AppError>;

    /// Applies a profile update, bumping `version` and `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no employee matches `id`.
    /// Returns [`AppError::Conflict`] when the new username is taken.
    async fn update_profile(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
        actor: Option<Uuid>,
    ) -> Result<Employee, AppError>;

    /// Persists a termination decided by the domain layer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no employee matches `id`.
    async fn record_termination(
        &self,
        id: Uuid,
        end_work: NaiveDate,
        reason: &str,
        actor: Option<Uuid>,
    ) -> Result<Employee, AppError>;
}
