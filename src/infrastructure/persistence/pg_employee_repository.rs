//! PostgreSQL implementation of the employee repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Address, Employee, EmployeeUpdate};
use crate::domain::repositories::{EmployeeFilter, EmployeeRepository, EmployeeSort};
use crate::error::AppError;

const EMPLOYEE_COLUMNS: &str = "employee_id, subject_id, username, first_name, last_name, email, \
     phone, status, started_work, end_work, termination_reason, version, \
     created_at, updated_at, created_by, updated_by";

/// PostgreSQL repository for the employee aggregate.
///
/// Dynamic filters are composed with [`QueryBuilder`] so optional criteria
/// never require hand-assembled SQL strings with positional gymnastics.
pub struct PgEmployeeRepository {
    pool: Arc<PgPool>,
}

impl PgEmployeeRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: Uuid,
    subject_id: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    status: String,
    started_work: Option<NaiveDate>,
    end_work: Option<NaiveDate>,
    termination_reason: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
}

impl EmployeeRow {
    fn into_entity(self) -> Result<Employee, AppError> {
        let status = self.status.parse().map_err(|e: String| {
            AppError::internal("Corrupt employee status in database", json!({ "reason": e }))
        })?;

        Ok(Employee {
            id: self.employee_id,
            subject_id: self.subject_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            status,
            started_work: self.started_work,
            end_work: self.end_work,
            termination_reason: self.termination_reason,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    address_id: Uuid,
    employee_id: Uuid,
    kind: String,
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AddressRow {
    fn into_entity(self) -> Result<Address, AppError> {
        let kind = self.kind.parse().map_err(|e: String| {
            AppError::internal("Corrupt address kind in database", json!({ "reason": e }))
        })?;

        Ok(Address {
            id: self.address_id,
            employee_id: self.employee_id,
            kind,
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn sort_column(sort: EmployeeSort) -> &'static str {
    match sort {
        EmployeeSort::LastName => "last_name",
        EmployeeSort::FirstName => "first_name",
        EmployeeSort::Email => "email",
        EmployeeSort::StartedWork => "started_work",
        EmployeeSort::CreatedAt => "created_at",
    }
}

/// Appends the WHERE conditions shared by `list` and `count`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        qb.push(" AND (lower(first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(email) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn insert(&self, employee: &Employee, addresses: &[Address]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO employees (
                employee_id, subject_id, username, first_name, last_name, email,
                phone, status, started_work, version, created_at, updated_at,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(employee.id)
        .bind(&employee.subject_id)
        .bind(&employee.username)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.status.as_str())
        .bind(employee.started_work)
        .bind(employee.version)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .bind(employee.created_by)
        .bind(employee.updated_by)
        .execute(&mut *tx)
        .await?;

        for address in addresses {
            sqlx::query(
                r#"
                INSERT INTO addresses (
                    address_id, employee_id, kind, street, city, postal_code,
                    country, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(address.id)
            .bind(address.employee_id)
            .bind(address.kind.as_str())
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.postal_code)
            .bind(&address.country)
            .bind(address.created_at)
            .bind(address.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(EmployeeRow::into_entity).transpose()
    }

    async fn addresses_for(&self, employee_id: Uuid) -> Result<Vec<Address>, AppError> {
        let rows: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT address_id, employee_id, kind, street, city, postal_code,
                   country, created_at, updated_at
            FROM addresses
            WHERE employee_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(employee_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(AddressRow::into_entity).collect()
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE lower(username) = lower($1))",
        )
        .bind(username)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE 1=1"));

        push_filter(&mut qb, filter);

        qb.push(" ORDER BY ")
            .push(sort_column(filter.sort))
            .push(if filter.descending { " DESC" } else { " ASC" })
            .push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows: Vec<EmployeeRow> = qb.build_query_as().fetch_all(self.pool.as_ref()).await?;

        rows.into_iter().map(EmployeeRow::into_entity).collect()
    }

    async fn count(&self, filter: &EmployeeFilter) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM employees WHERE 1=1");

        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
        actor: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            r#"
            UPDATE employees
            SET first_name = $2,
                last_name = $3,
                phone = $4,
                username = $5,
                version = version + 1,
                updated_at = now(),
                updated_by = $6
            WHERE employee_id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(&update.username)
        .bind(actor)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(EmployeeRow::into_entity).transpose()?.ok_or_else(|| {
            AppError::not_found("Employee not found", json!({ "employee_id": id }))
        })
    }

    async fn record_termination(
        &self,
        id: Uuid,
        end_work: NaiveDate,
        reason: &str,
        actor: Option<Uuid>,
    ) -> Result<Employee, AppError> {
        let row: Option<EmployeeRow> = sqlx::query_as(&format!(
            r#"
            UPDATE employees
            SET status = 'TERMINATED',
                end_work = $2,
                termination_reason = $3,
                version = version + 1,
                updated_at = now(),
                updated_by = $4
            WHERE employee_id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(end_work)
        .bind(reason)
        .bind(actor)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(EmployeeRow::into_entity).transpose()?.ok_or_else(|| {
            AppError::not_found("Employee not found", json!({ "employee_id": id }))
        })
    }
}
