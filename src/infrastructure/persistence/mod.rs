//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with
//! runtime-bound queries; dynamic filters are composed via `QueryBuilder`.
//!
//! # Repositories
//!
//! - [`PgEmployeeRepository`] - Employee aggregate storage and filtering
//! - [`PgAuditRepository`] - Idempotent audit record storage and queries

pub mod pg_audit_repository;
pub mod pg_employee_repository;

pub use pg_audit_repository::PgAuditRepository;
pub use pg_employee_repository::PgEmployeeRepository;
