//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`EmployeeRepository`] - Employee aggregate CRUD and filtering
//! - [`AuditRepository`] - Idempotent audit record storage and queries
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod audit_repository;
pub mod employee_repository;

pub use audit_repository::{AuditFilter, AuditRepository, AuditSort};
pub use employee_repository::{EmployeeFilter, EmployeeRepository, EmployeeSort};

#[cfg(test)]
pub use audit_repository::MockAuditRepository;
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
