//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Employee`] - An employee record, root of the employee aggregate
//! - [`Address`] - A postal address attached to an employee
//! - [`AuditRecord`] - An immutable audit trail row
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewEmployee`, `NewAddress` - For creating new records
//! - `EmployeeUpdate` - For profile updates
//!
//! State transitions with business rules (termination) live on the entity
//! itself; services orchestrate, entities decide.

pub mod address;
pub mod audit_record;
pub mod employee;

pub use address::{Address, AddressKind, NewAddress};
pub use audit_record::AuditRecord;
pub use employee::{Employee, EmployeeRuleError, EmployeeStatus, EmployeeUpdate, NewEmployee};
