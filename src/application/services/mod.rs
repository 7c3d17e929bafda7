//! Business logic services for the application layer.

pub mod audit_service;
pub mod auth_service;
pub mod employee_service;

pub use audit_service::AuditService;
pub use auth_service::{AuthContext, AuthService, roles};
pub use employee_service::EmployeeService;
