//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`]; per-endpoint roles are enforced in the
//! handlers.

use crate::api::handlers::{
    assign_group_handler, audit_list_handler, create_employee_handler, get_employee_handler,
    list_employees_handler, remove_group_handler, terminate_employee_handler,
    update_employee_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /employees`                          - List employees (paginated, filtered)
/// - `POST   /employees`                          - Create an employee + identity account
/// - `GET    /employees/{id}`                     - Employee detail (role or owner)
/// - `PUT    /employees/{id}`                     - Update an employee profile
/// - `POST   /employees/{id}/terminate`           - Terminate an employment
/// - `PUT    /hr/employees/{id}/groups/{group}`   - Add employee to a group
/// - `DELETE /hr/employees/{id}/groups/{group}`   - Remove employee from a group
/// - `GET    /audit`                              - Audit trail (paginated, filtered)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route(
            "/employees/{id}",
            get(get_employee_handler).put(update_employee_handler),
        )
        .route("/employees/{id}/terminate", post(terminate_employee_handler))
        .route(
            "/hr/employees/{id}/groups/{group}",
            put(assign_group_handler).delete(remove_group_handler),
        )
        .route("/audit", get(audit_list_handler))
}
