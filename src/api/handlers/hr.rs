//! Handlers for HR group management endpoints.
//!
//! HR managers assign employees to identity provider groups (departments,
//! positions); group membership is what grants roles on tokens.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::application::services::{AuthContext, roles};
use crate::error::AppError;
use crate::state::AppState;

/// Adds an employee to an identity provider group.
///
/// # Endpoint
///
/// `PUT /api/v1/hr/employees/{id}/groups/{group}`
///
/// Requires role `MANAGE_ROLES`.
///
/// Group names are matched case-insensitively; `manager` and `MANAGER`
/// address the same group.
///
/// # Errors
///
/// - 404 Not Found for an unknown employee or group
///
/// # Response
///
/// `204 No Content`.
pub async fn assign_group_handler(
    Path((id, group)): Path<(Uuid, String)>,
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    ctx.require_role(roles::MANAGE_ROLES)?;

    state.employee_service.assign_group(id, &group).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes an employee from an identity provider group.
///
/// # Endpoint
///
/// `DELETE /api/v1/hr/employees/{id}/groups/{group}`
///
/// Requires role `MANAGE_ROLES`.
///
/// # Response
///
/// `204 No Content`.
pub async fn remove_group_handler(
    Path((id, group)): Path<(Uuid, String)>,
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    ctx.require_role(roles::MANAGE_ROLES)?;

    state.employee_service.remove_group(id, &group).await?;

    Ok(StatusCode::NO_CONTENT)
}
