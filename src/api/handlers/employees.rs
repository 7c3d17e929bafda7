//! Handlers for employee lifecycle endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::employee::{
    CreateEmployeeRequest, EmployeeListResponse, EmployeeQueryParams, EmployeeResponse,
    TerminateEmployeeRequest, UpdateEmployeeRequest,
};
use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::{AuthContext, roles};
use crate::domain::repositories::EmployeeFilter;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_meta::request_meta;

/// Creates an employee together with its identity provider account.
///
/// # Endpoint
///
/// `POST /api/v1/employees`
///
/// Requires role `EMPLOYEE:CREATE`.
///
/// # Request Body
///
/// ```json
/// {
///   "first_name": "Jane",
///   "last_name": "Doe",
///   "email": "jane@example.com",
///   "phone": "+421900123456",
///   "username": "jane.doe",
///   "started_work": "2026-02-01",
///   "addresses": [
///     { "kind": "HOME", "street": "Main St 1", "city": "Springfield" }
///   ]
/// }
/// ```
///
/// # Response
///
/// `201 Created` with a `Location` header pointing at the new resource and
/// the full representation in the body.
///
/// # Errors
///
/// - 400 Bad Request on validation failure
/// - 409 Conflict when email or username is already taken
/// - 502 Bad Gateway when the identity provider is unreachable
pub async fn create_employee_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<EmployeeResponse>), AppError> {
    ctx.require_role(roles::EMPLOYEE_CREATE)?;
    payload.validate()?;

    let meta = request_meta(&ctx, &headers);

    let (employee, addresses) = state
        .employee_service
        .create_employee(payload.into_new_employee(), &meta)
        .await?;

    let location = format!("/api/v1/employees/{}", employee.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(EmployeeResponse::detail(&employee, &addresses)),
    ))
}

/// Retrieves a single employee.
///
/// # Endpoint
///
/// `GET /api/v1/employees/{id}`
///
/// Requires role `EMPLOYEE:READ`, **or** the caller must be the owner of the
/// record (token subject matches the employee's identity provider id).
///
/// For callers without the role, a missing employee yields 403 rather than
/// 404 so the existence of records is not revealed.
pub async fn get_employee_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<EmployeeResponse>, AppError> {
    if ctx.has_role(roles::EMPLOYEE_READ) {
        let (employee, addresses) = state.employee_service.get_employee(id).await?;
        return Ok(Json(EmployeeResponse::detail(&employee, &addresses)));
    }

    // Owner check path: hide not-found behind forbidden.
    match state.employee_service.get_employee(id).await {
        Ok((employee, addresses)) if employee.subject_id == ctx.subject => {
            Ok(Json(EmployeeResponse::detail(&employee, &addresses)))
        }
        Ok(_) | Err(AppError::NotFound { .. }) => {
            tracing::warn!(subject = %ctx.subject, employee_id = %id, "Denied employee access");
            Err(AppError::forbidden(
                "You do not have permission to access this resource",
                json!({ "required_role": roles::EMPLOYEE_READ }),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Lists employees with filtering and pagination.
///
/// # Endpoint
///
/// `GET /api/v1/employees`
///
/// Requires role `EMPLOYEE:READ_ALL`.
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 20, max: 200)
/// - `search` (optional): Substring over first name, last name, or email
/// - `status` (optional): `ACTIVE` or `TERMINATED`
/// - `sort` (optional): `field` or `field,desc`; fields: `last_name`,
///   `first_name`, `email`, `started_work`, `created_at`
///
/// # Examples
///
/// - `GET /api/v1/employees?status=ACTIVE&search=jan`
/// - `GET /api/v1/employees?page=2&page_size=10&sort=last_name,desc`
pub async fn list_employees_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<EmployeeQueryParams>,
) -> Result<Json<EmployeeListResponse>, AppError> {
    ctx.require_role(roles::EMPLOYEE_READ_ALL)?;

    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (sort, descending) = params
        .sort_params()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let filter = EmployeeFilter::new(offset, limit)
        .with_search(params.search.clone())
        .with_status(params.status)
        .with_sort(sort, descending);

    let (employees, total_items) = state.employee_service.list_employees(&filter).await?;

    let items = employees.iter().map(EmployeeResponse::summary).collect();

    Ok(Json(EmployeeListResponse {
        pagination: PaginationMeta::new(
            params.pagination.page(),
            params.pagination.page_size(),
            total_items,
        ),
        items,
    }))
}

/// Updates an employee profile.
///
/// # Endpoint
///
/// `PUT /api/v1/employees/{id}`
///
/// Requires role `EMPLOYEE:UPDATE`.
///
/// The change is pushed to the identity provider first; a failed local write
/// reverts the provider to its previous state.
pub async fn update_employee_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    ctx.require_role(roles::EMPLOYEE_UPDATE)?;
    payload.validate()?;

    let meta = request_meta(&ctx, &headers);

    state
        .employee_service
        .update_employee(id, payload.into_update(), &meta)
        .await?;

    let (employee, addresses) = state.employee_service.get_employee(id).await?;

    Ok(Json(EmployeeResponse::detail(&employee, &addresses)))
}

/// Terminates an employment.
///
/// # Endpoint
///
/// `POST /api/v1/employees/{id}/terminate`
///
/// Requires role `EMPLOYEE:TERMINATE`.
///
/// # Errors
///
/// - 400 Bad Request when the end date precedes the start date
/// - 404 Not Found for an unknown employee
/// - 409 Conflict when the employee is already terminated
///
/// # Response
///
/// `204 No Content`.
pub async fn terminate_employee_handler(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Json(payload): Json<TerminateEmployeeRequest>,
) -> Result<StatusCode, AppError> {
    ctx.require_role(roles::EMPLOYEE_TERMINATE)?;
    payload.validate()?;

    let meta = request_meta(&ctx, &headers);

    state
        .employee_service
        .terminate_employee(id, payload.end_work, &payload.reason, &meta)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
