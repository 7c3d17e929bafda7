//! Handler for audit trail queries.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde_json::json;

use crate::api::dto::audit::{AuditListResponse, AuditQueryParams, AuditRecordResponse};
use crate::api::dto::pagination::PaginationMeta;
use crate::application::services::{AuthContext, roles};
use crate::domain::repositories::AuditFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Lists audit records for administrators.
///
/// # Endpoint
///
/// `GET /api/v1/audit`
///
/// Requires role `AUDIT_LOG:READ_ALL`.
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 20, max: 200)
/// - `search` (optional): Substring over action or entity name
/// - `action` (optional): Exact action, e.g. `CREATE`
/// - `from` / `to` (optional): RFC3339 bounds on event time
/// - `sort` (optional): `field` or `field,desc`; fields: `event_time`,
///   `action`, `created_at`
///
/// # Examples
///
/// - `GET /api/v1/audit?action=TERMINATE`
/// - `GET /api/v1/audit?page=1&page_size=5&sort=event_time,desc`
/// - `GET /api/v1/audit?from=2026-01-01T00:00:00Z&search=employee`
pub async fn audit_list_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditListResponse>, AppError> {
    ctx.require_role(roles::AUDIT_LOG_READ_ALL)?;

    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (sort, descending) = params
        .sort_params()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let filter = AuditFilter::new(offset, limit)
        .with_search(params.search.clone())
        .with_action(params.action.clone())
        .with_date_range(params.date_filter.from, params.date_filter.to)
        .with_sort(sort, descending);

    let (records, total_items) = state.audit_service.list_records(&filter).await?;

    let items = records.into_iter().map(AuditRecordResponse::from).collect();

    Ok(Json(AuditListResponse {
        pagination: PaginationMeta::new(
            params.pagination.page(),
            params.pagination.page_size(),
            total_items,
        ),
        items,
    }))
}
