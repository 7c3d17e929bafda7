//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Round-trip ping
/// 2. **Audit Queue**: Channel open, remaining capacity reported
/// 3. **Identity Provider**: Realm endpoint reachable
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let queue_check = check_audit_queue(&state);
    let idp_check = check_identity_provider(&state).await;

    let all_healthy =
        db_check.status == "ok" && queue_check.status == "ok" && idp_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            audit_queue: queue_check,
            identity_provider: idp_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks database connectivity with a trivial query.
async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.db.as_ref())
        .await
    {
        Ok(_) => CheckStatus {
            status: "ok".to_string(),
            message: Some("Connected".to_string()),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {}", e)),
        },
    }
}

/// Checks if the audit event queue is operational.
fn check_audit_queue(state: &AppState) -> CheckStatus {
    if state.audit_sender.is_closed() {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Audit queue is closed".to_string()),
        }
    } else {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("Capacity: {}", state.audit_sender.capacity())),
        }
    }
}

/// Checks identity provider reachability.
async fn check_identity_provider(state: &AppState) -> CheckStatus {
    if state.identity.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some("Identity provider reachable".to_string()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Identity provider unreachable".to_string()),
        }
    }
}
