mod common;

use axum::{Extension, Router, routing::get};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use people_service::api::handlers::audit_list_handler;
use people_service::application::services::roles;
use sqlx::PgPool;

fn audit_app(state: people_service::AppState, ctx: people_service::prelude::AuthContext) -> TestServer {
    let app = Router::new()
        .route("/api/v1/audit", get(audit_list_handler))
        .layer(Extension(ctx))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_audit_list_default_order(pool: PgPool) {
    let now = Utc::now();
    common::seed_audit_record(&pool, "CREATE", "EMPLOYEE", now - Duration::hours(2)).await;
    common::seed_audit_record(&pool, "UPDATE", "EMPLOYEE", now - Duration::hours(1)).await;
    common::seed_audit_record(&pool, "TERMINATE", "EMPLOYEE", now).await;

    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(state, common::admin_ctx());

    let response = server.get("/api/v1/audit").await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();

    assert_eq!(body["pagination"]["total_items"], 3);
    // Default ordering is event time ascending.
    assert_eq!(body["items"][0]["action"], "CREATE");
    assert_eq!(body["items"][2]["action"], "TERMINATE");
    // Stored audit id is exposed as event_id.
    assert!(body["items"][0]["event_id"].is_string());
    assert_eq!(body["items"][0]["source_service"], "people-service");
}

#[sqlx::test]
async fn test_audit_list_action_filter(pool: PgPool) {
    let now = Utc::now();
    common::seed_audit_record(&pool, "CREATE", "EMPLOYEE", now).await;
    common::seed_audit_record(&pool, "TERMINATE", "EMPLOYEE", now).await;

    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(state, common::admin_ctx());

    let response = server.get("/api/v1/audit?action=TERMINATE").await;
    let body = response.json::<serde_json::Value>();

    assert_eq!(body["pagination"]["total_items"], 1);
    assert_eq!(body["items"][0]["action"], "TERMINATE");
}

#[sqlx::test]
async fn test_audit_list_search_and_date_range(pool: PgPool) {
    let now = Utc::now();
    common::seed_audit_record(&pool, "CREATE", "EMPLOYEE", now - Duration::days(10)).await;
    common::seed_audit_record(&pool, "CREATE", "EMPLOYEE", now).await;

    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(state, common::admin_ctx());

    // Search matches the entity name case-insensitively.
    let response = server.get("/api/v1/audit?search=employee").await;
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["pagination"]["total_items"], 2);

    // Date range keeps only the recent record.
    let from = (now - Duration::days(1)).to_rfc3339();
    let response = server
        .get(&format!("/api/v1/audit?from={}", urlencode(&from)))
        .await;
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["pagination"]["total_items"], 1);
}

#[sqlx::test]
async fn test_audit_list_pagination_and_sort(pool: PgPool) {
    let now = Utc::now();
    for i in 0..5 {
        common::seed_audit_record(&pool, "CREATE", "EMPLOYEE", now - Duration::hours(i)).await;
    }

    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(state, common::admin_ctx());

    let response = server
        .get("/api/v1/audit?page=1&page_size=2&sort=event_time,desc")
        .await;
    let body = response.json::<serde_json::Value>();

    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let first = body["items"][0]["event_time"].as_str().unwrap().to_string();
    let second = body["items"][1]["event_time"].as_str().unwrap().to_string();
    assert!(first > second);
}

#[sqlx::test]
async fn test_audit_list_requires_role(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(
        state,
        common::ctx_with_roles("reader", &[roles::EMPLOYEE_READ_ALL]),
    );

    let response = server.get("/api/v1/audit").await;

    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body = response.json::<serde_json::Value>();
    assert_eq!(
        body["error"]["details"]["required_role"],
        roles::AUDIT_LOG_READ_ALL
    );
}

#[sqlx::test]
async fn test_audit_list_rejects_unknown_sort_field(pool: PgPool) {
    let (state, _rx) = common::create_test_state(pool);
    let server = audit_app(state, common::admin_ctx());

    let response = server.get("/api/v1/audit?sort=payload").await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

/// Minimal percent-encoding for the RFC3339 `+` offset in query strings.
fn urlencode(value: &str) -> String {
    value.replace('+', "%2B").replace(':', "%3A")
}
