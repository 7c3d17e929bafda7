//! PostgreSQL implementation of the audit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::AuditRecord;
use crate::domain::repositories::{AuditFilter, AuditRepository, AuditSort};
use crate::error::AppError;

const AUDIT_COLUMNS: &str = "audit_id, event_time, actor_id, entity_name, entity_id, action, \
     message, source_service, correlation_id, payload, ip_address, user_agent, created_at";

/// PostgreSQL repository for audit records.
pub struct PgAuditRepository {
    pool: Arc<PgPool>,
}

impl PgAuditRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    audit_id: Uuid,
    event_time: DateTime<Utc>,
    actor_id: Option<String>,
    entity_name: String,
    entity_id: Option<Uuid>,
    action: String,
    message: Option<String>,
    source_service: String,
    correlation_id: Option<String>,
    payload: Option<Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditRecord {
    fn from(row: AuditRow) -> Self {
        AuditRecord {
            audit_id: row.audit_id,
            event_time: row.event_time,
            actor_id: row.actor_id,
            entity_name: row.entity_name,
            entity_id: row.entity_id,
            action: row.action,
            message: row.message,
            source_service: row.source_service,
            correlation_id: row.correlation_id,
            payload: row.payload,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

fn sort_column(sort: AuditSort) -> &'static str {
    match sort {
        AuditSort::EventTime => "event_time",
        AuditSort::Action => "action",
        AuditSort::CreatedAt => "created_at",
    }
}

/// Appends the WHERE conditions shared by `list` and `count`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    if let Some(action) = &filter.action {
        qb.push(" AND action = ").push_bind(action.clone());
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        qb.push(" AND (lower(action) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(entity_name) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(from) = filter.from {
        qb.push(" AND event_time >= ").push_bind(from);
    }

    if let Some(to) = filter.to {
        qb.push(" AND event_time <= ").push_bind(to);
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn insert(&self, record: &AuditRecord) -> Result<bool, AppError> {
        // ON CONFLICT DO NOTHING makes the at-least-once pipeline idempotent:
        // a replayed event id affects zero rows instead of erroring.
        let result = sqlx::query(
            r#"
            INSERT INTO audit_log (
                audit_id, event_time, actor_id, entity_name, entity_id, action,
                message, source_service, correlation_id, payload, ip_address,
                user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (audit_id) DO NOTHING
            "#,
        )
        .bind(record.audit_id)
        .bind(record.event_time)
        .bind(&record.actor_id)
        .bind(&record.entity_name)
        .bind(record.entity_id)
        .bind(&record.action)
        .bind(&record.message)
        .bind(&record.source_service)
        .bind(&record.correlation_id)
        .bind(&record.payload)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_log WHERE 1=1"));

        push_filter(&mut qb, filter);

        qb.push(" ORDER BY ")
            .push(sort_column(filter.sort))
            .push(if filter.descending { " DESC" } else { " ASC" })
            .push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows: Vec<AuditRow> = qb.build_query_as().fetch_all(self.pool.as_ref()).await?;

        Ok(rows.into_iter().map(AuditRecord::from).collect())
    }

    async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_log WHERE 1=1");

        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM audit_log WHERE event_time < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
