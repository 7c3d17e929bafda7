//! Background worker persisting audit events.
//!
//! Drains the bounded audit channel and writes each event to the audit log.
//! Delivery is at-least-once: transient insert failures are retried with
//! exponential backoff (1s, 2s, 4s), and duplicate event ids are skipped
//! silently thanks to the idempotent insert.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

use crate::domain::audit_event::AuditEvent;
use crate::domain::repositories::AuditRepository;

/// Number of retries after the initial insert attempt.
const MAX_RETRIES: usize = 3;

/// Runs the audit worker until the channel is closed.
///
/// Intended to be spawned once at startup:
///
/// ```rust,ignore
/// let (tx, rx) = mpsc::channel(config.audit_queue_capacity);
/// tokio::spawn(run_audit_worker(rx, audit_repository));
/// ```
///
/// An event that still fails after all retries is dropped with an error log
/// and a metrics counter; it never blocks the queue.
pub async fn run_audit_worker<R: AuditRepository>(
    mut rx: mpsc::Receiver<AuditEvent>,
    repository: Arc<R>,
) {
    while let Some(event) = rx.recv().await {
        let record = event.into_record();

        // 1s, 2s, 4s between attempts.
        let backoff = ExponentialBackoff::from_millis(2)
            .factor(500)
            .take(MAX_RETRIES);

        let result = Retry::spawn(backoff, || repository.insert(&record)).await;

        match result {
            Ok(true) => {
                metrics::counter!("audit_events_stored_total").increment(1);
                tracing::info!(
                    action = %record.action,
                    entity = %record.entity_name,
                    audit_id = %record.audit_id,
                    "Audit record stored"
                );
            }
            Ok(false) => {
                // At-least-once delivery: a replayed event id already exists.
                metrics::counter!("audit_events_duplicate_total").increment(1);
                tracing::warn!(
                    audit_id = %record.audit_id,
                    "Duplicate audit event skipped"
                );
            }
            Err(e) => {
                metrics::counter!("audit_events_failed_total").increment(1);
                tracing::error!(
                    audit_id = %record.audit_id,
                    error = %e,
                    "Dropping audit event after {MAX_RETRIES} retries"
                );
            }
        }
    }

    tracing::info!("Audit worker stopped (channel closed)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit_event::RequestMeta;
    use crate::domain::repositories::MockAuditRepository;
    use crate::error::AppError;
    use serde_json::json;
    use uuid::Uuid;

    fn test_event() -> AuditEvent {
        AuditEvent::new(
            "EMPLOYEE",
            Uuid::new_v4(),
            "CREATE",
            None,
            &RequestMeta::system(),
        )
    }

    #[tokio::test]
    async fn test_worker_persists_event() {
        let mut repo = MockAuditRepository::new();
        repo.expect_insert().times(1).returning(|_| Ok(true));

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_audit_worker(rx, Arc::new(repo)));

        tx.send(test_event()).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_skips_duplicates_without_retry() {
        let mut repo = MockAuditRepository::new();
        // Duplicate is Ok(false): exactly one attempt, no retries.
        repo.expect_insert().times(1).returning(|_| Ok(false));

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_audit_worker(rx, Arc::new(repo)));

        tx.send(test_event()).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_retries_then_drops() {
        let mut repo = MockAuditRepository::new();
        // Initial attempt + 3 retries, all failing.
        repo.expect_insert()
            .times(4)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_audit_worker(rx, Arc::new(repo)));

        tx.send(test_event()).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_recovers_after_transient_failure() {
        let mut repo = MockAuditRepository::new();
        let mut attempts = 0;
        repo.expect_insert().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(true)
            }
        });

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_audit_worker(rx, Arc::new(repo)));

        tx.send(test_event()).await.unwrap();
        drop(tx);

        handle.await.unwrap();
    }
}
