//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, identity provider client setup,
//! audit worker spawning, and Axum server lifecycle.

use crate::application::services::{AuditService, AuthService, EmployeeService};
use crate::config::Config;
use crate::domain::audit_worker::run_audit_worker;
use crate::infrastructure::identity::{IdentityProvider, KeycloakClient};
use crate::infrastructure::persistence::{PgAuditRepository, PgEmployeeRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Schema migrations
/// - Identity provider client
/// - Background audit worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;
    tracing::info!("Migrations applied");

    let identity: Arc<dyn IdentityProvider> = Arc::new(KeycloakClient::new(&config)?);

    let pool = Arc::new(pool);
    let employee_repository = Arc::new(PgEmployeeRepository::new(pool.clone()));
    let audit_repository = Arc::new(PgAuditRepository::new(pool.clone()));

    let (audit_tx, audit_rx) = mpsc::channel(config.audit_queue_capacity);
    tokio::spawn(run_audit_worker(audit_rx, audit_repository.clone()));
    tracing::info!("Audit worker started");

    let state = AppState {
        employee_service: Arc::new(EmployeeService::new(
            employee_repository,
            identity.clone(),
            audit_tx.clone(),
        )),
        audit_service: Arc::new(AuditService::new(audit_repository)),
        auth_service: Arc::new(AuthService::new(identity.clone())),
        identity,
        audit_sender: audit_tx,
        db: pool,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves when the process receives SIGINT.
///
/// Dropping the server also drops the audit sender, letting the worker drain
/// the queue and stop.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
