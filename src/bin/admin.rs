//! CLI administration tool for people-service.
//!
//! Provides commands for inspecting the employee directory, reviewing and
//! pruning the audit trail, and checking the database without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show employee and audit counts
//! cargo run --bin admin -- stats
//!
//! # Print the 20 most recent audit records
//! cargo run --bin admin -- audit tail
//!
//! # Delete audit records older than a cutoff (asks for confirmation)
//! cargo run --bin admin -- audit purge --before 2026-01-01T00:00:00Z
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use people_service::domain::repositories::{AuditFilter, AuditRepository, AuditSort};
use people_service::infrastructure::persistence::PgAuditRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing people-service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// Audit trail operations
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Audit trail subcommands.
#[derive(Subcommand)]
enum AuditAction {
    /// Print the most recent audit records
    Tail {
        /// Number of records to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Delete audit records with event time before the cutoff
    Purge {
        /// RFC3339 cutoff, e.g. 2026-01-01T00:00:00Z
        #[arg(short, long)]
        before: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Audit { action } => handle_audit_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Employee counts by status
/// - Total number of audit records
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "People Service Statistics".bright_blue().bold());
    println!();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;

    let active: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE status = 'ACTIVE'")
            .fetch_one(pool)
            .await?;

    let terminated: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE status = 'TERMINATED'")
            .fetch_one(pool)
            .await?;

    let audit_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
        .fetch_one(pool)
        .await?;

    println!(
        "  Employees:     {}",
        total.to_string().bright_green().bold()
    );
    println!(
        "    Active:      {}",
        active.to_string().bright_green()
    );
    println!(
        "    Terminated:  {}",
        terminated.to_string().bright_yellow()
    );
    println!(
        "  Audit records: {}",
        audit_records.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Dispatches audit trail commands.
async fn handle_audit_action(action: AuditAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgAuditRepository::new(Arc::new(pool.clone())));

    match action {
        AuditAction::Tail { limit } => {
            tail_audit(repo, limit).await?;
        }
        AuditAction::Purge { before, yes } => {
            purge_audit(repo, &before, yes).await?;
        }
    }

    Ok(())
}

/// Prints the most recent audit records, newest first.
///
/// # Output Format
///
/// ```text
/// Audit Trail (latest 20)
///
///   2026-08-01 09:15  CREATE     EMPLOYEE  6f1c2a0e...  Employee Jane Doe created
///   2026-08-01 09:20  TERMINATE  EMPLOYEE  41b0c7d2...  Employee John Roe terminated
/// ```
async fn tail_audit(repo: Arc<PgAuditRepository>, limit: u32) -> Result<()> {
    println!(
        "{}",
        format!("Audit Trail (latest {limit})").bright_blue().bold()
    );
    println!();

    let filter =
        AuditFilter::new(0, i64::from(limit)).with_sort(AuditSort::EventTime, true);

    let records = repo
        .list(&filter)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list audit records: {}", e))?;

    if records.is_empty() {
        println!("{}", "  No audit records found".yellow());
        return Ok(());
    }

    for record in &records {
        println!(
            "  {}  {:<10} {:<9} {}  {}",
            record
                .event_time
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.action.cyan(),
            record.entity_name.bright_white(),
            record
                .entity_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string())
                .bright_black(),
            record.message.as_deref().unwrap_or("")
        );
    }

    println!();
    println!(
        "  Shown: {}",
        records.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes audit records older than the cutoff with confirmation prompt.
///
/// # Safety
///
/// - Requires confirmation (default: No)
/// - The deletion is irreversible; the count is shown before the prompt
async fn purge_audit(repo: Arc<PgAuditRepository>, before: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Purge Audit Records".bright_blue().bold());
    println!();

    let cutoff: DateTime<Utc> = DateTime::parse_from_rfc3339(before)
        .context("Cutoff must be a valid RFC3339 timestamp, e.g. 2026-01-01T00:00:00Z")?
        .with_timezone(&Utc);

    let filter = AuditFilter::new(0, 1).with_date_range(None, Some(cutoff));
    let affected = repo
        .count(&filter)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count audit records: {}", e))?;

    println!("  Cutoff:  {}", cutoff.to_rfc3339().cyan());
    println!(
        "  Records: {}",
        affected.to_string().bright_yellow().bold()
    );
    println!();

    if affected == 0 {
        println!("{}", "  Nothing to purge".yellow());
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these records permanently?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .purge_before(cutoff)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge audit records: {}", e))?;

    println!();
    println!(
        "{}",
        format!("Deleted {deleted} audit records").green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
