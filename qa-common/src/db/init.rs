//! Database initialization
//!
//! Opens (or creates) the report database, applies connection pragmas,
//! creates the schema and runs pending migrations.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets aggregation reads proceed while the ingestion side writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema_version_table(&pool).await?;
    create_reports_table(&pool).await?;

    // Migrations run before indexes: older tables may lack indexed columns
    crate::db::migrations::run_migrations(&pool).await?;

    create_report_indexes(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the reports table
///
/// Dates are UTC milliseconds. `tagging` selects how developer slots map to
/// environments; the `prod_*` columns are only populated for legacy rows.
pub async fn create_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            environment TEXT NOT NULL,
            sprint TEXT NOT NULL DEFAULT '',
            version TEXT NOT NULL DEFAULT '',
            due_date INTEGER NOT NULL,
            close_date INTEGER NOT NULL,
            total_test_cases INTEGER NOT NULL DEFAULT 0,
            total_bugs INTEGER NOT NULL DEFAULT 0,
            developer1 TEXT NOT NULL DEFAULT '',
            d1_passed INTEGER NOT NULL DEFAULT 0,
            d1_failed INTEGER NOT NULL DEFAULT 0,
            developer2 TEXT NOT NULL DEFAULT '',
            d2_passed INTEGER NOT NULL DEFAULT 0,
            d2_failed INTEGER NOT NULL DEFAULT 0,
            feature INTEGER NOT NULL DEFAULT 0,
            tagging TEXT NOT NULL DEFAULT 'environment',
            prod_developer1 TEXT,
            pd1_passed INTEGER,
            pd1_failed INTEGER,
            prod_developer2 TEXT,
            pd2_passed INTEGER,
            pd2_failed INTEGER,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_report_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_due_date ON reports(due_date)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reports_environment_due_date ON reports(environment, due_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
