//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in `schema_version`.
//!
//! Never modify an existing migration; add a new `migrate_vN` and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?"
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Migration v1: developer tagging scheme
///
/// Reports written before this migration used fixed tagging: slots 1/2 were
/// development outcomes and the `prod_*` columns held production outcomes.
/// Adding `tagging` with a `'legacy'` default marks every pre-existing row
/// accordingly; new rows are written with `'environment'`.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: add developer tagging scheme to reports");

    if !has_column(pool, "reports", "tagging").await? {
        sqlx::query("ALTER TABLE reports ADD COLUMN tagging TEXT NOT NULL DEFAULT 'legacy'")
            .execute(pool)
            .await?;
        info!("  Added tagging column; existing rows marked legacy");
    }

    for (column, sql_type) in [
        ("prod_developer1", "TEXT"),
        ("pd1_passed", "INTEGER"),
        ("pd1_failed", "INTEGER"),
        ("prod_developer2", "TEXT"),
        ("pd2_passed", "INTEGER"),
        ("pd2_failed", "INTEGER"),
    ] {
        if !has_column(pool, "reports", column).await? {
            sqlx::query(&format!("ALTER TABLE reports ADD COLUMN {} {}", column, sql_type))
                .execute(pool)
                .await?;
            info!("  Added {} column", column);
        }
    }

    Ok(())
}
