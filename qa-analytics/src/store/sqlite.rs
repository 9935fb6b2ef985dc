//! SQLite-backed report store
//!
//! Filters, ordering and pagination are pushed down into SQL. Rows are
//! decoded one at a time after the fetch so that a malformed row becomes a
//! per-row [`RecordDecodeError`] instead of failing the query.

use async_trait::async_trait;
use futures::TryStreamExt;
use qa_common::db::{save_report, RecordDecodeError, ReportRow, REPORT_COLUMNS};
use qa_common::time::DELAY_GRACE_MILLIS;
use qa_common::{ReportRecord, Timeliness};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::time::Duration;
use tracing::debug;

use super::{DecodedReport, ReportQuery, ReportStore, SortOrder, StoreError};

/// Report store over the shared SQLite pool
#[derive(Clone)]
pub struct SqliteReportStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteReportStore {
    /// Every query is abandoned with [`StoreError::Timeout`] after `timeout`
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ingestion path: insert or replace a report
    pub async fn insert(&self, report: &ReportRecord) -> qa_common::Result<()> {
        save_report(&self.pool, report).await
    }

    async fn fetch_rows(&self, query: &ReportQuery) -> Result<Vec<SqliteRow>, StoreError> {
        let mut builder = select_reports(query);
        debug!(sql = builder.sql(), "Running report query");

        let rows: Vec<SqliteRow> = builder.build().fetch(&self.pool).try_collect().await?;
        Ok(rows)
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn find(&self, query: &ReportQuery) -> Result<Vec<DecodedReport>, StoreError> {
        let rows = tokio::time::timeout(self.timeout, self.fetch_rows(query))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??;

        Ok(rows.iter().map(decode_row).collect())
    }
}

fn decode_row(row: &SqliteRow) -> DecodedReport {
    let raw = ReportRow::from_row(row).map_err(RecordDecodeError::Row)?;
    ReportRecord::try_from(raw)
}

/// SQL condition matching delayed reports
///
/// Mirrors `ReportRecord::is_delayed`: not a feature release and closed more
/// than the grace period after the due date.
fn delayed_condition() -> String {
    format!(
        "(feature = 0 AND close_date > due_date + {})",
        DELAY_GRACE_MILLIS
    )
}

/// SQLite binds are signed; larger counts saturate instead of wrapping negative
fn sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Build the SELECT for a report query
pub(crate) fn select_reports(query: &ReportQuery) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM reports WHERE 1 = 1", REPORT_COLUMNS));

    if let Some(environment) = query.environment {
        builder
            .push(" AND LOWER(environment) = ")
            .push_bind(environment.as_str());
    }

    if let Some(sprint) = &query.sprint {
        builder.push(" AND sprint = ").push_bind(sprint.clone());
    }

    if let Some(window) = &query.due_window {
        builder
            .push(" AND due_date >= ")
            .push_bind(window.start_millis())
            .push(" AND due_date <= ")
            .push_bind(window.end_millis());
    }

    if let Some(instant) = &query.due_on_or_after {
        builder
            .push(" AND due_date >= ")
            .push_bind(instant.timestamp_millis());
    }

    if query.developers_assigned {
        builder.push(" AND developer1 <> '' AND developer2 <> ''");
    }

    match query.timeliness {
        Some(Timeliness::Delayed) => {
            builder.push(" AND ").push(delayed_condition());
        }
        Some(Timeliness::OnTime) => {
            builder.push(" AND NOT ").push(delayed_condition());
        }
        None => {}
    }

    if let Some(SortOrder::DueDateDescending) = query.order {
        builder.push(" ORDER BY due_date DESC, id ASC");
    }

    match (query.limit, query.skip) {
        (Some(limit), skip) => {
            builder
                .push(" LIMIT ")
                .push_bind(sql_count(limit))
                .push(" OFFSET ")
                .push_bind(sql_count(skip));
        }
        (None, skip) if skip > 0 => {
            // SQLite needs a LIMIT before OFFSET; -1 is unbounded
            builder.push(" LIMIT -1 OFFSET ").push_bind(sql_count(skip));
        }
        (None, _) => {}
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use qa_common::time::DateWindow;
    use qa_common::Environment;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unfiltered_query_has_no_clauses() {
        let builder = select_reports(&ReportQuery::new());
        let sql = builder.sql();
        assert!(sql.ends_with("WHERE 1 = 1"));
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_filters_are_pushed_down() {
        let query = ReportQuery::new()
            .environment(Environment::Production)
            .sprint("Sprint 2")
            .due_within(DateWindow::full_days(day(2024, 1, 1), day(2024, 1, 31)))
            .developers_assigned();
        let builder = select_reports(&query);
        let sql = builder.sql();

        assert!(sql.contains("LOWER(environment) = ?"));
        assert!(sql.contains("sprint = ?"));
        assert!(sql.contains("due_date >= ? AND due_date <= ?"));
        assert!(sql.contains("developer1 <> '' AND developer2 <> ''"));
    }

    #[test]
    fn test_timeliness_filters_are_complementary() {
        let delayed = select_reports(&ReportQuery::new().timeliness(Timeliness::Delayed));
        let on_time = select_reports(&ReportQuery::new().timeliness(Timeliness::OnTime));

        assert!(delayed.sql().contains(" AND (feature = 0 AND close_date > due_date + 86400000)"));
        assert!(on_time.sql().contains(" AND NOT (feature = 0 AND close_date > due_date + 86400000)"));
    }

    #[test]
    fn test_pagination_and_order() {
        let builder = select_reports(&ReportQuery::new().newest_due_first().page(5, 5));
        let sql = builder.sql();
        assert!(sql.contains("ORDER BY due_date DESC"));
        assert!(sql.ends_with("LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_offset_without_limit_is_unbounded() {
        let query = ReportQuery {
            skip: 3,
            ..ReportQuery::new()
        };
        let builder = select_reports(&query);
        assert!(builder.sql().ends_with("LIMIT -1 OFFSET ?"));
    }

    #[test]
    fn test_counts_saturate_at_i64_max() {
        assert_eq!(sql_count(5), 5);
        assert_eq!(sql_count(1 << 63), i64::MAX);
        assert_eq!(sql_count(u64::MAX), i64::MAX);
    }
}
