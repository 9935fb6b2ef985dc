//! Report table for one environment
//!
//! Lists fully assigned reports (both developer names set) due on or after
//! the first day the table covers.

use chrono::{DateTime, NaiveDate, Utc};
use qa_common::time::start_of_day;
use qa_common::{Environment, ReportRecord};
use serde::Serialize;
use uuid::Uuid;

use super::decoded_records;
use crate::store::{ReportQuery, ReportStore, StoreError};

/// Earliest due date shown in the table
pub fn table_start() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2020, 1, 1).map_or(DateTime::<Utc>::MIN_UTC, start_of_day)
}

/// Flat report row as shown in the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTableRow {
    pub id: Uuid,
    pub environment: Environment,
    pub sprint: String,
    pub version: String,
    pub due_date: DateTime<Utc>,
    pub close_date: DateTime<Utc>,
    pub total_test_cases: i64,
    pub total_bugs: i64,
    pub developer1: String,
    pub d1_passed: i64,
    pub d1_failed: i64,
    pub developer2: String,
    pub d2_passed: i64,
    pub d2_failed: i64,
    pub feature: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReportRecord> for ReportTableRow {
    fn from(record: ReportRecord) -> Self {
        let [first, second] = record.developers;
        Self {
            id: record.id,
            environment: record.environment,
            sprint: record.sprint,
            version: record.version,
            due_date: record.due_date,
            close_date: record.close_date,
            total_test_cases: record.total_test_cases,
            total_bugs: record.total_bugs,
            developer1: first.name,
            d1_passed: first.passed,
            d1_failed: first.failed,
            developer2: second.name,
            d2_passed: second.passed,
            d2_failed: second.failed,
            feature: record.feature,
            created_at: record.created_at,
        }
    }
}

pub async fn reports_for_environment(
    store: &dyn ReportStore,
    environment: Environment,
) -> Result<Vec<ReportTableRow>, StoreError> {
    let query = ReportQuery::new()
        .environment(environment)
        .developers_assigned()
        .due_on_or_after(table_start());

    let rows = store.find(&query).await?;
    Ok(decoded_records(rows, "reports_for_environment")
        .into_iter()
        .map(ReportTableRow::from)
        .collect())
}
