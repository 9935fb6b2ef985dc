//! Per-developer pass/fail chart
//!
//! Reports fan out into (developer, environment) outcomes, which are summed,
//! regrouped per developer and normalized into success/error percentages
//! for each environment.

use qa_common::time::{parse_day, DateWindow};
use qa_common::{Environment, ReportRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::decoded_records;
use crate::store::{ReportQuery, ReportStore, StoreError};

/// Sprint value that means "every sprint"
pub const ALL_SPRINTS: &str = "All";

/// Optional filters for the developer chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeveloperFilter {
    pub sprint: Option<String>,
    pub window: Option<DateWindow>,
}

impl DeveloperFilter {
    /// Interpret raw query values leniently
    ///
    /// An empty or exactly `All` sprint disables the sprint filter; any other
    /// value is trimmed and matched. The date window applies only when both
    /// bounds parse, and keeps midnight of each day.
    pub fn parse(sprint: Option<&str>, start: Option<&str>, end: Option<&str>) -> Self {
        let sprint = sprint
            .filter(|raw| !raw.is_empty() && *raw != ALL_SPRINTS)
            .map(|raw| raw.trim().to_string());

        let window = match (start.map(parse_day), end.map(parse_day)) {
            (Some(Ok(start)), Some(Ok(end))) => Some(DateWindow::midnight_bounds(start, end)),
            _ => None,
        };

        Self { sprint, window }
    }

    fn to_query(&self) -> ReportQuery {
        let mut query = ReportQuery::new();
        if let Some(sprint) = &self.sprint {
            query = query.sprint(sprint.clone());
        }
        if let Some(window) = self.window {
            query = query.due_within(window);
        }
        query
    }
}

/// Summed outcomes for one developer in one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperEnvStat {
    pub developer: String,
    pub environment: Environment,
    pub passed: i64,
    pub failed: i64,
}

/// One developer's chart row; each environment pair sums to 100 or is 0/0
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonutChartRow {
    pub name: String,
    pub prod_success: f64,
    pub prod_error: f64,
    pub dev_success: f64,
    pub dev_error: f64,
}

/// Sum outcomes per (developer, environment)
///
/// Developer names are compared exactly as stored.
pub fn tally(records: &[ReportRecord]) -> Vec<DeveloperEnvStat> {
    let mut sums: BTreeMap<(String, Environment), (i64, i64)> = BTreeMap::new();

    for outcome in records.iter().flat_map(ReportRecord::developer_outcomes) {
        let entry = sums.entry((outcome.developer, outcome.environment)).or_default();
        entry.0 += outcome.passed;
        entry.1 += outcome.failed;
    }

    sums.into_iter()
        .map(|((developer, environment), (passed, failed))| DeveloperEnvStat {
            developer,
            environment,
            passed,
            failed,
        })
        .collect()
}

/// (success %, error %) for a pass/fail pair
fn split_percent(passed: i64, failed: i64) -> (f64, f64) {
    let total = passed + failed;
    if total <= 0 {
        return (0.0, 0.0);
    }
    let success = passed as f64 * 100.0 / total as f64;
    (success, 100.0 - success)
}

/// Regroup per developer and normalize into chart rows, ordered by name
pub fn chart_rows(stats: &[DeveloperEnvStat]) -> Vec<DonutChartRow> {
    // developer -> [dev (passed, failed), prod (passed, failed)]
    let mut per_developer: BTreeMap<&str, [(i64, i64); 2]> = BTreeMap::new();

    for stat in stats {
        let slots = per_developer.entry(stat.developer.as_str()).or_default();
        let slot = match stat.environment {
            Environment::Development => &mut slots[0],
            Environment::Production => &mut slots[1],
        };
        slot.0 += stat.passed;
        slot.1 += stat.failed;
    }

    per_developer
        .into_iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, [(dev_passed, dev_failed), (prod_passed, prod_failed)])| {
            let (dev_success, dev_error) = split_percent(dev_passed, dev_failed);
            let (prod_success, prod_error) = split_percent(prod_passed, prod_failed);
            DonutChartRow {
                name: name.to_string(),
                prod_success,
                prod_error,
                dev_success,
                dev_error,
            }
        })
        .collect()
}

/// Compute the developer chart for the filtered record set
pub async fn developer_chart(
    store: &dyn ReportStore,
    filter: &DeveloperFilter,
) -> Result<Vec<DonutChartRow>, StoreError> {
    let rows = store.find(&filter.to_query()).await?;
    let records = decoded_records(rows, "developer_chart");

    let stats = tally(&records);
    let chart = chart_rows(&stats);

    debug!(
        reports = records.len(),
        developers = chart.len(),
        sprint = ?filter.sprint,
        "Computed developer chart"
    );

    Ok(chart)
}
