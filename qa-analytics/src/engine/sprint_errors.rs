//! Sprint error-rate comparison between environments

use qa_common::time::DateWindow;
use qa_common::{Environment, ReportRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::decoded_records;
use crate::store::{ReportQuery, ReportStore, StoreError};

/// Error rates of one sprint; 0 where the environment logged no bugs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintErrorRate {
    pub name: String,
    pub dev_error: f64,
    pub prod_error: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    total_bugs: i64,
    failed: i64,
}

impl Bucket {
    /// Failed outcomes as a percentage of logged bugs
    fn error_rate(&self) -> f64 {
        if self.total_bugs == 0 {
            return 0.0;
        }
        self.failed as f64 * 100.0 / self.total_bugs as f64
    }
}

/// One row per distinct sprint name, ordered by name
///
/// Sprint names are grouped as stored, without trimming.
pub fn error_rates(records: &[ReportRecord]) -> Vec<SprintErrorRate> {
    let mut buckets: BTreeMap<(&str, Environment), Bucket> = BTreeMap::new();
    let mut sprints: Vec<&str> = Vec::new();

    for record in records {
        let bucket = buckets
            .entry((record.sprint.as_str(), record.environment))
            .or_default();
        bucket.total_bugs += record.total_bugs;
        bucket.failed += record.slot_failed();
        sprints.push(record.sprint.as_str());
    }

    sprints.sort_unstable();
    sprints.dedup();

    sprints
        .into_iter()
        .map(|sprint| {
            let rate = |environment: Environment| {
                buckets
                    .get(&(sprint, environment))
                    .map(Bucket::error_rate)
                    .unwrap_or(0.0)
            };
            SprintErrorRate {
                name: sprint.to_string(),
                dev_error: rate(Environment::Development),
                prod_error: rate(Environment::Production),
            }
        })
        .collect()
}

/// Compute sprint error rates for reports due inside `window`
pub async fn sprint_error_rates(
    store: &dyn ReportStore,
    window: DateWindow,
) -> Result<Vec<SprintErrorRate>, StoreError> {
    let rows = store.find(&ReportQuery::new().due_within(window)).await?;
    let records = decoded_records(rows, "sprint_error_rates");
    let rates = error_rates(&records);

    debug!(reports = records.len(), sprints = rates.len(), "Computed sprint error rates");

    Ok(rates)
}
