//! Distinct sprint names for filter drop-downs

use qa_common::ReportRecord;
use serde::Serialize;
use std::collections::BTreeSet;

use super::decoded_records;
use crate::store::{ReportQuery, ReportStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintOption {
    pub value: String,
    pub label: String,
}

/// Trimmed, non-empty, de-duplicated sprint names in ascending order
pub fn sprint_options(records: &[ReportRecord]) -> Vec<SprintOption> {
    records
        .iter()
        .map(|r| r.sprint.trim())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|sprint| SprintOption {
            value: sprint.to_string(),
            label: sprint.to_string(),
        })
        .collect()
}

pub async fn list_sprints(store: &dyn ReportStore) -> Result<Vec<SprintOption>, StoreError> {
    let rows = store.find(&ReportQuery::new()).await?;
    Ok(sprint_options(&decoded_records(rows, "list_sprints")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qa_common::Environment;

    fn record(sprint: &str) -> ReportRecord {
        ReportRecord::new(Environment::Development, sprint, "1.0.0", Utc::now(), Utc::now())
    }

    #[test]
    fn test_sprints_trimmed_and_deduplicated() {
        let records = vec![
            record(" Sprint 2"),
            record("Sprint 1"),
            record("Sprint 2 "),
            record("   "),
            record(""),
        ];

        let options = sprint_options(&records);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["Sprint 1", "Sprint 2"]);
        assert!(options.iter().all(|o| o.value == o.label));
    }

    #[test]
    fn test_no_reports_gives_empty_list() {
        assert!(sprint_options(&[]).is_empty());
    }
}
