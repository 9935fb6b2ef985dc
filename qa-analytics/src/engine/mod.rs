//! Analytics aggregation engine
//!
//! Every aggregator is a function of a [`ReportStore`](crate::store::ReportStore)
//! and typed filter parameters. Nothing is cached: each call queries the
//! store and recomputes from the current record set.

pub mod developer_stats;
pub mod releases;
pub mod sprint_errors;
pub mod sprints;
pub mod summary;
pub mod table;

use qa_common::ReportRecord;
use tracing::warn;

use crate::store::DecodedReport;

pub use developer_stats::{developer_chart, DeveloperEnvStat, DeveloperFilter, DonutChartRow};
pub use releases::{list_releases, ReleaseEntry, StatusFilter};
pub use sprint_errors::{sprint_error_rates, SprintErrorRate};
pub use sprints::{list_sprints, SprintOption};
pub use summary::{summarize, SummaryData, SummaryFilter, SummaryResponse};
pub use table::{reports_for_environment, ReportTableRow};

/// Keep decoded records, logging and dropping rows that failed to decode
pub(crate) fn decoded_records(rows: Vec<DecodedReport>, operation: &'static str) -> Vec<ReportRecord> {
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(operation, error = %e, "Skipping report that failed to decode");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qa_common::db::RecordDecodeError;
    use qa_common::Environment;

    #[test]
    fn test_decode_failures_are_dropped() {
        let good = ReportRecord::new(Environment::Development, "Sprint 1", "1.0.0", Utc::now(), Utc::now());
        let rows = vec![
            Ok(good.clone()),
            Err(RecordDecodeError::UnknownEnvironment {
                id: "r2".to_string(),
                value: "staging".to_string(),
            }),
        ];

        let records = decoded_records(rows, "test");
        assert_eq!(records, vec![good]);
    }
}
