//! Environment summary: bugs, success/error rates and delays
//!
//! Each environment is queried independently. A failed query leaves that
//! environment at zero instead of failing the whole summary.

use qa_common::time::DateWindow;
use qa_common::{Environment, ReportRecord};
use serde::Serialize;
use tracing::{debug, error};

use super::decoded_records;
use crate::store::{ReportQuery, ReportStore};

/// Summary filter: full-day due-date window plus optional exact sprint
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFilter {
    pub window: DateWindow,
    pub sprint: Option<String>,
}

impl SummaryFilter {
    /// Both dates are required `YYYY-MM-DD` values; an empty sprint means any
    pub fn parse(start: &str, end: &str, sprint: Option<&str>) -> qa_common::Result<Self> {
        Ok(Self {
            window: DateWindow::parse_full_days(start, end)?,
            sprint: sprint.filter(|s| !s.is_empty()).map(str::to_string),
        })
    }

    fn to_query(&self, environment: Environment) -> ReportQuery {
        let query = ReportQuery::new()
            .environment(environment)
            .due_within(self.window);
        match &self.sprint {
            Some(sprint) => query.sprint(sprint.clone()),
            None => query,
        }
    }
}

/// Integer summary for one environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub total_bugs: i64,
    pub success_rate: i64,
    pub error_rate: i64,
    pub delays: i64,
}

impl SummaryData {
    /// Fold matched reports into totals and truncated rates
    pub fn from_records(records: &[ReportRecord]) -> Self {
        let mut total_bugs = 0;
        let mut passed = 0;
        let mut failed = 0;
        let mut delays = 0;

        for record in records {
            total_bugs += record.total_bugs;
            passed += record.slot_passed();
            failed += record.slot_failed();
            if record.is_delayed() {
                delays += 1;
            }
        }

        let (success_rate, error_rate) = if passed + failed > 0 {
            let success = passed * 100 / (passed + failed);
            (success, 100 - success)
        } else {
            (0, 0)
        };

        Self {
            total_bugs,
            success_rate,
            error_rate,
            delays,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryResponse {
    pub prod: SummaryData,
    pub dev: SummaryData,
}

/// Summarize both environments
///
/// Store failures are logged and contained per environment.
pub async fn summarize(store: &dyn ReportStore, filter: &SummaryFilter) -> SummaryResponse {
    let mut response = SummaryResponse::default();

    for environment in Environment::ALL {
        let data = match store.find(&filter.to_query(environment)).await {
            Ok(rows) => SummaryData::from_records(&decoded_records(rows, "summary")),
            Err(e) => {
                error!(environment = %environment, error = %e, "Summary query failed");
                SummaryData::default()
            }
        };

        debug!(environment = %environment, ?data, "Computed summary");

        match environment {
            Environment::Development => response.dev = data,
            Environment::Production => response.prod = data,
        }
    }

    response
}
