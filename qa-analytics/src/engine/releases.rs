//! Release listing with on-time/delayed classification

use qa_common::time::format_day;
use qa_common::{ReportRecord, Timeliness};
use serde::Serialize;
use tracing::debug;

use super::decoded_records;
use crate::pagination::ReleasePage;
use crate::store::{ReportQuery, ReportStore, StoreError};

/// Release status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Delayed,
    OnTime,
}

impl StatusFilter {
    /// `delayed` and `on-time` select a status; anything else lists all
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("delayed") => StatusFilter::Delayed,
            Some("on-time") => StatusFilter::OnTime,
            _ => StatusFilter::All,
        }
    }

    fn timeliness(&self) -> Option<Timeliness> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Delayed => Some(Timeliness::Delayed),
            StatusFilter::OnTime => Some(Timeliness::OnTime),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    pub version: String,
    pub env: String,
    pub release_date: String,
    pub close_date: String,
    pub status: Timeliness,
}

impl From<&ReportRecord> for ReleaseEntry {
    fn from(record: &ReportRecord) -> Self {
        Self {
            version: record.version.clone(),
            env: record.environment.to_string(),
            release_date: format_day(&record.due_date),
            close_date: format_day(&record.close_date),
            status: record.timeliness(),
        }
    }
}

/// List releases newest due date first
///
/// Status filtering and the skip/limit window run in the store, so the page
/// is taken from the filtered set.
pub async fn list_releases(
    store: &dyn ReportStore,
    status: StatusFilter,
    page: ReleasePage,
) -> Result<Vec<ReleaseEntry>, StoreError> {
    let mut query = ReportQuery::new()
        .newest_due_first()
        .page(page.skip, page.limit);
    if let Some(timeliness) = status.timeliness() {
        query = query.timeliness(timeliness);
    }

    let rows = store.find(&query).await?;
    let entries: Vec<ReleaseEntry> = decoded_records(rows, "list_releases")
        .iter()
        .map(ReleaseEntry::from)
        .collect();

    debug!(?status, skip = page.skip, limit = page.limit, releases = entries.len(), "Listed releases");

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use qa_common::time::start_of_day;
    use qa_common::Environment;

    fn jan(day: u32) -> chrono::DateTime<chrono::Utc> {
        start_of_day(NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(StatusFilter::parse(Some("delayed")), StatusFilter::Delayed);
        assert_eq!(StatusFilter::parse(Some("on-time")), StatusFilter::OnTime);
        assert_eq!(StatusFilter::parse(Some("all")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("whatever")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(None), StatusFilter::All);
    }

    #[test]
    fn test_entry_from_delayed_record() {
        let record = ReportRecord::new(Environment::Production, "Sprint 1", "1.2.0", jan(1), jan(3));
        let entry = ReleaseEntry::from(&record);

        assert_eq!(entry.version, "1.2.0");
        assert_eq!(entry.env, "production");
        assert_eq!(entry.release_date, "2024-01-01");
        assert_eq!(entry.close_date, "2024-01-03");
        assert_eq!(entry.status, Timeliness::Delayed);
    }

    #[test]
    fn test_entry_serializes_status_text() {
        let record = ReportRecord::new(Environment::Development, "Sprint 1", "1.0.0", jan(1), jan(1));
        let json = serde_json::to_value(ReleaseEntry::from(&record)).unwrap();

        assert_eq!(json["status"], "on time");
        assert_eq!(json["releaseDate"], "2024-01-01");
        assert_eq!(json["env"], "development");
    }
}
