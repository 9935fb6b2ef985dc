//! Report store interface
//!
//! Aggregators never hold a database handle; they receive a `&dyn ReportStore`
//! and describe what they need with a [`ReportQuery`]. Each matching row comes
//! back individually decoded so one bad document cannot sink a whole query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qa_common::db::RecordDecodeError;
use qa_common::time::DateWindow;
use qa_common::{Environment, ReportRecord, Timeliness};
use std::time::Duration;
use thiserror::Error;

mod sqlite;

pub use sqlite::SqliteReportStore;

/// One row of a query result
pub type DecodedReport = Result<ReportRecord, RecordDecodeError>;

/// Store access failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query exceeded {0:?}")]
    Timeout(Duration),
}

/// Query capability consumed by the aggregators
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Run a filtered, optionally sorted and paginated report query
    async fn find(&self, query: &ReportQuery) -> Result<Vec<DecodedReport>, StoreError>;
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DueDateDescending,
}

/// Filter, sort and pagination for a report query
///
/// Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportQuery {
    pub environment: Option<Environment>,
    /// Exact sprint match
    pub sprint: Option<String>,
    /// Inclusive due-date window
    pub due_window: Option<DateWindow>,
    pub due_on_or_after: Option<DateTime<Utc>>,
    /// Both developer names non-empty
    pub developers_assigned: bool,
    pub timeliness: Option<Timeliness>,
    pub order: Option<SortOrder>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl ReportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn sprint(mut self, sprint: impl Into<String>) -> Self {
        self.sprint = Some(sprint.into());
        self
    }

    pub fn due_within(mut self, window: DateWindow) -> Self {
        self.due_window = Some(window);
        self
    }

    pub fn due_on_or_after(mut self, instant: DateTime<Utc>) -> Self {
        self.due_on_or_after = Some(instant);
        self
    }

    pub fn developers_assigned(mut self) -> Self {
        self.developers_assigned = true;
        self
    }

    pub fn timeliness(mut self, timeliness: Timeliness) -> Self {
        self.timeliness = Some(timeliness);
        self
    }

    pub fn newest_due_first(mut self) -> Self {
        self.order = Some(SortOrder::DueDateDescending);
        self
    }

    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}
