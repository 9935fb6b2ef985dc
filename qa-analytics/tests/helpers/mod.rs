//! Test Helper Utilities
//!
//! Shared fixtures for the qa-analytics integration tests: a temporary
//! report database, a report builder and a store that fails on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use qa_analytics::store::{DecodedReport, ReportQuery, ReportStore, SqliteReportStore, StoreError};
use qa_common::db::init_database;
use qa_common::time::start_of_day;
use qa_common::{DeveloperSlot, Environment, ReportRecord};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tempfile::TempDir;

/// Store over a temporary database; the directory lives as long as this value
pub struct TestStore {
    pub store: SqliteReportStore,
    dir: TempDir,
}

impl TestStore {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("qa-report.db")).await.unwrap();
        Self {
            store: SqliteReportStore::new(pool, StdDuration::from_secs(5)),
            dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("qa-report.db")
    }

    pub async fn seed(&self, reports: &[ReportRecord]) {
        for report in reports {
            self.store.insert(report).await.unwrap();
        }
    }

    /// Insert a row whose environment cannot be decoded
    pub async fn insert_undecodable(&self, due: DateTime<Utc>) {
        sqlx::query(
            "INSERT INTO reports (id, environment, sprint, due_date, close_date, developer1, \
             d1_passed, d1_failed, developer2, created_at) \
             VALUES (?, 'staging', 'Sprint 1', ?, ?, 'Mallory', 50, 50, 'Eve', ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(due.timestamp_millis())
        .bind(due.timestamp_millis())
        .bind(due.timestamp_millis())
        .execute(self.store.pool())
        .await
        .unwrap();
    }
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    start_of_day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn jan(d: u32) -> DateTime<Utc> {
    day(2024, 1, d)
}

/// Builder for report fixtures
pub struct ReportBuilder {
    record: ReportRecord,
}

impl ReportBuilder {
    pub fn new(environment: Environment, due: DateTime<Utc>) -> Self {
        Self {
            record: ReportRecord::new(environment, "Sprint 1", "1.0.0", due, due),
        }
    }

    pub fn dev(due: DateTime<Utc>) -> Self {
        Self::new(Environment::Development, due)
    }

    pub fn prod(due: DateTime<Utc>) -> Self {
        Self::new(Environment::Production, due)
    }

    pub fn sprint(mut self, sprint: &str) -> Self {
        self.record.sprint = sprint.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.record.version = version.to_string();
        self
    }

    pub fn closed_after(mut self, delay: Duration) -> Self {
        self.record.close_date = self.record.due_date + delay;
        self
    }

    pub fn bugs(mut self, bugs: i64) -> Self {
        self.record.total_bugs = bugs;
        self
    }

    pub fn developers(mut self, first: (&str, i64, i64), second: (&str, i64, i64)) -> Self {
        self.record.developers = [
            DeveloperSlot::new(first.0, first.1, first.2),
            DeveloperSlot::new(second.0, second.1, second.2),
        ];
        self
    }

    pub fn feature(mut self) -> Self {
        self.record.feature = true;
        self
    }

    pub fn build(self) -> ReportRecord {
        self.record
    }
}

/// Delegates to an inner store but fails every production-scoped query
pub struct ProductionOutageStore<S> {
    pub inner: S,
}

#[async_trait]
impl<S: ReportStore> ReportStore for ProductionOutageStore<S> {
    async fn find(&self, query: &ReportQuery) -> Result<Vec<DecodedReport>, StoreError> {
        if query.environment == Some(Environment::Production) {
            return Err(StoreError::Timeout(StdDuration::from_millis(1)));
        }
        self.inner.find(query).await
    }
}

/// Store whose every query fails
pub struct UnavailableStore;

#[async_trait]
impl ReportStore for UnavailableStore {
    async fn find(&self, _query: &ReportQuery) -> Result<Vec<DecodedReport>, StoreError> {
        Err(StoreError::Timeout(StdDuration::from_millis(1)))
    }
}
