//! Report row mapping and persistence
//!
//! `ReportRow` mirrors the `reports` table. Converting it into a
//! [`ReportRecord`] is where stored documents are normalized: environment
//! names are lower-cased, timestamps are checked and the developer tagging
//! scheme is resolved.

use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use super::models::{DeveloperSlot, DeveloperTagging, Environment, ReportRecord};
use crate::time::from_millis;
use crate::Result;

/// Column list shared by every report SELECT
pub const REPORT_COLUMNS: &str = "id, environment, sprint, version, due_date, close_date, \
    total_test_cases, total_bugs, developer1, d1_passed, d1_failed, developer2, d2_passed, \
    d2_failed, feature, tagging, prod_developer1, pd1_passed, pd1_failed, prod_developer2, \
    pd2_passed, pd2_failed, created_at";

/// A stored report that could not be turned into a `ReportRecord`
#[derive(Debug, Error)]
pub enum RecordDecodeError {
    #[error("row could not be read: {0}")]
    Row(#[from] sqlx::Error),

    #[error("report '{id}' has an invalid identifier")]
    InvalidId { id: String },

    #[error("report '{id}' has unknown environment '{value}'")]
    UnknownEnvironment { id: String, value: String },

    #[error("report '{id}' has out-of-range {field} timestamp {millis}")]
    InvalidTimestamp {
        id: String,
        field: &'static str,
        millis: i64,
    },

    #[error("report '{id}' has unknown developer tagging '{value}'")]
    UnknownTagging { id: String, value: String },
}

/// Raw `reports` row
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub id: String,
    pub environment: String,
    pub sprint: String,
    pub version: String,
    pub due_date: i64,
    pub close_date: i64,
    pub total_test_cases: i64,
    pub total_bugs: i64,
    pub developer1: String,
    pub d1_passed: i64,
    pub d1_failed: i64,
    pub developer2: String,
    pub d2_passed: i64,
    pub d2_failed: i64,
    pub feature: bool,
    pub tagging: String,
    pub prod_developer1: Option<String>,
    pub pd1_passed: Option<i64>,
    pub pd1_failed: Option<i64>,
    pub prod_developer2: Option<String>,
    pub pd2_passed: Option<i64>,
    pub pd2_failed: Option<i64>,
    pub created_at: i64,
}

impl ReportRow {
    fn timestamp(&self, field: &'static str, millis: i64) -> std::result::Result<chrono::DateTime<chrono::Utc>, RecordDecodeError> {
        from_millis(millis).ok_or_else(|| RecordDecodeError::InvalidTimestamp {
            id: self.id.clone(),
            field,
            millis,
        })
    }
}

impl TryFrom<ReportRow> for ReportRecord {
    type Error = RecordDecodeError;

    fn try_from(row: ReportRow) -> std::result::Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|_| RecordDecodeError::InvalidId { id: row.id.clone() })?;

        let environment: Environment = row.environment.parse().map_err(|value| {
            RecordDecodeError::UnknownEnvironment {
                id: row.id.clone(),
                value,
            }
        })?;

        let due_date = row.timestamp("due_date", row.due_date)?;
        let close_date = row.timestamp("close_date", row.close_date)?;
        let created_at = row.timestamp("created_at", row.created_at)?;

        let tagging = match row.tagging.as_str() {
            "environment" => DeveloperTagging::Environment,
            "legacy" => DeveloperTagging::Legacy {
                production: [
                    DeveloperSlot::new(
                        row.prod_developer1.clone().unwrap_or_default(),
                        row.pd1_passed.unwrap_or(0),
                        row.pd1_failed.unwrap_or(0),
                    ),
                    DeveloperSlot::new(
                        row.prod_developer2.clone().unwrap_or_default(),
                        row.pd2_passed.unwrap_or(0),
                        row.pd2_failed.unwrap_or(0),
                    ),
                ],
            },
            other => {
                return Err(RecordDecodeError::UnknownTagging {
                    id: row.id.clone(),
                    value: other.to_string(),
                })
            }
        };

        Ok(ReportRecord {
            id,
            environment,
            sprint: row.sprint,
            version: row.version,
            due_date,
            close_date,
            total_test_cases: row.total_test_cases,
            total_bugs: row.total_bugs,
            developers: [
                DeveloperSlot::new(row.developer1, row.d1_passed, row.d1_failed),
                DeveloperSlot::new(row.developer2, row.d2_passed, row.d2_failed),
            ],
            tagging,
            feature: row.feature,
            created_at,
        })
    }
}

/// Save report to database (insert or replace by id)
pub async fn save_report(pool: &SqlitePool, report: &ReportRecord) -> Result<()> {
    let production = match &report.tagging {
        DeveloperTagging::Environment => None,
        DeveloperTagging::Legacy { production } => Some(production),
    };
    let prod_slot = |i: usize| production.map(|slots| &slots[i]);

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO reports (
            id, environment, sprint, version, due_date, close_date,
            total_test_cases, total_bugs,
            developer1, d1_passed, d1_failed, developer2, d2_passed, d2_failed,
            feature, tagging,
            prod_developer1, pd1_passed, pd1_failed, prod_developer2, pd2_passed, pd2_failed,
            created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(report.id.to_string())
    .bind(report.environment.as_str())
    .bind(&report.sprint)
    .bind(&report.version)
    .bind(report.due_date.timestamp_millis())
    .bind(report.close_date.timestamp_millis())
    .bind(report.total_test_cases)
    .bind(report.total_bugs)
    .bind(&report.developers[0].name)
    .bind(report.developers[0].passed)
    .bind(report.developers[0].failed)
    .bind(&report.developers[1].name)
    .bind(report.developers[1].passed)
    .bind(report.developers[1].failed)
    .bind(report.feature)
    .bind(report.tagging.scheme())
    .bind(prod_slot(0).map(|s| s.name.clone()))
    .bind(prod_slot(0).map(|s| s.passed))
    .bind(prod_slot(0).map(|s| s.failed))
    .bind(prod_slot(1).map(|s| s.name.clone()))
    .bind(prod_slot(1).map(|s| s.passed))
    .bind(prod_slot(1).map(|s| s.failed))
    .bind(report.created_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Count stored reports
pub async fn count_reports(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ReportRow {
        ReportRow {
            id: Uuid::new_v4().to_string(),
            environment: "Production".to_string(),
            sprint: " Sprint 7 ".to_string(),
            version: "2.1.0".to_string(),
            due_date: 1_704_067_200_000, // 2024-01-01
            close_date: 1_704_240_000_000, // 2024-01-03
            total_test_cases: 40,
            total_bugs: 4,
            developer1: "Alice".to_string(),
            d1_passed: 8,
            d1_failed: 2,
            developer2: String::new(),
            d2_passed: 0,
            d2_failed: 0,
            feature: false,
            tagging: "environment".to_string(),
            prod_developer1: None,
            pd1_passed: None,
            pd1_failed: None,
            prod_developer2: None,
            pd2_passed: None,
            pd2_failed: None,
            created_at: 1_704_067_200_000,
        }
    }

    #[test]
    fn test_row_decodes_with_lowercased_environment() {
        let record = ReportRecord::try_from(row()).unwrap();
        assert_eq!(record.environment, Environment::Production);
        // Sprint text is kept verbatim
        assert_eq!(record.sprint, " Sprint 7 ");
        assert_eq!(record.developers[0], DeveloperSlot::new("Alice", 8, 2));
        assert!(record.is_delayed());
    }

    #[test]
    fn test_unknown_environment_is_decode_error() {
        let mut r = row();
        r.environment = "staging".to_string();
        assert!(matches!(
            ReportRecord::try_from(r),
            Err(RecordDecodeError::UnknownEnvironment { value, .. }) if value == "staging"
        ));
    }

    #[test]
    fn test_invalid_id_is_decode_error() {
        let mut r = row();
        r.id = "not-a-uuid".to_string();
        assert!(matches!(ReportRecord::try_from(r), Err(RecordDecodeError::InvalidId { .. })));
    }

    #[test]
    fn test_out_of_range_timestamp_is_decode_error() {
        let mut r = row();
        r.close_date = i64::MAX;
        assert!(matches!(
            ReportRecord::try_from(r),
            Err(RecordDecodeError::InvalidTimestamp { field: "close_date", .. })
        ));
    }

    #[test]
    fn test_legacy_row_missing_prod_counts_defaults_to_zero() {
        let mut r = row();
        r.tagging = "legacy".to_string();
        r.prod_developer1 = Some("Bob".to_string());
        r.pd1_passed = Some(5);

        let record = ReportRecord::try_from(r).unwrap();
        match record.tagging {
            DeveloperTagging::Legacy { production } => {
                assert_eq!(production[0], DeveloperSlot::new("Bob", 5, 0));
                assert_eq!(production[1], DeveloperSlot::default());
            }
            other => panic!("expected legacy tagging, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tagging_is_decode_error() {
        let mut r = row();
        r.tagging = "v3".to_string();
        assert!(matches!(ReportRecord::try_from(r), Err(RecordDecodeError::UnknownTagging { .. })));
    }
}
