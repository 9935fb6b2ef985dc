//! Report record model
//!
//! A report describes one QA run of a release version in one environment.
//! Two developer slots carry pass/fail counts. Older documents used a
//! different tagging convention (slots 1/2 always development, plus a second
//! pair of production slots); [`ReportRecord::developer_outcomes`] is the
//! single place that convention is interpreted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::time::DELAY_GRACE_MILLIS;

/// Deployment environment a report was executed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Development, Environment::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment names are matched after lower-casing
impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            _ => Err(s.to_string()),
        }
    }
}

/// One developer slot on a report; an empty name marks the slot unused
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperSlot {
    pub name: String,
    pub passed: i64,
    pub failed: i64,
}

impl DeveloperSlot {
    pub fn new(name: impl Into<String>, passed: i64, failed: i64) -> Self {
        Self {
            name: name.into(),
            passed,
            failed,
        }
    }

    pub fn is_assigned(&self) -> bool {
        !self.name.is_empty()
    }
}

/// How the developer slots of a stored report map to environments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum DeveloperTagging {
    /// Both slots take the report's own environment
    #[default]
    Environment,
    /// Slots are development outcomes; `production` holds the production pair
    Legacy { production: [DeveloperSlot; 2] },
}

impl DeveloperTagging {
    pub fn scheme(&self) -> &'static str {
        match self {
            DeveloperTagging::Environment => "environment",
            DeveloperTagging::Legacy { .. } => "legacy",
        }
    }
}

/// Normalized (developer, environment, passed, failed) tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperOutcome {
    pub developer: String,
    pub environment: Environment,
    pub passed: i64,
    pub failed: i64,
}

/// Release timeliness of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeliness {
    #[serde(rename = "on time")]
    OnTime,
    #[serde(rename = "delayed")]
    Delayed,
}

impl Timeliness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeliness::OnTime => "on time",
            Timeliness::Delayed => "delayed",
        }
    }
}

/// Canonical report record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: Uuid,
    pub environment: Environment,
    pub sprint: String,
    pub version: String,
    pub due_date: DateTime<Utc>,
    pub close_date: DateTime<Utc>,
    pub total_test_cases: i64,
    pub total_bugs: i64,
    pub developers: [DeveloperSlot; 2],
    pub tagging: DeveloperTagging,
    /// Feature releases are never classified as delayed
    pub feature: bool,
    pub created_at: DateTime<Utc>,
}

impl ReportRecord {
    /// Create a report with empty developer slots and current-scheme tagging
    pub fn new(
        environment: Environment,
        sprint: impl Into<String>,
        version: impl Into<String>,
        due_date: DateTime<Utc>,
        close_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            environment,
            sprint: sprint.into(),
            version: version.into(),
            due_date,
            close_date,
            total_test_cases: 0,
            total_bugs: 0,
            developers: [DeveloperSlot::default(), DeveloperSlot::default()],
            tagging: DeveloperTagging::Environment,
            feature: false,
            created_at: crate::time::now(),
        }
    }

    /// Fan the developer slots out into environment-tagged outcomes
    ///
    /// Unassigned slots (empty name) produce nothing.
    pub fn developer_outcomes(&self) -> Vec<DeveloperOutcome> {
        let tagged: Vec<(&DeveloperSlot, Environment)> = match &self.tagging {
            DeveloperTagging::Environment => self
                .developers
                .iter()
                .map(|slot| (slot, self.environment))
                .collect(),
            DeveloperTagging::Legacy { production } => self
                .developers
                .iter()
                .map(|slot| (slot, Environment::Development))
                .chain(production.iter().map(|slot| (slot, Environment::Production)))
                .collect(),
        };

        tagged
            .into_iter()
            .filter(|(slot, _)| slot.is_assigned())
            .map(|(slot, environment)| DeveloperOutcome {
                developer: slot.name.clone(),
                environment,
                passed: slot.passed,
                failed: slot.failed,
            })
            .collect()
    }

    /// Passed count across both primary slots, assigned or not
    pub fn slot_passed(&self) -> i64 {
        self.developers.iter().map(|slot| slot.passed).sum()
    }

    /// Failed count across both primary slots, assigned or not
    pub fn slot_failed(&self) -> i64 {
        self.developers.iter().map(|slot| slot.failed).sum()
    }

    /// Closed strictly later than 24 hours after the due date, and not a feature release
    pub fn is_delayed(&self) -> bool {
        !self.feature && self.close_date > self.due_date + Duration::milliseconds(DELAY_GRACE_MILLIS)
    }

    pub fn timeliness(&self) -> Timeliness {
        if self.is_delayed() {
            Timeliness::Delayed
        } else {
            Timeliness::OnTime
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::start_of_day;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        start_of_day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn record(due: DateTime<Utc>, close: DateTime<Utc>) -> ReportRecord {
        ReportRecord::new(Environment::Development, "Sprint 1", "1.0.0", due, close)
    }

    #[test]
    fn test_environment_parse_is_case_insensitive() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("DEVELOPMENT".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("staging".parse::<Environment>(), Err("staging".to_string()));
        assert!(" production".parse::<Environment>().is_err());
    }

    #[test]
    fn test_close_two_days_late_is_delayed() {
        let r = record(day(2024, 1, 1), day(2024, 1, 3));
        assert!(r.is_delayed());
        assert_eq!(r.timeliness(), Timeliness::Delayed);
    }

    #[test]
    fn test_close_same_day_is_on_time() {
        let r = record(day(2024, 1, 1), day(2024, 1, 1));
        assert_eq!(r.timeliness(), Timeliness::OnTime);
    }

    #[test]
    fn test_close_exactly_one_day_late_is_on_time() {
        let r = record(day(2024, 1, 1), day(2024, 1, 2));
        assert_eq!(r.timeliness(), Timeliness::OnTime);

        let mut late = record(day(2024, 1, 1), day(2024, 1, 2) + Duration::milliseconds(1));
        assert_eq!(late.timeliness(), Timeliness::Delayed);
        late.feature = true;
        assert_eq!(late.timeliness(), Timeliness::OnTime);
    }

    #[test]
    fn test_feature_release_never_delayed() {
        let mut r = record(day(2024, 1, 1), day(2024, 6, 1));
        r.feature = true;
        assert!(!r.is_delayed());
    }

    #[test]
    fn test_outcomes_follow_record_environment() {
        let mut r = record(day(2024, 1, 1), day(2024, 1, 1));
        r.environment = Environment::Production;
        r.developers = [DeveloperSlot::new("Alice", 8, 2), DeveloperSlot::new("Bob", 1, 1)];

        let outcomes = r.developer_outcomes();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.environment == Environment::Production));
        assert_eq!(outcomes[0].developer, "Alice");
        assert_eq!(outcomes[0].passed, 8);
        assert_eq!(outcomes[0].failed, 2);
    }

    #[test]
    fn test_unassigned_slots_are_skipped() {
        let mut r = record(day(2024, 1, 1), day(2024, 1, 1));
        r.developers = [DeveloperSlot::new("", 5, 5), DeveloperSlot::new("Bob", 1, 0)];

        let outcomes = r.developer_outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].developer, "Bob");
        // Unassigned slot counts still contribute to slot totals
        assert_eq!(r.slot_passed(), 6);
        assert_eq!(r.slot_failed(), 5);
    }

    #[test]
    fn test_legacy_tagging_splits_dev_and_prod() {
        let mut r = record(day(2024, 1, 1), day(2024, 1, 1));
        r.environment = Environment::Production;
        r.developers = [DeveloperSlot::new("Alice", 3, 1), DeveloperSlot::default()];
        r.tagging = DeveloperTagging::Legacy {
            production: [DeveloperSlot::new("Alice", 9, 1), DeveloperSlot::new("Carol", 2, 0)],
        };

        let outcomes = r.developer_outcomes();
        assert_eq!(
            outcomes,
            vec![
                DeveloperOutcome {
                    developer: "Alice".into(),
                    environment: Environment::Development,
                    passed: 3,
                    failed: 1,
                },
                DeveloperOutcome {
                    developer: "Alice".into(),
                    environment: Environment::Production,
                    passed: 9,
                    failed: 1,
                },
                DeveloperOutcome {
                    developer: "Carol".into(),
                    environment: Environment::Production,
                    passed: 2,
                    failed: 0,
                },
            ]
        );
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let r = record(day(2024, 1, 1), day(2024, 1, 1));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["environment"], "development");
        assert!(json.get("dueDate").is_some());
        assert!(json.get("totalBugs").is_some());
        assert_eq!(json["tagging"]["scheme"], "environment");
    }
}
