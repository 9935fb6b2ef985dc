//! Timestamp and calendar-day utilities
//!
//! Report due/close dates carry day granularity. Stored timestamps are UTC
//! milliseconds; query parameters arrive as `YYYY-MM-DD` strings.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{Error, Result};

/// Wire format for calendar days in query parameters and responses
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Milliseconds in one calendar day
pub const DAY_MILLIS: i64 = 86_400_000;

/// Grace period after the due date before a close counts as delayed
pub const DELAY_GRACE_MILLIS: i64 = DAY_MILLIS;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("invalid date '{}': {}", value, e)))
}

/// Render a timestamp as its UTC calendar day
pub fn format_day(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DAY_FORMAT).to_string()
}

/// 00:00:00.000 UTC of the given day
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// 23:59:59.999 UTC of the given day
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    start_of_day(day) + Duration::milliseconds(DAY_MILLIS - 1)
}

/// Convert stored milliseconds back into a timestamp
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Inclusive due-date window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window covering every instant of the start and end days
    pub fn full_days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start_of_day(start),
            end: end_of_day(end),
        }
    }

    /// Window bounded by midnight of both days
    ///
    /// The developer chart filters with the dates exactly as parsed, so a
    /// report due later on the end day falls outside this window.
    pub fn midnight_bounds(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start_of_day(start),
            end: start_of_day(end),
        }
    }

    /// Parse both bounds as `YYYY-MM-DD` and expand to full days
    pub fn parse_full_days(start: &str, end: &str) -> Result<Self> {
        Ok(Self::full_days(parse_day(start)?, parse_day(end)?))
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}
