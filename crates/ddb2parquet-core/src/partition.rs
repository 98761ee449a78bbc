//! Date-partitioned object keys
//!
//! Generates Hive-style keys the query engine can prune on:
//! `year={year}/month={month}/day={day}/{filename}`

use crate::error::{CoreError, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;

/// The calendar day an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PartitionDate(NaiveDate);

impl PartitionDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// `YYYY-MM-DD`, the prefix matched against row timestamps
    pub fn day_prefix(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Object key for this day's export file
    pub fn object_key(&self, filename: &str) -> String {
        partition_key(self.0, filename)
    }
}

impl fmt::Display for PartitionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Resolve an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|e| CoreError::InvalidTimezone {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// The calendar date of `now` as seen in `tz`
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> PartitionDate {
    PartitionDate(now.with_timezone(&tz).date_naive())
}

/// Generate the partition key for a day
///
/// Format: `year={year}/month={month:02}/day={day:02}/{filename}`
pub fn partition_key(date: NaiveDate, filename: &str) -> String {
    format!(
        "year={:04}/month={:02}/day={:02}/{}",
        date.year(),
        date.month(),
        date.day(),
        filename
    )
}
