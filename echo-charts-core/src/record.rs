use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use echo_charts_common::BucketZone;
use serde::{Deserialize, Serialize};

/// `YYYY-MM-DD HH:MM:SS.ffffff±HHMM`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%z";

/// One row of the echo log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<FixedOffset>,
    pub was_random: bool,
}

impl Record {
    pub fn new(timestamp: DateTime<FixedOffset>, was_random: bool) -> Self {
        Self { timestamp, was_random }
    }

    /// wall-clock reading of the timestamp in the given zone
    pub fn wall_clock(&self, zone: BucketZone) -> NaiveDateTime {
        match zone {
            BucketZone::Record => self.timestamp.naive_local(),
            BucketZone::Utc => self.timestamp.with_timezone(&Utc).naive_local(),
            BucketZone::Local => self.timestamp.with_timezone(&Local).naive_local(),
        }
    }

    pub fn day(&self, zone: BucketZone) -> NaiveDate {
        self.wall_clock(zone).date()
    }
}

pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
}

/// Only the exact literal `TRUE` counts as true; anything else lands in the primary subset.
pub fn parse_flag(s: &str) -> bool {
    s == "TRUE"
}
