use crate::record::Record;
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use echo_charts_common::BucketZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Canonical weekday order for the weekday view.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Aggregation slot key. Ordering is chronological for days, numeric for
/// hours and Monday-first for weekdays; keys of different kinds never share
/// a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BucketKey {
    Day(NaiveDate),
    Hour(u32),
    Weekday(Weekday),
}

impl BucketKey {
    /// position on the numeric chart axis
    pub fn axis_value(&self) -> f64 {
        match self {
            BucketKey::Day(d) => d.num_days_from_ce() as f64,
            BucketKey::Hour(h) => *h as f64,
            BucketKey::Weekday(w) => w.num_days_from_monday() as f64,
        }
    }

    fn rank(&self) -> (u8, i64) {
        match self {
            BucketKey::Day(d) => (0, d.num_days_from_ce() as i64),
            BucketKey::Hour(h) => (1, *h as i64),
            BucketKey::Weekday(w) => (2, w.num_days_from_monday() as i64),
        }
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            BucketKey::Hour(h) => write!(f, "{h}"),
            BucketKey::Weekday(w) => write!(f, "{w}"), // Mon..Sun
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    HourOfDay,
    Weekday,
}

impl Granularity {
    /// Fixed key set for dense views; `None` means the keys come from the data.
    pub fn domain(&self) -> Option<Vec<BucketKey>> {
        match self {
            Granularity::Day => None,
            Granularity::HourOfDay => Some((0..24).map(BucketKey::Hour).collect()),
            Granularity::Weekday => Some(WEEKDAYS.iter().copied().map(BucketKey::Weekday).collect()),
        }
    }

    /// Reads a user-typed axis position: a bare number, or a date
    /// (`YYYY-MM-DD`) / weekday name (`Mon`) for the views keyed by them.
    pub fn parse_axis(&self, s: &str) -> Option<f64> {
        let s = s.trim();
        if let Ok(v) = s.parse::<f64>() {
            return Some(v);
        }
        match self {
            Granularity::Day => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| BucketKey::Day(d).axis_value()),
            Granularity::Weekday => s.parse::<Weekday>().ok().map(|w| BucketKey::Weekday(w).axis_value()),
            Granularity::HourOfDay => None,
        }
    }
}

/// Pure mapping from a record to its bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFn {
    pub granularity: Granularity,
    pub zone: BucketZone,
}

impl KeyFn {
    pub fn new(granularity: Granularity, zone: BucketZone) -> Self {
        Self { granularity, zone }
    }

    pub fn key(&self, record: &Record) -> BucketKey {
        let wall = record.wall_clock(self.zone);
        match self.granularity {
            Granularity::Day => BucketKey::Day(wall.date()),
            Granularity::HourOfDay => BucketKey::Hour(wall.hour()),
            Granularity::Weekday => BucketKey::Weekday(wall.weekday()),
        }
    }

    pub fn domain(&self) -> Option<Vec<BucketKey>> {
        self.granularity.domain()
    }
}

/// Counters for one key. The day sets back the per-day averages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    pub total: u64,
    pub primary: u64,
    pub secondary: u64,
    pub days_total: BTreeSet<NaiveDate>,
    pub days_primary: BTreeSet<NaiveDate>,
    pub days_secondary: BTreeSet<NaiveDate>,
}

impl Bucket {
    pub fn add(&mut self, was_random: bool, day: Option<NaiveDate>) {
        self.total += 1;
        if was_random {
            self.secondary += 1;
        } else {
            self.primary += 1;
        }
        if let Some(day) = day {
            self.days_total.insert(day);
            if was_random {
                self.days_secondary.insert(day);
            } else {
                self.days_primary.insert(day);
            }
        }
    }
}
