use crate::bucket::{Bucket, BucketKey, Granularity, KeyFn};
use crate::record::Record;
use chrono::NaiveDate;
use echo_charts_common::{AverageBasis, BucketZone, DataConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub position: BucketKey,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
}

impl SeriesPoint {
    /// value drawn on the y axis: the average when one was computed, else the count
    pub fn value(&self) -> f64 {
        self.average.unwrap_or(self.count as f64)
    }
}

/// Points strictly ascending by position. Only constructed from a sorted map
/// or through [`Series::from_points`], which sorts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn from_points(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| a.position.cmp(&b.position));
        points.dedup_by(|a, b| a.position == b.position);
        Self { points }
    }
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn get(&self, key: &BucketKey) -> Option<&SeriesPoint> {
        self.points
            .binary_search_by(|p| p.position.cmp(key))
            .ok()
            .map(|i| &self.points[i])
    }
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.count).sum()
    }
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(SeriesPoint::value).fold(0.0, f64::max)
    }
    /// (axis, value) pairs ready for a line chart
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.position.axis_value(), p.value())).collect()
    }
}

/// Which subset a series tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Both,
    /// `was_random == false` ("expls")
    Primary,
    /// `was_random == true` ("rexpls")
    Secondary,
}

impl SeriesKind {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Both => "both",
            SeriesKind::Primary => "expls",
            SeriesKind::Secondary => "rexpls",
        }
    }
    /// the main-series radio toggle; `Both` is never the main series
    pub fn toggled(&self) -> Self {
        match self {
            SeriesKind::Primary => SeriesKind::Secondary,
            _ => SeriesKind::Primary,
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeriesKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(SeriesKind::Both),
            "expls" | "primary" => Ok(SeriesKind::Primary),
            "rexpls" | "secondary" => Ok(SeriesKind::Secondary),
            _ => Err(format!("unknown series: {s} (use expls, rexpls or both)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesSet {
    pub both: Series,
    pub primary: Series,
    pub secondary: Series,
}

impl SeriesSet {
    pub fn get(&self, kind: SeriesKind) -> &Series {
        match kind {
            SeriesKind::Both => &self.both,
            SeriesKind::Primary => &self.primary,
            SeriesKind::Secondary => &self.secondary,
        }
    }
}

/// The three charts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartView {
    Daily,
    Hourly,
    Weekday,
}

impl ChartView {
    pub const ALL: [ChartView; 3] = [ChartView::Daily, ChartView::Hourly, ChartView::Weekday];

    pub fn granularity(&self) -> Granularity {
        match self {
            ChartView::Daily => Granularity::Day,
            ChartView::Hourly => Granularity::HourOfDay,
            ChartView::Weekday => Granularity::Weekday,
        }
    }
    /// hourly shows per-day averages, the other two raw counts
    pub fn averages_by_default(&self) -> bool {
        matches!(self, ChartView::Hourly)
    }
    pub fn name(&self) -> &'static str {
        match self {
            ChartView::Daily => "daily",
            ChartView::Hourly => "hourly",
            ChartView::Weekday => "weekday",
        }
    }
    pub fn next(&self) -> Self {
        match self {
            ChartView::Daily => ChartView::Hourly,
            ChartView::Hourly => ChartView::Weekday,
            ChartView::Weekday => ChartView::Daily,
        }
    }
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartView {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" | "day" => Ok(ChartView::Daily),
            "hourly" | "hour" => Ok(ChartView::Hourly),
            "weekday" | "weekdaily" | "weekly" => Ok(ChartView::Weekday),
            _ => Err(format!("unknown view: {s} (use daily, hourly or weekday)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateOptions {
    pub zone: BucketZone,
    pub average_basis: AverageBasis,
    /// force averaging on or off instead of the view default
    pub with_average: Option<bool>,
}

impl From<&DataConfig> for AggregateOptions {
    fn from(cfg: &DataConfig) -> Self {
        Self { zone: cfg.bucket_zone, average_basis: cfg.average_basis, with_average: None }
    }
}

/// `count / days` to two decimals, half away from zero, computed in integer
/// hundredths.
fn average(count: u64, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let days = days as u64;
    let hundredths = (200 * count + days) / (2 * days);
    hundredths as f64 / 100.0
}

/// Groups `records` by `key_fn` into the both / primary / secondary series.
///
/// Counting goes through a `BTreeMap`, so output order is key order (dense
/// views follow their canonical domain) and identical input always gives
/// identical output. With `with_average`, each point carries
/// `count / distinct days` to two decimals where the days are those that contributed
/// to that key in that series.
pub fn aggregate(records: &[Record], key_fn: &KeyFn, with_average: bool) -> SeriesSet {
    aggregate_with_basis(records, key_fn, with_average, AverageBasis::PerKey)
}

pub fn aggregate_with_basis(
    records: &[Record],
    key_fn: &KeyFn,
    with_average: bool,
    basis: AverageBasis,
) -> SeriesSet {
    let mut buckets: BTreeMap<BucketKey, Bucket> = BTreeMap::new();
    if let Some(domain) = key_fn.domain() {
        for key in domain {
            buckets.insert(key, Bucket::default());
        }
    }
    let mut all_days: BTreeSet<NaiveDate> = BTreeSet::new();
    for r in records {
        let day = with_average.then(|| r.day(key_fn.zone));
        if let Some(d) = day {
            all_days.insert(d);
        }
        buckets.entry(key_fn.key(r)).or_default().add(r.was_random, day);
    }
    tracing::debug!(
        records = records.len(),
        buckets = buckets.len(),
        granularity = ?key_fn.granularity,
        "aggregated"
    );

    let mut both = Vec::with_capacity(buckets.len());
    let mut primary = Vec::with_capacity(buckets.len());
    let mut secondary = Vec::with_capacity(buckets.len());
    for (key, b) in &buckets {
        let avg = |count: u64, days: &BTreeSet<NaiveDate>| {
            with_average.then(|| match basis {
                AverageBasis::PerKey => average(count, days.len()),
                AverageBasis::Dataset => average(count, all_days.len()),
            })
        };
        both.push(SeriesPoint { position: *key, count: b.total, average: avg(b.total, &b.days_total) });
        primary.push(SeriesPoint { position: *key, count: b.primary, average: avg(b.primary, &b.days_primary) });
        secondary.push(SeriesPoint {
            position: *key,
            count: b.secondary,
            average: avg(b.secondary, &b.days_secondary),
        });
    }
    // already in key order; the map is the sort step
    SeriesSet {
        both: Series { points: both },
        primary: Series { points: primary },
        secondary: Series { points: secondary },
    }
}

/// Aggregates for one of the dashboard views with its default averaging.
pub fn aggregate_view(records: &[Record], view: ChartView, opts: &AggregateOptions) -> SeriesSet {
    let key_fn = KeyFn::new(view.granularity(), opts.zone);
    let with_average = opts.with_average.unwrap_or_else(|| view.averages_by_default());
    aggregate_with_basis(records, &key_fn, with_average, opts.average_basis)
}
