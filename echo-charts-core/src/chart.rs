use crate::aggregate::{aggregate_view, AggregateOptions, ChartView, SeriesKind, SeriesPoint, SeriesSet};
use crate::locate::locate;
use crate::record::Record;
use echo_charts_common::Result;
use serde::Serialize;

/// Series for all three dashboard views, rebuilt together on every full redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub daily: SeriesSet,
    pub hourly: SeriesSet,
    pub weekday: SeriesSet,
}

impl ChartData {
    pub fn view(&self, view: ChartView) -> &SeriesSet {
        match view {
            ChartView::Daily => &self.daily,
            ChartView::Hourly => &self.hourly,
            ChartView::Weekday => &self.weekday,
        }
    }
}

pub fn build_chart_data(records: &[Record], opts: &AggregateOptions) -> ChartData {
    ChartData {
        daily: aggregate_view(records, ChartView::Daily, opts),
        hourly: aggregate_view(records, ChartView::Hourly, opts),
        weekday: aggregate_view(records, ChartView::Weekday, opts),
    }
}

/// What the last full redraw was drawn for. Owned by whoever manages the
/// chart lifecycle; a new width or a new data generation forces a rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawState {
    width: Option<u16>,
    generation: Option<u64>,
}

impl RedrawState {
    pub fn new() -> Self {
        Self::default()
    }

    /// true (and remembers the inputs) when `width` or `generation` changed since the last call
    pub fn needs_redraw(&mut self, width: u16, generation: u64) -> bool {
        if self.width == Some(width) && self.generation == Some(generation) {
            return false;
        }
        self.width = Some(width);
        self.generation = Some(generation);
        true
    }

    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    pub fn width(&self) -> Option<u16> {
        self.width
    }
}

/// Linear map between axis values `[min, max]` and plot columns `[0, width]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    pub width: f64,
}

impl AxisScale {
    pub fn new(min: f64, max: f64, width: f64) -> Self {
        Self { min, max, width }
    }

    /// axis extent of a series set (the `both` series spans every key)
    pub fn for_series(set: &SeriesSet, width: f64) -> Option<Self> {
        let pts = set.both.points();
        let first = pts.first()?.position.axis_value();
        let last = pts.last()?.position.axis_value();
        Some(Self::new(first, last, width))
    }

    pub fn apply(&self, v: f64) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        (v - self.min) / (self.max - self.min) * self.width
    }

    pub fn invert(&self, px: f64) -> f64 {
        if self.width <= 0.0 {
            return self.min;
        }
        self.min + px / self.width * (self.max - self.min)
    }
}

/// Interaction state handed to the locator instead of living in event closures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusContext {
    pub selection: SeriesKind,
    /// pointer position in axis units
    pub pointer: f64,
}

/// The focused points for a tooltip: the selected series and `both`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus<'a> {
    pub main: &'a SeriesPoint,
    pub both: &'a SeriesPoint,
}

impl Focus<'_> {
    /// main and both labels would overlap: values within `min_gap` of each other
    pub fn labels_collide(&self, min_gap: f64) -> bool {
        (self.both.value() - self.main.value()).abs() < min_gap
    }
}

pub fn focus<'a>(set: &'a SeriesSet, ctx: &FocusContext) -> Result<Focus<'a>> {
    Ok(Focus {
        main: locate(set.get(ctx.selection), ctx.pointer)?,
        both: locate(&set.both, ctx.pointer)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketKey;
    use crate::record::parse_timestamp;

    fn records() -> Vec<Record> {
        [
            ("2020-01-06 08:10:00.000000+0000", false),
            ("2020-01-06 08:40:00.000000+0000", true),
            ("2020-01-07 09:00:00.000000+0000", false),
            ("2020-01-08 20:00:00.000000+0000", false),
        ]
        .iter()
        .map(|(ts, r)| Record::new(parse_timestamp(ts).unwrap(), *r))
        .collect()
    }

    #[test]
    fn builds_all_views() {
        let data = build_chart_data(&records(), &AggregateOptions::default());
        assert_eq!(data.daily.both.len(), 3);
        assert_eq!(data.hourly.both.len(), 24);
        assert_eq!(data.weekday.both.len(), 7);
        assert_eq!(data.view(ChartView::Hourly).both.get(&BucketKey::Hour(8)).unwrap().count, 2);
    }

    #[test]
    fn redraw_only_on_change() {
        let mut st = RedrawState::new();
        assert!(st.needs_redraw(80, 0));
        assert!(!st.needs_redraw(80, 0));
        assert!(st.needs_redraw(100, 0));
        assert!(st.needs_redraw(100, 1));
        assert!(!st.needs_redraw(100, 1));
        st.invalidate();
        assert!(st.needs_redraw(100, 1));
        assert_eq!(st.width(), Some(100));
    }

    #[test]
    fn scale_round_trip() {
        let s = AxisScale::new(0.0, 20.0, 200.0);
        assert_eq!(s.apply(10.0), 100.0);
        assert_eq!(s.invert(100.0), 10.0);
        assert_eq!(AxisScale::new(4.0, 4.0, 50.0).apply(4.0), 0.0);
        assert_eq!(AxisScale::new(1.0, 2.0, 0.0).invert(3.0), 1.0);
    }

    #[test]
    fn focus_follows_selection() {
        let data = build_chart_data(&records(), &AggregateOptions::default());
        let ctx = FocusContext { selection: SeriesKind::Secondary, pointer: 8.4 };
        let f = focus(&data.hourly, &ctx).unwrap();
        assert_eq!(f.main.position, BucketKey::Hour(8));
        assert_eq!(f.main.count, 1);
        assert_eq!(f.both.count, 2);
        assert!(!f.labels_collide(0.5));
        assert!(f.labels_collide(1.5));
    }

    #[test]
    fn focus_on_empty_daily_is_an_error() {
        let data = build_chart_data(&[], &AggregateOptions::default());
        let ctx = FocusContext { selection: SeriesKind::Primary, pointer: 0.0 };
        assert!(focus(&data.daily, &ctx).is_err());
        assert!(focus(&data.hourly, &ctx).is_ok());
    }

    #[test]
    fn scale_for_series_spans_both() {
        let data = build_chart_data(&records(), &AggregateOptions::default());
        let s = AxisScale::for_series(&data.hourly, 48.0).unwrap();
        assert_eq!((s.min, s.max), (0.0, 23.0));
        assert!(AxisScale::for_series(&SeriesSet::default(), 10.0).is_none());
    }
}
