use crate::aggregate::{Series, SeriesPoint};
use echo_charts_common::{EchoChartsError, Result};

/// Insertion index of `query` among ascending `axis` values, placed after
/// any entries equal to it.
pub fn insertion_index(points: &[SeriesPoint], query: f64) -> usize {
    points.partition_point(|p| p.position.axis_value() <= query)
}

/// Point of `series` closest to `query` on the chart axis.
///
/// Queries before the first point or after the last clamp to that end.
/// When the query sits exactly halfway between two points the later one
/// wins. An empty series is an error: callers must not ask.
pub fn locate(series: &Series, query: f64) -> Result<&SeriesPoint> {
    let points = series.points();
    if points.is_empty() {
        return Err(EchoChartsError::EmptySeries);
    }
    let i = insertion_index(points, query);
    if i == 0 {
        return Ok(&points[0]);
    }
    if i == points.len() {
        return Ok(&points[points.len() - 1]);
    }
    let left = &points[i - 1];
    let right = &points[i];
    let left_gap = query - left.position.axis_value();
    let right_gap = right.position.axis_value() - query;
    Ok(if left_gap >= right_gap { right } else { left })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketKey;
    use chrono::NaiveDate;

    fn hours(points: &[(u32, u64)]) -> Series {
        Series::from_points(
            points
                .iter()
                .map(|&(h, c)| SeriesPoint { position: BucketKey::Hour(h), count: c, average: None })
                .collect(),
        )
    }

    #[test]
    fn tie_goes_to_later_point() {
        let s = hours(&[(0, 1), (10, 2)]);
        let p = locate(&s, 5.0).unwrap();
        assert_eq!(p.position, BucketKey::Hour(10));
        assert_eq!(p.count, 2);
    }

    #[test]
    fn nearest_either_side() {
        let s = hours(&[(0, 1), (10, 2)]);
        assert_eq!(locate(&s, 4.9).unwrap().position, BucketKey::Hour(0));
        assert_eq!(locate(&s, 5.1).unwrap().position, BucketKey::Hour(10));
    }

    #[test]
    fn clamps_at_boundaries() {
        let s = hours(&[(3, 1), (4, 2), (9, 3)]);
        assert_eq!(locate(&s, -2.0).unwrap().position, BucketKey::Hour(3));
        assert_eq!(locate(&s, 30.0).unwrap().position, BucketKey::Hour(9));
    }

    #[test]
    fn exact_hit_returns_that_point() {
        let s = hours(&[(3, 1), (4, 2), (9, 3)]);
        assert_eq!(locate(&s, 4.0).unwrap().position, BucketKey::Hour(4));
        assert_eq!(locate(&s, 9.0).unwrap().position, BucketKey::Hour(9));
        assert_eq!(locate(&s, 3.0).unwrap().position, BucketKey::Hour(3));
    }

    #[test]
    fn single_point_always_wins() {
        let s = hours(&[(7, 1)]);
        assert_eq!(locate(&s, 0.0).unwrap().position, BucketKey::Hour(7));
        assert_eq!(locate(&s, 23.0).unwrap().position, BucketKey::Hour(7));
    }

    #[test]
    fn empty_series_is_an_error() {
        let s = Series::default();
        assert!(matches!(locate(&s, 1.0), Err(EchoChartsError::EmptySeries)));
    }

    #[test]
    fn insertion_point_is_right_of_equal_entries() {
        let s = hours(&[(1, 0), (2, 0), (3, 0)]);
        assert_eq!(insertion_index(s.points(), 2.0), 2);
        assert_eq!(insertion_index(s.points(), 0.5), 0);
        assert_eq!(insertion_index(s.points(), 3.5), 3);
    }

    #[test]
    fn fractional_day_query_on_sparse_days() {
        let d = |m, day| BucketKey::Day(NaiveDate::from_ymd_opt(2020, m, day).unwrap());
        let s = Series::from_points(vec![
            SeriesPoint { position: d(1, 1), count: 4, average: None },
            SeriesPoint { position: d(1, 5), count: 6, average: None },
        ]);
        let jan1 = d(1, 1).axis_value();
        assert_eq!(locate(&s, jan1 + 1.9).unwrap().position, d(1, 1));
        assert_eq!(locate(&s, jan1 + 2.0).unwrap().position, d(1, 5));
    }
}
