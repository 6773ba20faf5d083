use echo_charts_common::{Config, MalformedRows};
use echo_charts_core::{
    build_chart_data, export_json, focus, load_log, locate, AggregateOptions, BucketKey,
    ChartView, EchoChartsError, FocusContext, LoaderOptions, SeriesKind,
};
use std::io::Write;
use tempfile::NamedTempFile;

const HISTORY: &str = "\
id,echoed_at,was_random
1,2018-03-04 23:15:07.123456+0100,TRUE
2,2018-03-05 08:01:00.000000+0100,FALSE
3,2018-03-05 08:30:00.000000+0100,FALSE
4,2018-03-06 08:45:00.000000+0100,TRUE
5,2018-02-28 12:00:00.000000+0100,FALSE
";

fn write_fixture(text: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    tmp.write_all(text.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn opts() -> LoaderOptions {
    LoaderOptions::from(&Config::default().data)
}

#[tokio::test]
async fn load_and_aggregate_all_views() {
    let tmp = write_fixture(HISTORY);
    let log = load_log(tmp.path().to_str().unwrap(), &opts()).await.unwrap();
    assert_eq!(log.records.len(), 5);
    assert_eq!(log.stats.rows_read, 5);
    let data = build_chart_data(&log.records, &AggregateOptions::default());

    // daily: sparse and chronological across the month boundary
    let days: Vec<String> = data.daily.both.points().iter().map(|p| p.position.to_string()).collect();
    assert_eq!(days, vec!["2018-02-28", "2018-03-04", "2018-03-05", "2018-03-06"]);

    // hourly: dense, 3 records at 08h over 2 distinct days
    let eight = data.hourly.both.get(&BucketKey::Hour(8)).unwrap();
    assert_eq!(eight.count, 3);
    assert_eq!(eight.average, Some(1.5));
    assert_eq!(data.hourly.both.len(), 24);

    // weekday: dense, Mon..Sun
    assert_eq!(data.weekday.both.len(), 7);
    assert_eq!(data.weekday.both.total(), 5);

    for view in ChartView::ALL {
        let set = data.view(view);
        for p in set.both.points() {
            let a = set.primary.get(&p.position).map_or(0, |q| q.count);
            let b = set.secondary.get(&p.position).map_or(0, |q| q.count);
            assert_eq!(p.count, a + b);
        }
    }
}

#[tokio::test]
async fn locate_on_loaded_hourly() {
    let tmp = write_fixture(HISTORY);
    let log = load_log(tmp.path().to_str().unwrap(), &opts()).await.unwrap();
    let data = build_chart_data(&log.records, &AggregateOptions::default());
    let p = locate(data.view(ChartView::Hourly).get(SeriesKind::Secondary), 8.2).unwrap();
    assert_eq!(p.position, BucketKey::Hour(8));
    assert_eq!(p.count, 1);
    let f = focus(&data.daily, &FocusContext { selection: SeriesKind::Primary, pointer: -1.0 }).unwrap();
    assert_eq!(f.main.position.to_string(), "2018-02-28");
}

#[tokio::test]
async fn directory_of_logs_is_concatenated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.csv"), "echoed_at,was_random\n2018-03-04 10:00:00.0+0000,TRUE\n").unwrap();
    std::fs::write(dir.path().join("b.csv"), "echoed_at,was_random\n2018-03-05 10:00:00.0+0000,FALSE\n").unwrap();
    let log = load_log(dir.path().to_str().unwrap(), &opts()).await.unwrap();
    assert_eq!(log.sources.len(), 2);
    assert_eq!(log.records.len(), 2);
    assert!(log.records[0].was_random);
}

#[tokio::test]
async fn malformed_row_policy() {
    let tmp = write_fixture("echoed_at,was_random\nsoon,TRUE\n2018-03-05 10:00:00.0+0000,FALSE\n");
    let err = load_log(tmp.path().to_str().unwrap(), &opts()).await.unwrap_err();
    assert!(matches!(err, EchoChartsError::Timestamp { row: 2, .. }));
    let skip = LoaderOptions { on_malformed: MalformedRows::Skip, ..opts() };
    let log = load_log(tmp.path().to_str().unwrap(), &skip).await.unwrap();
    assert_eq!(log.records.len(), 1);
    assert_eq!(log.stats.rows_skipped, 1);
}

#[tokio::test]
async fn nothing_to_load_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_log(dir.path().to_str().unwrap(), &opts()).await.unwrap_err();
    assert!(matches!(err, EchoChartsError::Other(_)));
}

#[tokio::test]
async fn json_export_contains_views() {
    let tmp = write_fixture(HISTORY);
    let log = load_log(tmp.path().to_str().unwrap(), &opts()).await.unwrap();
    let data = build_chart_data(&log.records, &AggregateOptions::default());
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("charts.json");
    export_json(&path, &log.sources, &log.stats, &data).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["hourly"]["both"].as_array().unwrap().len(), 24);
    assert_eq!(doc["daily"]["both"][0]["position"]["value"], "2018-02-28");
    assert_eq!(doc["stats"]["rows_read"], 5);
    assert!(doc["daily"]["both"][0].get("average").is_none());
}
