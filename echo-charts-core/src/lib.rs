pub mod aggregate;
pub mod bucket;
pub mod chart;
pub mod export;
pub mod loader;
pub mod locate;
pub mod record;
pub mod source;

pub use aggregate::{
    aggregate, aggregate_view, aggregate_with_basis, AggregateOptions, ChartView, Series,
    SeriesKind, SeriesPoint, SeriesSet,
};
pub use bucket::{Bucket, BucketKey, Granularity, KeyFn, WEEKDAYS};
pub use chart::{build_chart_data, focus, AxisScale, ChartData, Focus, FocusContext, RedrawState};
pub use echo_charts_common::{EchoChartsError, Result};
pub use export::{export_csv, export_json, print_summary, write_summary, write_view_table};
pub use loader::{load_log, read_records, LoadStats, LoadedLog, LoaderOptions};
pub use locate::locate;
pub use record::{parse_flag, parse_timestamp, Record, TIMESTAMP_FORMAT};
pub use source::{is_http_uri, read_source, resolve_sources, CsvSource};
