use crate::record::{parse_flag, parse_timestamp, Record};
use crate::source::{read_source, resolve_sources, CsvSource};
use echo_charts_common::{DataConfig, EchoChartsError, MalformedRows, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    pub timestamp_column: String,
    pub flag_column: String,
    pub delimiter: u8,
    pub on_malformed: MalformedRows,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::from(&DataConfig::default())
    }
}

impl From<&DataConfig> for LoaderOptions {
    fn from(cfg: &DataConfig) -> Self {
        Self {
            timestamp_column: cfg.timestamp_column.clone(),
            flag_column: cfg.flag_column.clone(),
            // non-ASCII delimiters are not supported by the csv reader; fall back to comma
            delimiter: u8::try_from(cfg.delimiter).unwrap_or(b','),
            on_malformed: cfg.on_malformed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// rows that became records; skipped rows are only in `rows_skipped`
    pub rows_read: u64,
    pub rows_skipped: u64,
    /// flag values that were neither TRUE nor FALSE, counted as primary
    pub unknown_flags: u64,
}

/// Records from every resolved source, in source order.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub sources: Vec<CsvSource>,
    pub records: Vec<Record>,
    pub stats: LoadStats,
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| EchoChartsError::MissingColumn(name.to_owned()))
}

/// Parses one CSV document into records, appending to `out`.
pub fn read_records<R: Read>(reader: R, opts: &LoaderOptions, out: &mut Vec<Record>) -> Result<LoadStats> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut stats = LoadStats::default();
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(stats); // empty document
    }
    let ts_idx = column_index(&headers, &opts.timestamp_column)?;
    let flag_idx = column_index(&headers, &opts.flag_column)?;
    for (i, row) in rdr.records().enumerate() {
        let row_no = i as u64 + 2; // 1-based, after the header line
        let row = match row {
            Ok(r) => r,
            Err(e) if opts.on_malformed == MalformedRows::Skip => {
                tracing::warn!(row = row_no, error = %e, "skipping unreadable row");
                stats.rows_skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let raw_ts = row.get(ts_idx).unwrap_or("");
        let timestamp = match parse_timestamp(raw_ts) {
            Ok(ts) => ts,
            Err(source) => match opts.on_malformed {
                MalformedRows::Skip => {
                    tracing::warn!(row = row_no, value = raw_ts, "skipping row with bad timestamp");
                    stats.rows_skipped += 1;
                    continue;
                }
                MalformedRows::Fail => {
                    return Err(EchoChartsError::Timestamp { row: row_no, value: raw_ts.to_owned(), source });
                }
            },
        };
        let raw_flag = row.get(flag_idx).unwrap_or("");
        if raw_flag != "TRUE" && raw_flag != "FALSE" {
            stats.unknown_flags += 1;
        }
        out.push(Record::new(timestamp, parse_flag(raw_flag)));
        stats.rows_read += 1;
    }
    Ok(stats)
}

/// resolve `input`, read every source and parse it
pub async fn load_log(input: &str, opts: &LoaderOptions) -> Result<LoadedLog> {
    let sources = resolve_sources(input)?;
    if sources.is_empty() {
        return Err(EchoChartsError::Other(format!("no CSV files found: {input}")));
    }
    let mut log = LoadedLog::default();
    for source in &sources {
        let bytes = read_source(source).await?;
        let stats = read_records(bytes.as_ref(), opts, &mut log.records)?;
        tracing::info!(
            source = %source,
            rows = stats.rows_read,
            skipped = stats.rows_skipped,
            "loaded csv"
        );
        if stats.unknown_flags > 0 {
            tracing::debug!(source = %source, count = stats.unknown_flags, "unrecognised flag values counted as primary");
        }
        log.stats.rows_read += stats.rows_read;
        log.stats.rows_skipped += stats.rows_skipped;
        log.stats.unknown_flags += stats.unknown_flags;
    }
    log.sources = sources;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "id,echoed_at,was_random\n\
        1,2018-03-04 23:15:07.123456+0100,TRUE\n\
        2,2018-03-05 08:00:00.000000+0100,FALSE\n\
        3,2018-03-05 09:00:00.000000+0100,maybe\n";

    fn read(text: &str, opts: &LoaderOptions) -> Result<(Vec<Record>, LoadStats)> {
        let mut out = Vec::new();
        let stats = read_records(text.as_bytes(), opts, &mut out)?;
        Ok((out, stats))
    }

    #[test]
    fn reads_rows_in_order() {
        let (records, stats) = read(LOG, &LoaderOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].was_random);
        assert!(!records[1].was_random);
        assert!(!records[2].was_random);
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.unknown_flags, 1);
    }

    #[test]
    fn bad_timestamp_fails_with_row_number() {
        let text = "echoed_at,was_random\n2018-03-04 23:15:07.1+0100,TRUE\nyesterday,FALSE\n";
        let err = read(text, &LoaderOptions::default()).unwrap_err();
        match err {
            EchoChartsError::Timestamp { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_timestamp_skipped_when_configured() {
        let text = "echoed_at,was_random\nyesterday,FALSE\n2018-03-04 23:15:07.1+0100,TRUE\n";
        let opts = LoaderOptions { on_malformed: MalformedRows::Skip, ..Default::default() };
        let (records, stats) = read(text, &opts).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.rows_read, 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read("echoed_at,other\n", &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, EchoChartsError::MissingColumn(c) if c == "was_random"));
    }

    #[test]
    fn custom_columns_and_delimiter() {
        let cfg = DataConfig {
            timestamp_column: "at".into(),
            flag_column: "random".into(),
            delimiter: ';',
            ..Default::default()
        };
        let text = "at;random\n2018-03-04 23:15:07.000001+0000;TRUE\n";
        let (records, _) = read(text, &LoaderOptions::from(&cfg)).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].was_random);
    }

    #[test]
    fn header_only_and_empty_documents() {
        let (records, _) = read("echoed_at,was_random\n", &LoaderOptions::default()).unwrap();
        assert!(records.is_empty());
        let (records, _) = read("", &LoaderOptions::default()).unwrap();
        assert!(records.is_empty());
    }
}
