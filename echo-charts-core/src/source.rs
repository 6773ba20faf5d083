use bytes::Bytes;
use echo_charts_common::{EchoChartsError, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where one CSV log comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum CsvSource {
    Local(PathBuf),
    Remote(String),
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSource::Local(p) => write!(f, "{}", p.display()),
            CsvSource::Remote(u) => f.write_str(u),
        }
    }
}

pub fn is_http_uri(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn scan_directory(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_directory(&path, out)?;
        } else if is_csv(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// resolve an input string: http(s) URL, single file, directory or glob pattern.
/// Local matches are sorted by path so rotated logs load in name order.
pub fn resolve_sources(input: &str) -> Result<Vec<CsvSource>> {
    if is_http_uri(input) {
        return Ok(vec![CsvSource::Remote(input.to_owned())]);
    }
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![CsvSource::Local(path.to_path_buf())]);
    }
    let mut found = Vec::new();
    if path.is_dir() {
        scan_directory(path, &mut found)?;
    } else {
        let entries = glob::glob(input)
            .map_err(|e| EchoChartsError::Other(format!("bad glob pattern {input}: {e}")))?;
        found.extend(entries.flatten().filter(|p| p.is_file() && is_csv(p)));
    }
    found.sort();
    Ok(found.into_iter().map(CsvSource::Local).collect())
}

pub fn read_local_bytes(path: &Path) -> Result<Bytes> {
    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Bytes::new()); // zero-length files cannot be mapped
    }
    // the returned Bytes owns the mapping; no copy of the file is made
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    Ok(Bytes::from_owner(mmap))
}

pub async fn fetch_remote_bytes(url: &str) -> Result<Bytes> {
    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| EchoChartsError::Http(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(EchoChartsError::Http(format!("GET {url}: {}", resp.status())));
    }
    resp.bytes()
        .await
        .map_err(|e| EchoChartsError::Http(e.to_string()))
}

/// unified async reader: dispatches to HTTP or the local file reader
pub async fn read_source(source: &CsvSource) -> Result<Bytes> {
    match source {
        CsvSource::Remote(url) => fetch_remote_bytes(url).await,
        CsvSource::Local(path) => read_local_bytes(path),
    }
}
