pub mod config;
pub use config::{AverageBasis, BucketZone, Config, DataConfig, MalformedRows};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoChartsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: cannot parse timestamp {value:?}: {source}")]
    Timestamp {
        row: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("cannot locate a point in an empty series")]
    EmptySeries,
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EchoChartsError>;
