use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_view")]
    pub default_view: String,
    #[serde(default = "default_series")]
    pub default_series: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_theme() -> String {
    "dark".into()
}
fn default_view() -> String {
    "daily".into()
}
fn default_series() -> String {
    "expls".into()
}
fn default_tick_rate() -> u64 {
    66 // 15Hz
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_view: default_view(),
            default_series: default_series(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

/// What to do with a row whose timestamp does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRows {
    #[default]
    Fail,
    Skip,
}

/// Which offset a timestamp is read in when deriving its day, hour and weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BucketZone {
    /// the offset written in the record itself
    #[default]
    Record,
    Utc,
    Local,
}

/// Denominator used for per-day averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AverageBasis {
    /// distinct days that contributed to the key, per series
    #[default]
    PerKey,
    /// distinct days in the whole input
    Dataset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    #[serde(default = "default_flag_column")]
    pub flag_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub on_malformed: MalformedRows,
    #[serde(default)]
    pub bucket_zone: BucketZone,
    #[serde(default)]
    pub average_basis: AverageBasis,
}

fn default_timestamp_column() -> String {
    "echoed_at".into()
}
fn default_flag_column() -> String {
    "was_random".into()
}
fn default_delimiter() -> char {
    ','
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            timestamp_column: default_timestamp_column(),
            flag_column: default_flag_column(),
            delimiter: default_delimiter(),
            on_malformed: MalformedRows::default(),
            bucket_zone: BucketZone::default(),
            average_basis: AverageBasis::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("echo-charts")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("ECHO_CHARTS_CONFIG") {
            PathBuf::from(env_path) // $ECHO_CHARTS_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::EchoChartsError::Config(e.to_string()))
    }

    pub fn save(&self) -> crate::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::EchoChartsError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
