use crate::model::Target;
use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Topic-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(rename = "target", default)]
    pub targets: Vec<TargetEntry>,
}

impl Config {
    /// Builds the batch targets in configuration order
    pub fn targets(&self) -> Result<Vec<Target>, ConfigError> {
        self.targets.iter().map(TargetEntry::to_target).collect()
    }
}

/// Batch coordinator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of targets processed at once (unbounded when absent)
    #[serde(rename = "concurrency-limit", default)]
    pub concurrency_limit: Option<u32>,

    /// Minimum time between requests to the same origin (milliseconds)
    #[serde(rename = "politeness-delay", default = "default_politeness_delay")]
    pub politeness_delay: u64,

    /// Per-request timeout (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connection establishment timeout (milliseconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// How many times failed targets are re-run as a new batch
    #[serde(default)]
    pub retries: u32,
}

impl BatchConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: None,
            politeness_delay: default_politeness_delay(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: 0,
        }
    }
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Extraction rule configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Headings must contain one of these (case-insensitive)
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Links must contain this substring to count as discussions
    #[serde(rename = "discussion-marker", default = "default_discussion_marker")]
    pub discussion_marker: String,

    /// Discussion titles longer than this many characters are truncated
    #[serde(rename = "title-limit", default = "default_title_limit")]
    pub title_limit: usize,

    /// Headings must be strictly longer than this many characters
    #[serde(rename = "min-heading-length", default = "default_min_heading_length")]
    pub min_heading_length: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            discussion_marker: default_discussion_marker(),
            title_limit: default_title_limit(),
            min_heading_length: default_min_heading_length(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Hierarchical JSON export
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: Option<String>,

    /// Flat CSV export
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: Option<String>,

    /// Markdown summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// SQLite run history
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Log file (in addition to stderr)
    #[serde(rename = "log-path", default)]
    pub log_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            csv_path: default_csv_path(),
            summary_path: None,
            database_path: None,
            log_path: None,
        }
    }
}

/// Daily trigger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Local times of day, `HH:MM` 24h
    #[serde(default = "default_times")]
    pub times: Vec<String>,

    /// How often the trigger loop wakes up (seconds)
    #[serde(rename = "poll-interval", default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            times: default_times(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// One `[[target]]` table
#[derive(Debug, Clone, Deserialize)]
pub struct TargetEntry {
    pub url: String,

    /// Display name (derived from the URL path when absent)
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Politeness delay override (milliseconds)
    #[serde(default)]
    pub delay: Option<u64>,
}

impl TargetEntry {
    pub fn to_target(&self) -> Result<Target, ConfigError> {
        let mut target = Target::new(&self.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target URL '{}': {}", self.url, e)))?;

        if let Some(name) = &self.name {
            target = target.with_name(name.clone());
        }
        if let Some(delay) = self.delay {
            target = target.with_delay(Duration::from_millis(delay));
        }
        target.headers = self.headers.clone();

        Ok(target)
    }
}

fn default_politeness_delay() -> u64 {
    2000
}

fn default_timeout() -> u64 {
    10_000
}

fn default_connect_timeout() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_keywords() -> Vec<String> {
    ["python", "programming", "code", "developer", "coding"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_discussion_marker() -> String {
    "/comments/".to_string()
}

fn default_title_limit() -> usize {
    100
}

fn default_min_heading_length() -> usize {
    3
}

fn default_json_path() -> Option<String> {
    Some("python_topics.json".to_string())
}

fn default_csv_path() -> Option<String> {
    Some("python_topics.csv".to_string())
}

fn default_times() -> Vec<String> {
    vec!["09:00".to_string()]
}

fn default_poll_interval() -> u64 {
    60
}
