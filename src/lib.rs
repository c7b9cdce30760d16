//! Topic-Harvest: a concurrent batch fetch-and-extract engine
//!
//! This crate fetches a batch of independent targets concurrently, extracts
//! structured records from each document, and aggregates the per-target
//! outcomes into a report that survives partial failure.

pub mod automation;
pub mod config;
pub mod harvest;
pub mod logging;
pub mod model;
pub mod output;
pub mod storage;
pub mod trigger;
pub mod url;

use thiserror::Error;

/// Main error type for Topic-Harvest operations
///
/// Per-target failures never surface here; they are recorded as data inside
/// each [`model::TargetOutcome`]. Only errors that abort a whole run do.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch has no targets")]
    EmptyBatch,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid schedule time: {0}")]
    InvalidTime(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Topic-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Coordinator, Extractor, Fetcher, HttpFetcher, KeywordExtractor};
pub use model::{BatchReport, FetchResult, Record, RecordType, Target, TargetOutcome};
pub use output::{summarize, Summary};
