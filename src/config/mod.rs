//! Configuration module for Topic-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every tunable of the batch engine (concurrency, politeness delay, timeouts,
//! keyword list, discussion marker, User-Agent) is injected from here; nothing
//! is hardcoded inside the fetcher or extractor.
//!
//! # Example
//!
//! ```no_run
//! use topic_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Politeness delay: {}ms", config.batch.politeness_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BatchConfig, Config, ExtractConfig, OutputConfig, ScheduleConfig, TargetEntry,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
