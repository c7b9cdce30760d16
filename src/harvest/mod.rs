//! Harvest module: the concurrent fetch-and-extract pipeline
//!
//! This module contains the core batch logic, including:
//! - HTTP fetching with typed failures
//! - Keyword and discussion-link extraction
//! - Per-origin politeness throttling
//! - Concurrent batch coordination with cancellation
//! - Re-running failed targets as follow-up batches

mod coordinator;
mod extractor;
mod fetcher;
mod retry;
mod throttle;

pub use coordinator::{BatchOptions, Coordinator};
pub use extractor::{Extractor, KeywordExtractor};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use retry::{merge_retry, run_with_retries};
pub use throttle::{OriginState, OriginThrottle};

use crate::config::Config;
use crate::model::BatchReport;
use crate::HarvestError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one complete batch from a configuration
///
/// This is the "run once" entry point used by the CLI and the daily trigger.
/// It will:
/// 1. Build the targets from configuration
/// 2. Build the HTTP fetcher and keyword extractor
/// 3. Run the batch, re-running failed targets `batch.retries` times
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `cancel` - Token that stops launching new targets when cancelled
///
/// # Returns
///
/// * `Ok(BatchReport)` - The batch ran (possibly with failed targets)
/// * `Err(HarvestError)` - Configuration or client construction failed
pub async fn harvest(
    config: &Config,
    cancel: CancellationToken,
) -> Result<BatchReport, HarvestError> {
    let targets = config.targets()?;

    let fetcher = Arc::new(HttpFetcher::new(&config.user_agent, &config.batch)?);
    let extractor = Arc::new(KeywordExtractor::new(&config.extract));
    let coordinator = Coordinator::new(fetcher, extractor, BatchOptions::from(&config.batch));

    run_with_retries(&coordinator, targets, config.batch.retries, cancel).await
}
