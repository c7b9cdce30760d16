//! Batch coordinator - concurrent fetch-and-extract orchestration
//!
//! This module runs one batch of targets, including:
//! - Launching one unit of work per target, bounded by an optional limit
//! - Politeness spacing between requests to the same origin
//! - Converting every fetch or extraction failure into a per-target outcome
//! - Stopping new launches on cancellation while letting in-flight fetches finish
//! - Assembling outcomes in target enumeration order

use crate::config::BatchConfig;
use crate::harvest::extractor::Extractor;
use crate::harvest::fetcher::Fetcher;
use crate::harvest::throttle::OriginThrottle;
use crate::model::{BatchReport, FetchResult, Target, TargetOutcome};
use crate::HarvestError;
use chrono::Utc;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tuning knobs for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of fetches in flight; `None` leaves it unbounded
    pub concurrency_limit: Option<NonZeroUsize>,

    /// Minimum spacing between requests to the same origin
    pub politeness_delay: Duration,

    /// Per-request timeout handed to the fetcher
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            concurrency_limit: config
                .concurrency_limit
                .and_then(|limit| NonZeroUsize::new(limit as usize)),
            politeness_delay: config.politeness_delay(),
            timeout: config.timeout(),
        }
    }
}

/// Runs batches of targets through a fetcher and an extractor
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    options: BatchOptions,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Retrieval strategy shared by every unit
    /// * `extractor` - Extraction rules shared by every unit
    /// * `options` - Concurrency, politeness and timeout settings
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        options: BatchOptions,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            options,
        }
    }

    /// Runs one batch
    ///
    /// Every target that is launched produces exactly one outcome, whether it
    /// succeeds or fails. Outcome `index` values are the targets' positions in
    /// `targets`.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - The batch ran; individual targets may have failed
    /// * `Err(HarvestError::EmptyBatch)` - `targets` was empty
    pub async fn run(
        &self,
        targets: Vec<Target>,
        cancel: CancellationToken,
    ) -> Result<BatchReport, HarvestError> {
        if targets.is_empty() {
            return Err(HarvestError::EmptyBatch);
        }

        Ok(self
            .run_indexed(targets.into_iter().enumerate().collect(), cancel)
            .await)
    }

    /// Runs a batch of targets that carry their own outcome indices
    ///
    /// Used for follow-up batches, where the indices refer to the original
    /// enumeration rather than to positions in this batch.
    pub(crate) async fn run_indexed(
        &self,
        targets: Vec<(usize, Target)>,
        cancel: CancellationToken,
    ) -> BatchReport {
        let started_at = Utc::now();
        let total_targets = targets.len();

        tracing::info!(
            "Starting batch of {} targets (limit: {})",
            total_targets,
            self.options
                .concurrency_limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );

        let throttle = Arc::new(OriginThrottle::new());
        let slots = self
            .options
            .concurrency_limit
            .map(|limit| Arc::new(Semaphore::new(limit.get())));

        let mut tasks = JoinSet::new();
        let mut outcomes: Vec<Option<TargetOutcome>> = (0..total_targets).map(|_| None).collect();

        for (position, (index, target)) in targets.into_iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            let unit = Unit {
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                throttle: Arc::clone(&throttle),
                slots: slots.clone(),
                delay: target.delay.unwrap_or(self.options.politeness_delay),
                timeout: self.options.timeout,
                cancel: cancel.clone(),
            };

            tasks.spawn(async move { (position, unit.process(index, target).await) });
        }

        if cancel.is_cancelled() {
            tracing::warn!("Batch cancelled, waiting for in-flight targets");
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, Some(outcome))) => outcomes[position] = Some(outcome),
                Ok((_, None)) => {}
                Err(e) => tracing::error!("Target task failed: {}", e),
            }
        }

        let outcomes: Vec<TargetOutcome> = outcomes.into_iter().flatten().collect();
        let incomplete = outcomes.len() < total_targets;

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            total_targets,
            outcomes,
            incomplete,
        };

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {} records{}",
            report.success_count(),
            report.failure_count(),
            report.total_records(),
            if incomplete { " (incomplete)" } else { "" }
        );

        report
    }
}

/// Everything one target needs, moved into its task
struct Unit {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    throttle: Arc<OriginThrottle>,
    /// Batch-wide fetch slots; `None` when unbounded
    slots: Option<Arc<Semaphore>>,
    delay: Duration,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Unit {
    /// Fetches and extracts one target
    ///
    /// Takes the origin turn first and a fetch slot second; a unit waiting
    /// out its politeness delay holds no slot.
    ///
    /// Returns `None` only when the batch was cancelled before the fetch began.
    async fn process(self, index: usize, target: Target) -> Option<TargetOutcome> {
        let origin = target.origin();

        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Skipping {} after cancellation", target.name);
                return None;
            }
            permit = self.throttle.acquire(&origin, self.delay) => permit,
        };

        let _slot = match &self.slots {
            Some(slots) => {
                let acquired = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    slot = Arc::clone(slots).acquire_owned() => slot.ok(),
                };
                match acquired {
                    Some(slot) => Some(slot),
                    None => {
                        tracing::debug!("Skipping {} after cancellation", target.name);
                        return None;
                    }
                }
            }
            None => None,
        };

        tracing::debug!("Fetching {} ({})", target.name, target.url);
        let result = self.fetcher.fetch(&target, self.timeout).await;
        permit.complete();

        let outcome = match result {
            FetchResult::Failure(failure) => {
                tracing::warn!("Failed to fetch {}: {}", target.name, failure);
                TargetOutcome::fetch_failed(index, target, failure)
            }
            FetchResult::Success { raw_content, .. } => {
                let extraction = self.extractor.extract(&raw_content);
                match extraction.error {
                    Some(error) => {
                        tracing::warn!("Failed to extract {}: {}", target.name, error);
                        TargetOutcome::extract_failed(index, target, error)
                    }
                    None => {
                        tracing::info!(
                            "{}: {} records",
                            target.name,
                            extraction.records.len()
                        );
                        TargetOutcome::succeeded(
                            index,
                            target,
                            extraction.page_title,
                            extraction.records,
                        )
                    }
                }
            }
        };

        Some(outcome)
    }
}
