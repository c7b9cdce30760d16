//! Follow-up batches for failed targets
//!
//! A retry is a brand new batch containing only the targets that failed.
//! Successful retry outcomes replace the original failures in place; a target
//! that fails again keeps its first failure.

use crate::harvest::coordinator::Coordinator;
use crate::model::{BatchReport, Target};
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a batch, then re-runs failed targets up to `retries` times
///
/// # Arguments
///
/// * `coordinator` - Coordinator used for the initial batch and every retry
/// * `targets` - Targets in enumeration order
/// * `retries` - Maximum number of follow-up batches (0 disables retrying)
/// * `cancel` - Token shared by the initial batch and the retries
pub async fn run_with_retries(
    coordinator: &Coordinator,
    targets: Vec<Target>,
    retries: u32,
    cancel: CancellationToken,
) -> Result<BatchReport, HarvestError> {
    let mut report = coordinator.run(targets, cancel.clone()).await?;

    for attempt in 1..=retries {
        if cancel.is_cancelled() {
            break;
        }

        let failed: Vec<(usize, Target)> = report
            .outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| (o.index, o.target.clone()))
            .collect();

        if failed.is_empty() {
            break;
        }

        tracing::info!(
            "Retry {}/{}: re-running {} failed targets",
            attempt,
            retries,
            failed.len()
        );

        let retry = coordinator.run_indexed(failed, cancel.clone()).await;
        report = merge_retry(report, retry);
    }

    Ok(report)
}

/// Folds a follow-up batch into the original report
///
/// Outcomes are matched by `index`. Only successful retry outcomes replace
/// the original; ordering and `total_targets` are unchanged.
pub fn merge_retry(mut report: BatchReport, retry: BatchReport) -> BatchReport {
    for outcome in retry.outcomes.into_iter().filter(|o| o.is_success()) {
        if let Some(slot) = report.outcomes.iter_mut().find(|o| o.index == outcome.index) {
            *slot = outcome;
        }
    }

    report.finished_at = retry.finished_at.max(report.finished_at);
    report
}
