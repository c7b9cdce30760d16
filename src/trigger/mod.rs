//! Daily trigger for unattended runs
//!
//! This module handles:
//! - Parsing `HH:MM` run times from configuration
//! - Deciding which scheduled times have come due
//! - Polling the clock and firing the run-once entry point until cancelled

mod schedule;

pub use schedule::{parse_time_of_day, DailySchedule};

use chrono::{Local, NaiveDateTime};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Runs `run_once` at each scheduled local time until `cancel` fires
///
/// # Arguments
///
/// * `schedule` - Times of day to fire at
/// * `poll_interval` - How often the clock is checked
/// * `cancel` - Stops the loop; a run in progress is awaited first
/// * `run_once` - The batch entry point; errors are logged and the loop continues
///
/// # Returns
///
/// The number of runs fired
pub async fn run_schedule<F, Fut, E>(
    schedule: DailySchedule,
    poll_interval: Duration,
    cancel: CancellationToken,
    run_once: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    run_schedule_with_clock(
        schedule,
        poll_interval,
        cancel,
        || Local::now().naive_local(),
        run_once,
    )
    .await
}

/// Same as [`run_schedule`] with an injectable clock
pub async fn run_schedule_with_clock<C, F, Fut, E>(
    mut schedule: DailySchedule,
    poll_interval: Duration,
    cancel: CancellationToken,
    mut clock: C,
    mut run_once: F,
) -> usize
where
    C: FnMut() -> NaiveDateTime,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if let Some(next) = schedule.next_after(clock()) {
        tracing::info!("Scheduler started, next run at {}", next);
    }

    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now = clock();
        let due = schedule.due_times(now);
        if due.is_empty() {
            continue;
        }

        if due.len() > 1 {
            tracing::warn!(
                "{} scheduled times came due at once, running a single batch",
                due.len()
            );
        }

        tracing::info!("Scheduled run for {} starting", due[due.len() - 1]);
        match run_once().await {
            Ok(()) => tracing::info!("Scheduled run finished"),
            Err(e) => tracing::error!("Scheduled run failed: {}", e),
        }
        runs += 1;

        if let Some(next) = schedule.next_after(clock()) {
            tracing::info!("Next run at {}", next);
        }
    }

    tracing::info!("Scheduler stopped after {} runs", runs);
    runs
}
