//! Per-origin politeness throttling
//!
//! This module handles:
//! - Serializing requests to the same origin
//! - Enforcing the minimum delay between a completed request and the next
//!   request to that origin
//! - Leaving unrelated origins unblocked
//!
//! Each origin owns an async mutex. A unit holds its origin's lock from the
//! politeness wait until its fetch completes, so at most one request per
//! origin is in flight and the spacing is measured from completion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Tracks request history for one origin
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Number of completed requests to this origin
    pub request_count: u32,

    /// When the last request to this origin completed
    pub last_completed: Option<Instant>,
}

impl OriginState {
    /// Creates a new OriginState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_completed?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < delay {
            Some(delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request to this origin completed
    pub fn record_completion(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_completed = Some(now);
    }
}

/// Exclusive right to issue one request to an origin
///
/// Dropping the permit without calling [`OriginPermit::complete`] releases
/// the origin without recording a request.
pub struct OriginPermit {
    guard: OwnedMutexGuard<OriginState>,
}

impl OriginPermit {
    /// Records the completed request and releases the origin
    pub fn complete(mut self) {
        self.guard.record_completion(Instant::now());
    }
}

/// Politeness gate keyed by origin
#[derive(Debug, Default)]
pub struct OriginThrottle {
    origins: Mutex<HashMap<String, Arc<AsyncMutex<OriginState>>>>,
}

impl OriginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state cell for an origin, creating it on first use
    fn cell(&self, origin: &str) -> Arc<AsyncMutex<OriginState>> {
        let mut origins = self.origins.lock().unwrap_or_else(|e| e.into_inner());
        origins
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(OriginState::new())))
            .clone()
    }

    /// Waits until a request to `origin` is allowed
    ///
    /// This method:
    /// 1. Waits for any in-flight request to the same origin to complete
    /// 2. Sleeps until `delay` has passed since that completion
    /// 3. Returns a permit that holds the origin until the request completes
    ///
    /// The returned future is cancel-safe: dropping it gives up the wait.
    pub async fn acquire(&self, origin: &str, delay: Duration) -> OriginPermit {
        let guard = self.cell(origin).lock_owned().await;

        if let Some(wait) = guard.time_until_next_request(delay, Instant::now()) {
            tracing::debug!(
                "Waiting {:?} before request {} to {}",
                wait,
                guard.request_count + 1,
                origin
            );
            tokio::time::sleep(wait).await;
        }

        OriginPermit { guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    /// Completed requests recorded for an origin (0 if never seen)
    async fn completed_requests(throttle: &OriginThrottle, origin: &str) -> u32 {
        let cell = throttle.origins.lock().unwrap().get(origin).cloned();
        match cell {
            Some(cell) => cell.lock().await.request_count,
            None => 0,
        }
    }

    #[test]
    fn test_new_origin_state() {
        let state = OriginState::new();
        assert_eq!(state.request_count, 0);
        assert!(state.last_completed.is_none());
    }

    #[test]
    fn test_no_wait_initially() {
        let state = OriginState::new();
        assert!(state
            .time_until_next_request(DELAY, Instant::now())
            .is_none());
    }

    #[test]
    fn test_cannot_request_too_soon() {
        let mut state = OriginState::new();
        let now = Instant::now();
        state.record_completion(now);

        assert!(state.time_until_next_request(DELAY, now).is_some());
        assert!(state
            .time_until_next_request(DELAY, now + Duration::from_millis(500))
            .is_some());
        assert!(state
            .time_until_next_request(DELAY, now + Duration::from_millis(1100))
            .is_none());
    }

    #[test]
    fn test_time_until_next_request() {
        let mut state = OriginState::new();
        let now = Instant::now();

        assert!(state.time_until_next_request(DELAY, now).is_none());

        state.record_completion(now);
        assert_eq!(
            state.time_until_next_request(DELAY, now),
            Some(Duration::from_millis(1000))
        );

        let soon = now + Duration::from_millis(500);
        assert_eq!(
            state.time_until_next_request(DELAY, soon),
            Some(Duration::from_millis(500))
        );

        let later = now + Duration::from_millis(1100);
        assert!(state.time_until_next_request(DELAY, later).is_none());
    }

    #[test]
    fn test_zero_delay_never_waits() {
        let mut state = OriginState::new();
        let now = Instant::now();
        state.record_completion(now);
        assert!(state.time_until_next_request(Duration::ZERO, now).is_none());
    }

    #[test]
    fn test_record_completion_counts() {
        let mut state = OriginState::new();
        let now = Instant::now();
        state.record_completion(now);
        state.record_completion(now);
        assert_eq!(state.request_count, 2);
        assert_eq!(state.last_completed, Some(now));
    }

    #[tokio::test]
    async fn test_same_origin_is_spaced() {
        let throttle = OriginThrottle::new();
        let delay = Duration::from_millis(150);

        throttle.acquire("https://a.example", delay).await.complete();
        let start = Instant::now();
        throttle.acquire("https://a.example", delay).await.complete();

        assert!(start.elapsed() >= Duration::from_millis(140));
        assert_eq!(completed_requests(&throttle, "https://a.example").await, 2);
    }

    #[tokio::test]
    async fn test_other_origins_not_blocked() {
        let throttle = OriginThrottle::new();
        let delay = Duration::from_secs(5);

        throttle.acquire("https://a.example", delay).await.complete();

        let start = Instant::now();
        throttle.acquire("https://b.example", delay).await.complete();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(throttle.origins.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_permit_records_nothing() {
        let throttle = OriginThrottle::new();
        let permit = throttle.acquire("https://a.example", DELAY).await;
        drop(permit);

        assert_eq!(completed_requests(&throttle, "https://a.example").await, 0);

        // No completion recorded, so no wait either
        let start = Instant::now();
        throttle.acquire("https://a.example", DELAY).await.complete();
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_unknown_origin_has_no_requests() {
        let throttle = OriginThrottle::new();
        assert_eq!(completed_requests(&throttle, "https://nowhere.example").await, 0);
    }
}
