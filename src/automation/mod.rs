//! Page automation interface
//!
//! Some sources need an interactive page (log in, fill a form, press a
//! button) instead of a plain GET. This module defines the driver interface
//! such flows are written against, plus the strategy chain used when a page
//! element can be located in more than one way.
//!
//! Drivers are used sequentially by a single flow and are never shared with
//! the batch coordinator.

mod strategy;

pub use strategy::{click_first, fill_first, Strategy, StrategyChain, StrategyFuture};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a page driver or a strategy chain
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {timeout:?} waiting for {selector}")]
    Timeout { selector: String, timeout: Duration },

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Strategy chain is empty")]
    EmptyChain,

    #[error("All strategies failed: {}", FailureList(.0))]
    AllStrategiesFailed(Vec<StrategyFailure>),
}

/// Result type for automation operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// One failed attempt inside a strategy chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// Name of the strategy (for selector chains, the selector)
    pub strategy: String,
    pub message: String,
}

struct FailureList<'a>(&'a [StrategyFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{}] {}", failure.strategy, failure.message)?;
        }
        Ok(())
    }
}

/// Drives one interactive page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Loads `url` in the page
    async fn navigate(&mut self, url: &str) -> AutomationResult<()>;

    /// Locates the element matching `selector` and types `value` into it
    async fn find_and_fill_field(&mut self, selector: &str, value: &str) -> AutomationResult<()>;

    /// Locates the element matching `selector` and clicks it
    async fn click(&mut self, selector: &str) -> AutomationResult<()>;

    /// Waits until an element matching `selector` is present
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> AutomationResult<()>;
}
