use crate::automation::{AutomationError, AutomationResult, PageDriver, StrategyFailure};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Future returned by a strategy, borrowing the driver for its duration
pub type StrategyFuture<'a> = Pin<Box<dyn Future<Output = AutomationResult<()>> + Send + 'a>>;

/// One way of performing an action against a page
pub type Strategy = Box<dyn for<'a> Fn(&'a mut dyn PageDriver) -> StrategyFuture<'a> + Send + Sync>;

/// Ordered alternatives for a single action
///
/// Strategies are tried in insertion order; the first success wins and the
/// rest are skipped. When every strategy fails, the error lists each attempt.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<(String, Strategy)>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named strategy
    pub fn with<F>(mut self, name: impl Into<String>, strategy: F) -> Self
    where
        F: for<'a> Fn(&'a mut dyn PageDriver) -> StrategyFuture<'a> + Send + Sync + 'static,
    {
        self.strategies.push((name.into(), Box::new(strategy)));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs the chain against a driver
    ///
    /// # Returns
    ///
    /// * `Ok(name)` - Name of the strategy that succeeded
    /// * `Err(AutomationError::AllStrategiesFailed)` - Every strategy failed
    /// * `Err(AutomationError::EmptyChain)` - There was nothing to try
    pub async fn run(&self, driver: &mut dyn PageDriver) -> AutomationResult<String> {
        if self.strategies.is_empty() {
            return Err(AutomationError::EmptyChain);
        }

        let mut failures = Vec::new();
        for (name, strategy) in &self.strategies {
            match strategy(&mut *driver).await {
                Ok(()) => {
                    tracing::debug!("Strategy '{}' succeeded", name);
                    return Ok(name.clone());
                }
                Err(e) => {
                    tracing::debug!("Strategy '{}' failed: {}", name, e);
                    failures.push(StrategyFailure {
                        strategy: name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(AutomationError::AllStrategiesFailed(failures))
    }
}

/// Fills the first field that appears among `selectors`
///
/// Each selector gets up to `timeout` to appear before the next one is tried.
/// Returns the selector that was filled.
pub async fn fill_first(
    driver: &mut dyn PageDriver,
    selectors: &[&str],
    value: &str,
    timeout: Duration,
) -> AutomationResult<String> {
    let mut chain = StrategyChain::new();
    for selector in selectors {
        let selector = selector.to_string();
        let value = value.to_string();
        chain = chain.with(selector.clone(), move |driver| {
            let selector = selector.clone();
            let value = value.clone();
            Box::pin(async move {
                driver.wait_for(&selector, timeout).await?;
                driver.find_and_fill_field(&selector, &value).await
            })
        });
    }
    chain.run(driver).await
}

/// Clicks the first element that appears among `selectors`
///
/// Returns the selector that was clicked.
pub async fn click_first(
    driver: &mut dyn PageDriver,
    selectors: &[&str],
    timeout: Duration,
) -> AutomationResult<String> {
    let mut chain = StrategyChain::new();
    for selector in selectors {
        let selector = selector.to_string();
        chain = chain.with(selector.clone(), move |driver| {
            let selector = selector.clone();
            Box::pin(async move {
                driver.wait_for(&selector, timeout).await?;
                driver.click(&selector).await
            })
        });
    }
    chain.run(driver).await
}
