//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for a batch, including:
//! - Building the shared HTTP client with the configured user agent
//! - Per-target request headers
//! - Per-request timeouts
//! - Error classification into `NetworkError` / `HttpError(code)`
//!
//! A fetch performs exactly one round trip and never retries; retrying is
//! the coordinator's decision.

use crate::config::{BatchConfig, UserAgentConfig};
use crate::model::{FetchFailure, FetchResult, Target};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// A single-target retrieval strategy
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one target
    ///
    /// Implementations must report every failure through
    /// [`FetchResult::Failure`] rather than panicking.
    async fn fetch(&self, target: &Target, timeout: Duration) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `batch` - Batch configuration (connect timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use topic_harvest::config::{BatchConfig, UserAgentConfig};
/// use topic_harvest::harvest::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &BatchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    batch: &BatchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.as_str())
        .connect_timeout(batch.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(user_agent: &UserAgentConfig, batch: &BatchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, batch)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &Target, timeout: Duration) -> FetchResult {
        let request = self
            .client
            .get(target.url.clone())
            .headers(build_headers(target))
            .timeout(timeout);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::Failure(classify_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::Failure(FetchFailure::http(
                status.as_u16(),
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            ));
        }

        match response.bytes().await {
            Ok(body) => FetchResult::Success {
                raw_content: body.to_vec(),
                retrieved_at: Utc::now(),
                status_code: status.as_u16(),
            },
            Err(e) => FetchResult::Failure(classify_error(&e)),
        }
    }
}

/// Converts per-target headers, skipping entries that are not valid HTTP
fn build_headers(target: &Target) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in &target.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(
                    "Skipping invalid header '{}' for target {}",
                    name,
                    target.name
                );
            }
        }
    }

    headers
}

/// Maps a transport error onto a network failure with a readable message
fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::network("Request timeout")
    } else if e.is_connect() {
        FetchFailure::network(format!("Connection failed: {}", e))
    } else {
        FetchFailure::network(e.to_string())
    }
}
