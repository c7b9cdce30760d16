use chrono::{DateTime, Utc};
use std::fmt;

/// Result of a single fetch
///
/// Failure is returned as data; a fetcher never propagates an error to the
/// coordinator.
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The resource was retrieved with a 2xx status
    Success {
        /// Raw response body
        raw_content: Vec<u8>,
        /// When the response body finished downloading
        retrieved_at: DateTime<Utc>,
        /// HTTP status code
        status_code: u16,
    },

    /// The resource could not be retrieved
    Failure(FetchFailure),
}

impl FetchResult {
    /// Returns true for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchFailureKind {
    /// Connectivity problem: DNS, refused connection, TLS, timeout, truncated body
    NetworkError,

    /// The server answered with a non-2xx status
    HttpError(u16),
}

impl FetchFailureKind {
    /// Short label used in exports and the database
    pub fn label(&self) -> String {
        match self {
            Self::NetworkError => "network_error".to_string(),
            Self::HttpError(code) => format!("http_error({})", code),
        }
    }
}

/// A failed fetch with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchFailureKind::NetworkError,
            message: message.into(),
        }
    }

    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchFailureKind::HttpError(status_code),
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FetchFailureKind::NetworkError => write!(f, "Network error: {}", self.message),
            FetchFailureKind::HttpError(code) => write!(f, "HTTP {}: {}", code, self.message),
        }
    }
}
