use crate::model::{ExtractionError, FetchFailure, Record, Target};
use chrono::{DateTime, Utc};

/// Final status of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Fetched and extracted; zero records is still a success
    Succeeded,

    /// The fetch failed
    FetchFailed(FetchFailure),

    /// The fetch succeeded but the document could not be extracted
    ExtractFailed(ExtractionError),
}

impl OutcomeStatus {
    /// String representation used in exports and the database
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::FetchFailed(_) => "fetch_failed",
            Self::ExtractFailed(_) => "extract_failed",
        }
    }

    /// Human readable failure reason, `None` on success
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Succeeded => None,
            Self::FetchFailed(failure) => Some(failure.to_string()),
            Self::ExtractFailed(error) => Some(error.to_string()),
        }
    }
}

/// The single result recorded for one target
///
/// Build outcomes through the constructors: they guarantee a failed outcome
/// never carries records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    /// Position of the target in the batch enumeration
    pub index: usize,

    pub target: Target,

    pub status: OutcomeStatus,

    /// Document title, when the document was extracted
    pub page_title: Option<String>,

    /// Records in document order (always empty on failure)
    pub records: Vec<Record>,

    pub completed_at: DateTime<Utc>,
}

impl TargetOutcome {
    pub fn succeeded(
        index: usize,
        target: Target,
        page_title: Option<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            index,
            target,
            status: OutcomeStatus::Succeeded,
            page_title,
            records,
            completed_at: Utc::now(),
        }
    }

    pub fn fetch_failed(index: usize, target: Target, failure: FetchFailure) -> Self {
        Self {
            index,
            target,
            status: OutcomeStatus::FetchFailed(failure),
            page_title: None,
            records: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn extract_failed(index: usize, target: Target, error: ExtractionError) -> Self {
        Self {
            index,
            target,
            status: OutcomeStatus::ExtractFailed(error),
            page_title: None,
            records: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded)
    }
}
