//! Data model shared by every stage of a batch
//!
//! # Components
//!
//! - `Target`: one independently fetchable resource
//! - `FetchResult`: the tagged result of a single fetch
//! - `Record` / `Extraction`: structured items pulled out of a document
//! - `TargetOutcome`: the single, final result for one target
//! - `BatchReport`: all outcomes of a batch in enumeration order

mod fetch;
mod outcome;
mod record;
mod report;
mod target;

// Re-export main types
pub use fetch::{FetchFailure, FetchFailureKind, FetchResult};
pub use outcome::{OutcomeStatus, TargetOutcome};
pub use record::{Extraction, ExtractionError, ExtractionErrorKind, Record, RecordType};
pub use report::BatchReport;
pub use target::Target;
