//! Error taxonomy for the analysis engine
//!
//! Malformed log lines are not errors: the extractor skips them. Everything
//! here is a condition the caller has to see.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Log file missing or unreadable
    #[error("log source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log source held no valid memory samples
    #[error("no memory_sample records found")]
    NoSamples,

    /// The live snapshot carried an empty module list
    #[error("no module data yet: the producer has not completed its first sampling cycle")]
    NoModuleData,

    /// A rate needs at least two samples
    #[error("insufficient samples: need at least 2, found {found}")]
    InsufficientSamples { found: usize },

    /// Last sample is not later than the first one
    #[error("run duration must be positive, got {seconds:.3}s")]
    NonPositiveDuration { seconds: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// True for the "nothing to report" conditions, as opposed to failures
    pub fn is_no_data(&self) -> bool {
        matches!(self, AnalysisError::NoSamples | AnalysisError::NoModuleData)
    }
}
