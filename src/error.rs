//! Run-level error taxonomy.

use diff_core::{DifferError, Side};
use es_source::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to detect Elasticsearch version of {endpoint}: {reason}")]
    VersionDetectionFailed { endpoint: String, reason: String },

    #[error("Unsupported Elasticsearch version {version} at {endpoint}")]
    UnsupportedVersion { endpoint: String, version: String },

    #[error("Fetching from {side} failed: {error}")]
    SourceFetch { side: Side, error: SourceError },

    #[error(transparent)]
    DifferPreconditionViolated(DifferError),

    #[error("Comparison cancelled")]
    Cancelled,

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompareError {
    /// Attribute a document source failure to one side of the comparison.
    pub fn from_source(side: Side, error: SourceError) -> Self {
        match error {
            SourceError::Cancelled => Self::Cancelled,
            SourceError::Configuration(message) => Self::Configuration(message),
            error => Self::SourceFetch { side, error },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<DifferError> for CompareError {
    fn from(error: DifferError) -> Self {
        match error {
            DifferError::Source { side, error } => Self::from_source(side, error),
            DifferError::Cancelled => Self::Cancelled,
            violation @ DifferError::PreconditionViolated { .. } => {
                Self::DifferPreconditionViolated(violation)
            }
        }
    }
}
