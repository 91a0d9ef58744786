use es_source::{DocumentKey, SourceError};
use thiserror::Error;

/// Which input of the Differ an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DifferError {
    #[error("{side} failed: {error}")]
    Source { side: Side, error: SourceError },

    #[error("{side} keys are not strictly increasing: '{current}' follows '{previous}'")]
    PreconditionViolated {
        side: Side,
        previous: DocumentKey,
        current: DocumentKey,
    },

    #[error("Comparison cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DifferError>;
