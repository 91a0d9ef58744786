use thiserror::Error;

/// Errors raised by a document source.
///
/// The type is `Clone` because a failing source reports the same error twice:
/// once in-band to the consumer of its stream, once as the result of its task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid endpoint configuration: {0}")]
    Configuration(String),

    #[error("Request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("Request to {url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Document stream terminated without reaching its end")]
    Terminated,

    #[error("Document stream cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SourceError>;
