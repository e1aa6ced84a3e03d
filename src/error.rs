//! Errors raised while acquiring and ingesting a results document.

use thiserror::Error;

/// Every variant is terminal for the current ingestion attempt.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The byte source could not be read (file I/O or network transport).
    #[error("Failed to read data: {0}")]
    Read(String),

    /// The bytes are not valid UTF-8 JSON (or not a valid gzip stream).
    #[error("Failed to parse JSON data: {0}")]
    Parse(String),

    /// `head.vars` or `results.bindings` is missing or has the wrong shape.
    #[error("Invalid SPARQL JSON format{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Schema { detail: Option<String> },

    /// The default resource answered with a non-success status.
    #[error("Failed to fetch default file: {status} {reason}")]
    Fetch { status: u16, reason: String },
}

impl IngestError {
    pub fn schema() -> Self {
        IngestError::Schema { detail: None }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Read(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
