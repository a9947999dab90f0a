use thiserror::Error;

use crate::scan::ScanError;

/// Errors surfaced by the summarization pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A serialized summary could not be decoded.
    #[error("at JSON path {path} → {message}")]
    Decode { path: String, message: String },

    #[error("jq filter failed: {0}")]
    Jq(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
