use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure kinds surfaced by a conversion run.
///
/// The first four variants mirror the classification the pdf2docx runner
/// reports over the wire; they are mapped 1:1 and never retried or
/// translated further. `Engine` covers the cases where the runner process
/// itself could not be driven (spawn failure, timeout, garbled reply).
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file missing, unreadable, or permission-denied.
    #[error("source unavailable: '{path}': {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Input exists but is not a parseable PDF.
    #[error("invalid PDF: '{path}': {detail}")]
    InvalidFormat { path: PathBuf, detail: String },

    /// Output path's parent directory is missing or not writable.
    #[error("destination unavailable: '{path}': {reason}")]
    DestinationUnavailable { path: PathBuf, reason: String },

    /// Opaque failure inside the pdf2docx layout/extraction pipeline.
    #[error("conversion failed: {detail}")]
    ConversionFailure { detail: String },

    /// The engine process could not be run or spoke an invalid protocol.
    #[error("engine error: {detail}")]
    Engine { detail: String },

    /// Local option validation failed before any engine work started.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ConvertError {
    /// Map a wire-level failure kind onto a typed error.
    ///
    /// Unknown kinds collapse into `ConversionFailure`; the runner owns the
    /// classification and the driver passes it through unchanged.
    pub fn from_kind(kind: &str, input: &Path, output: &Path, message: String) -> Self {
        match kind {
            "source_unavailable" => ConvertError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: message,
            },
            "invalid_format" => ConvertError::InvalidFormat {
                path: input.to_path_buf(),
                detail: message,
            },
            "destination_unavailable" => ConvertError::DestinationUnavailable {
                path: output.to_path_buf(),
                reason: message,
            },
            _ => ConvertError::ConversionFailure { detail: message },
        }
    }

    pub fn engine(detail: impl Into<String>) -> Self {
        ConvertError::Engine {
            detail: detail.into(),
        }
    }
}
