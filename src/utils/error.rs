//! Error types for the image pipeline.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use std::path::Path;
use thiserror::Error;
use serde::Serialize;

/// Main error type for the pipeline.
///
/// Per-file failures and batch-fatal failures share this type; which tier an
/// error belongs to is decided by where it surfaces (a `FileOutcome::Failed`
/// entry versus an `Err` from a batch entry point).
#[derive(Error, Debug, Serialize)]
pub enum PipelineError {
    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Source bytes could not be decoded as an image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Re-encoding the decoded image failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// A batch directory is missing, unreadable, or cannot be created
    #[error("Directory error: {0}")]
    Directory(String),

    /// A single file exceeded its processing deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Asset listing failed; carries only a generic message
    #[error("{0}")]
    Listing(String),

    /// Worker pool failure
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

// Helper methods for error creation
impl PipelineError {
    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn directory(path: impl AsRef<Path>, err: impl std::fmt::Display) -> Self {
        Self::Directory(format!("{}: {}", path.as_ref().display(), err))
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn listing<T: Into<String>>(msg: T) -> Self {
        Self::Listing(msg.into())
    }

    pub fn worker<T: Into<String>>(msg: T) -> Self {
        Self::Worker(msg.into())
    }
}

// Convert std::io::Error to PipelineError
impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            image::ImageError::IoError(e) => Self::IO(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}

impl From<png::EncodingError> for PipelineError {
    fn from(err: png::EncodingError) -> Self {
        Self::Encode(format!("PNG encode failed: {err}"))
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
