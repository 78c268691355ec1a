//! Error types for nbreport.
//!
//! Library crates use [`NbReportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! A notebook that fails to execute is not an error: the executor records it
//! as a failed [`Outcome`](crate::Outcome). These variants cover the faults
//! that abort a run.

use std::path::PathBuf;

/// Top-level error type for all nbreport operations.
#[derive(Debug, thiserror::Error)]
pub enum NbReportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The search root could not be walked.
    #[error("discovery error: {message}")]
    Discovery { message: String },

    /// Data validation error (bad path, invalid argument, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Index or manifest rendering error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NbReportError>;

impl NbReportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a discovery error from any displayable message.
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
