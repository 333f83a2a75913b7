//! Error types for LitScout.
//!
//! Library crates use [`LitScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LitScout operations.
#[derive(Debug, thiserror::Error)]
pub enum LitScoutError {
    /// Configuration loading or validation error (recoverable: fall back
    /// to defaults / empty history).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP failure for a single source/query call. The run skips
    /// that call's results and continues.
    #[error("transport error: {0}")]
    Transport(String),

    /// A returned record could not be parsed into a candidate. Only that
    /// single record is dropped.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Ledger or report persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Broken invariant (min_year > max_year, score bounds violated, ...).
    /// A programming error: surfaced immediately, never clamped away.
    #[error("invariant violation: {message}")]
    Invariant { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LitScoutError>;

impl LitScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an invariant violation from any displayable message.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LitScoutError::config("state dir unreadable");
        assert_eq!(err.to_string(), "config error: state dir unreadable");

        let err = LitScoutError::invariant("min_year 2024 > max_year 2020");
        assert!(err.to_string().contains("min_year 2024"));

        let err = LitScoutError::Transport("arxiv: HTTP 503".into());
        assert!(err.to_string().starts_with("transport error"));
    }
}
