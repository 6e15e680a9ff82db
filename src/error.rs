//! Error types for cheshire-render operations.
//!
//! Renderers never fail: degenerate input yields a placeholder string.
//! These errors cover the surrounding plumbing (configuration, row
//! ingestion, interval parsing and the refresh loop).

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the pure rendering path.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, terminal writes).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file does not exist or cannot be read.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Configuration file is not valid YAML for [`crate::config::Config`].
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line number reported by the YAML parser (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Refresh interval string could not be parsed.
    #[error("Invalid interval format: {0}")]
    InvalidInterval(String),

    /// Width/height string could not be parsed.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Row payload is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rows are JSON, but not an array of objects.
    #[error("Invalid rows: {0}")]
    InvalidRows(String),

    /// Chart name not recognised by the dispatcher.
    #[error("Unknown chart type: {0}")]
    UnknownChart(String),

    /// Upstream data source failed during a refresh tick.
    #[error("Data source error: {0}")]
    Source(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInterval("5x".to_string());
        assert!(err.to_string().contains("Invalid interval"));
        assert!(err.to_string().contains("5x"));
    }

    #[test]
    fn test_config_parse_includes_line() {
        let err = Error::ConfigParse {
            line: 4,
            message: "invalid type".to_string(),
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains("invalid type"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
