//! Error types for mediafetch
//!
//! Startup and server-level failures surface through [`Error`]; everything
//! that goes wrong inside a running job (spawn failure, non-zero exit) is
//! deliberately NOT an `Error` — the process bridge converts those into
//! terminal stream events so the caller always receives a structured `done`
//! record instead of a dropped connection.

use thiserror::Error;

/// Result type alias for mediafetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mediafetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "PORT")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let err = Error::Config {
            message: "invalid PORT value: \"x\"".to_string(),
            key: Some("PORT".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: invalid PORT value: \"x\""
        );
    }

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.to_string().contains("missing"));
    }
}
