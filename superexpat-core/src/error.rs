//! Error types for superexpat-core

use thiserror::Error;

/// Main error type for the superexpat-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Backend answered with a non-2xx status
    #[error("HTTP {status}{}", reason_suffix(.reason))]
    Http { status: u16, reason: String },

    /// Request could not complete or the response body could not be decoded
    #[error("{0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an HTTP error, preferring the reason phrase the server sent.
    ///
    /// Falls back to the canonical phrase when the server sent none.
    pub fn with_reason(status: reqwest::StatusCode, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or_else(|| status.canonical_reason())
            .unwrap_or_default();
        Error::Http {
            status: status.as_u16(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that never produced an HTTP status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(": {reason}")
    }
}

/// Result type alias for superexpat-core
pub type Result<T> = std::result::Result<T, Error>;
