//! Error types for telemetry submission.
//!
//! Submission is best-effort: these errors are logged by the caller and never
//! surfaced to the user.

use thiserror::Error;

/// Errors that can occur while submitting statistics.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Telemetry is switched off or has no endpoint
    #[error("telemetry is disabled")]
    Disabled,

    /// Transport-level failure (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if readable
        message: String,
    },

    /// The HTTP client or endpoint could not be set up
    #[error("client error: {0}")]
    Client(String),
}

/// Result type alias using `TelemetryError`.
pub type Result<T> = std::result::Result<T, TelemetryError>;
