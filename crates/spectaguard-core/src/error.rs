//! Core error types for SpectaGuard.
//!
//! Probe-level failures never surface as errors to callers: they are
//! recovered inside each probe and downgraded to a `failed` result. The types
//! here cover the boundaries that can genuinely fail (configuration, export
//! I/O) and the platform reads that probes recover from.

use thiserror::Error;

/// Central error type for SpectaGuard operations.
#[derive(Error, Debug)]
pub enum SpectaguardError {
    /// Configuration errors (env overrides, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (report export)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// A platform capability read failed.
///
/// Returned by the platform provider traits. Probes recover these locally and
/// never propagate them to the orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The capability does not exist on this platform
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The capability exists but access was refused
    #[error("capability blocked: {0}")]
    Blocked(String),

    /// The capability was reachable but the operation threw
    #[error("platform operation failed: {0}")]
    Failed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Telemetry endpoint is not a usable URL
    #[error("invalid telemetry endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Result type alias using `SpectaguardError`.
pub type Result<T> = std::result::Result<T, SpectaguardError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::Unavailable("RTCPeerConnection".to_string());
        assert_eq!(err.to_string(), "capability unavailable: RTCPeerConnection");

        let err = ConfigError::InvalidValue {
            field: "telemetry.endpoint".to_string(),
            reason: "missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for telemetry.endpoint: missing"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::InvalidValue {
            field: "x".to_string(),
            reason: "y".to_string(),
        };
        let err: SpectaguardError = config_err.into();
        assert!(matches!(err, SpectaguardError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: SpectaguardError = io_err.into();
        assert!(matches!(err, SpectaguardError::Io(_)));
    }
}
