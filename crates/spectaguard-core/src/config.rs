//! Ambient configuration for SpectaGuard.
//!
//! Scoring weights, thresholds and the transport timeout are compile-time
//! constants and deliberately absent here. This only covers logging and the
//! optional anonymous statistics submission, with environment overrides.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable overriding the log filter.
pub const ENV_LOG: &str = "SPECTAGUARD_LOG";
/// Environment variable enabling/disabling telemetry (true/false).
pub const ENV_TELEMETRY_ENABLED: &str = "SPECTAGUARD_TELEMETRY_ENABLED";
/// Environment variable setting the telemetry endpoint URL.
pub const ENV_TELEMETRY_ENDPOINT: &str = "SPECTAGUARD_TELEMETRY_ENDPOINT";
/// Environment variable setting the telemetry request timeout in seconds.
pub const ENV_TELEMETRY_TIMEOUT_SECS: &str = "SPECTAGUARD_TELEMETRY_TIMEOUT_SECS";

/// Top-level suite configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SuiteConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Anonymous statistics settings
    pub telemetry: TelemetryConfig,
}

impl SuiteConfig {
    /// Build configuration from defaults plus process environment overrides.
    ///
    /// Supports the following environment variables:
    /// - `SPECTAGUARD_LOG`: tracing filter directive
    /// - `SPECTAGUARD_TELEMETRY_ENABLED`: enable telemetry (true/false)
    /// - `SPECTAGUARD_TELEMETRY_ENDPOINT`: absolute http(s) URL
    /// - `SPECTAGUARD_TELEMETRY_TIMEOUT_SECS`: request timeout
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(ENV_LOG) {
            tracing::debug!("Override logging.filter from env: {}", filter);
            self.logging.filter = filter;
        }

        if let Some(val) = lookup(ENV_TELEMETRY_ENABLED) {
            let enabled = val.parse().map_err(|_| ConfigError::InvalidValue {
                field: "telemetry.enabled".to_string(),
                reason: format!("expected true/false, got '{val}'"),
            })?;
            tracing::debug!("Override telemetry.enabled from env: {}", enabled);
            self.telemetry.enabled = enabled;
        }

        if let Some(endpoint) = lookup(ENV_TELEMETRY_ENDPOINT) {
            tracing::debug!("Override telemetry.endpoint from env");
            self.telemetry.endpoint = Some(endpoint);
        }

        if let Some(val) = lookup(ENV_TELEMETRY_TIMEOUT_SECS) {
            let secs = val.parse().map_err(|_| ConfigError::InvalidValue {
                field: "telemetry.timeout_secs".to_string(),
                reason: format!("expected an integer, got '{val}'"),
            })?;
            tracing::debug!("Override telemetry.timeout_secs from env: {}", secs);
            self.telemetry.timeout_secs = secs;
        }

        Ok(())
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.telemetry.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telemetry.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        match (&self.telemetry.endpoint, self.telemetry.enabled) {
            (None, true) => Err(ConfigError::InvalidValue {
                field: "telemetry.endpoint".to_string(),
                reason: "telemetry is enabled but no endpoint is set".to_string(),
            }),
            (Some(endpoint), _) => {
                let url = Url::parse(endpoint)?;
                if matches!(url.scheme(), "http" | "https") {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidValue {
                        field: "telemetry.endpoint".to_string(),
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    })
                }
            }
            (None, false) => Ok(()),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,spectaguard=debug".to_string(),
        }
    }
}

/// Anonymous statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether to submit `{score, grade, per-probe status}` after a run
    pub enabled: bool,
    /// Collection endpoint
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_secs: 5,
        }
    }
}
