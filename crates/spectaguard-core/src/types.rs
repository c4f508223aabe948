//! Shared types used across SpectaGuard.
//!
//! This module defines the probe identities, result status discriminant and
//! the timestamp wrapper used by exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one of the four probes.
///
/// Declaration order is the fixed execution order and the weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeId {
    /// Identity-surface fingerprint
    Fingerprint,
    /// Canvas-rendering fingerprint
    Canvas,
    /// Real-time-transport address leak
    TransportLeak,
    /// Storage, header and capability exposure
    Storage,
}

impl ProbeId {
    /// All probe identities in execution order.
    pub const ALL: [ProbeId; 4] = [
        ProbeId::Fingerprint,
        ProbeId::Canvas,
        ProbeId::TransportLeak,
        ProbeId::Storage,
    ];

    /// Stable machine key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Canvas => "canvas",
            Self::TransportLeak => "transport_leak",
            Self::Storage => "storage",
        }
    }

    /// Human-readable name shown in breakdowns and progress views.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Fingerprint => "Browser Fingerprint",
            Self::Canvas => "Canvas Fingerprint",
            Self::TransportLeak => "WebRTC Leak",
            Self::Storage => "Headers & Storage",
        }
    }

    /// One-line description of what the probe is doing.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Fingerprint => "Analyzing unique browser characteristics",
            Self::Canvas => "Testing canvas drawing uniqueness",
            Self::TransportLeak => "Checking if your IP address is exposed",
            Self::Storage => "Checking cookies and storage permissions",
        }
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome discriminant of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Probe ran and found nothing concerning
    Ok,
    /// Probe ran and found exposure
    Warning,
    /// Probe could not run
    Failed,
}

impl ProbeStatus {
    /// Whether the warning collector should inspect this result.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::Warning | Self::Failed)
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse risk label attached to individual storage sub-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Milliseconds since Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
