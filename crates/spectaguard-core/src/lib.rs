//! SpectaGuard Core - Foundation crate for the SpectaGuard privacy probe suite.
//!
//! This crate provides the shared result model, error handling and ambient
//! configuration that the probe, scoring and telemetry crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - Environment-driven ambient configuration (logging, telemetry)
//! - [`types`] - Shared newtypes and enums (`ProbeId`, `ProbeStatus`, `RiskLevel`, `Timestamp`)
//! - [`result`] - The uniform `ProbeResult` and its strongly typed detail payloads
//!
//! # Example
//!
//! ```rust
//! use spectaguard_core::{ProbeId, ProbeResult, ProbeResults};
//!
//! let mut results = ProbeResults::new();
//! results.insert(ProbeId::TransportLeak, ProbeResult::failed(50, "API absent"));
//! assert!(results.get(ProbeId::TransportLeak).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{LoggingConfig, SuiteConfig, TelemetryConfig};
pub use error::{ConfigError, ConfigResult, PlatformError, Result, SpectaguardError};
pub use result::{
    CanvasDetails, CanvasEvidence, CapabilityCheck, CapabilityInventory, ContentHash,
    CookieCheck, DoNotTrackCheck, FingerprintDetails, HashQuality, IdentitySnapshot,
    ProbeDetails, ProbeEntry, ProbeResult, ProbeResults, RawEvidence, ScreenGeometry, StorageDetails,
    StorageEvidence, TransportEvidence, TransportLeakDetails, TransportSecurityCheck,
    WebStorageCheck,
};
pub use types::{ProbeId, ProbeStatus, RiskLevel, Timestamp};
