//! SpectaGuard Probes - browser capability checks and their orchestration.
//!
//! Four independent probes each inspect one platform capability and return a
//! [`ProbeResult`](spectaguard_core::ProbeResult). Probes never raise: a
//! capability that is missing or throws is recovered locally into a `failed`
//! result with a zero or neutral score.
//!
//! All platform state is read through the narrow provider traits in
//! [`platform`], so every probe can be exercised against fixed fixture values.
//!
//! # Example
//!
//! ```rust,ignore
//! use spectaguard_probes::{platform::fixture, ProbeOrchestrator};
//!
//! let orchestrator = ProbeOrchestrator::new(&fixture::typical_desktop());
//! let results = orchestrator.run().await;
//! assert_eq!(results.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Canvas-rendering fingerprint probe.
pub mod canvas;
/// Identity-surface fingerprint probe.
pub mod fingerprint;
/// Content hashing with a degraded checksum fallback.
pub mod hashing;
/// Private/public address classification.
pub mod ip;
/// Sequential probe runner.
pub mod orchestrator;
/// Platform capability provider traits and fixtures.
pub mod platform;
/// The probe capability trait.
pub mod probe;
/// Storage, header and capability exposure probe.
pub mod storage;
/// Real-time-transport address leak probe.
pub mod transport;

pub use canvas::{CanvasProbe, CanvasScene, DrawOp};
pub use fingerprint::FingerprintProbe;
pub use hashing::content_hash;
pub use ip::{classify_address, extract_ipv4, AddressClass};
pub use orchestrator::{ProbeOrchestrator, ProbePhase, ProbeProgress};
pub use platform::{
    CandidateEvent, CanvasSurface, IdentitySurface, PlatformProviders, PlatformResult,
    SessionConfig, StorageSurface, TransportSession, TransportSurface, WebStorage,
};
pub use probe::Probe;
pub use storage::StorageProbe;
pub use transport::TransportLeakProbe;
