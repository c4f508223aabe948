//! SpectaGuard Telemetry - best-effort anonymous run statistics.
//!
//! After a report is assembled, the facade may submit `{score, grade,
//! per-probe status}` to a collection endpoint. Submission runs on a detached
//! task: it never delays report delivery, and its failures are only logged.
//! Telemetry is disabled unless explicitly configured.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Error types for telemetry submission.
pub mod error;
/// The submitted payload.
pub mod payload;
/// Sinks and detached submission.
pub mod sink;

pub use error::{Result, TelemetryError};
pub use payload::{ProbeStatusEntry, TelemetryPayload};
pub use sink::{submit_detached, HttpTelemetrySink, TelemetrySink};
