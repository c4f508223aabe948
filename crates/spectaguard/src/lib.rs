//! SpectaGuard - client-side privacy exposure check.
//!
//! Runs four independent probes (identity fingerprint, canvas rendering,
//! real-time-transport address leak, storage and headers) against a set of
//! platform capability providers, then folds their results into a weighted
//! composite score, a letter grade, warnings and prioritized recommendations.
//!
//! ## Architecture
//!
//! - [`spectaguard_core`]: result model, errors, ambient configuration
//! - [`spectaguard_probes`]: provider traits, the four probes, the sequential orchestrator
//! - [`spectaguard_scoring`]: scoring engine, warnings, recommendations, report, export
//! - [`spectaguard_telemetry`]: optional detached statistics submission
//!
//! This crate wires them into a [`PrivacyCheck`] session and installs logging.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spectaguard::{init_tracing, PrivacyCheck};
//! use spectaguard_core::SuiteConfig;
//!
//! let config = SuiteConfig::from_env()?;
//! init_tracing(&config.logging);
//!
//! let check = PrivacyCheck::new(&config, &platform)?;
//! let report = check.run().await;
//! println!("{} ({})", report.score, report.grade);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// The privacy check session.
pub mod check;
/// Tracing subscriber setup.
pub mod logging;

pub use check::PrivacyCheck;
pub use logging::init_tracing;
