//! SpectaGuard Scoring - turns probe results into a graded privacy report.
//!
//! The pipeline after the probes have settled is pure and deterministic:
//!
//! - [`engine`] computes the weight-normalized composite, its letter grade and
//!   the per-probe breakdown
//! - [`warnings`] emits human-readable warnings for probes needing attention
//! - [`recommendations`] builds priority-sorted remediation advice
//! - [`report`] assembles all of the above into an [`AggregateReport`]
//! - [`export`] derives the downloadable [`ExportDocument`]
//!
//! # Example
//!
//! ```rust
//! use spectaguard_core::{ProbeId, ProbeResult, ProbeResults};
//! use spectaguard_scoring::{assemble, Grade};
//!
//! let mut results = ProbeResults::new();
//! results.insert(ProbeId::TransportLeak, ProbeResult::failed(50, "API absent"));
//!
//! let report = assemble(&results);
//! assert_eq!(report.score, 50);
//! assert_eq!(report.grade, Grade::F);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Composite score, grade and breakdown.
pub mod engine;
/// Export document for downloads.
pub mod export;
/// Priority-sorted remediation advice.
pub mod recommendations;
/// Report assembly.
pub mod report;
/// Per-probe warning rules.
pub mod warnings;

pub use engine::{BreakdownEntry, Grade, ScoreSummary, ScoringEngine, WEIGHTS};
pub use export::{ExportDocument, ExportedRecommendation};
pub use recommendations::{recommend, Priority, Recommendation};
pub use report::{assemble, AggregateReport};
pub use warnings::collect_warnings;
