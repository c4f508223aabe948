use crate::engine::{BreakdownEntry, Grade, ScoringEngine};
use crate::recommendations::{recommend, Recommendation};
use crate::warnings::collect_warnings;
use serde::{Deserialize, Serialize};
use spectaguard_core::ProbeResults;
use tracing::info;

/// Everything the results view needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Composite score, 0-100
    pub score: u8,
    /// Letter grade of `score`
    pub grade: Grade,
    /// Warnings for probes needing attention
    pub warnings: Vec<String>,
    /// Remediation advice, high priority first
    pub recommendations: Vec<Recommendation>,
    /// Per-probe contributions in weight order
    pub breakdown: Vec<BreakdownEntry>,
    /// The full probe results
    pub results: ProbeResults,
}

/// Assemble the report for a settled result collection.
///
/// Pure apart from logging: the same input always yields the same report.
#[must_use]
pub fn assemble(results: &ProbeResults) -> AggregateReport {
    let summary = ScoringEngine::new().evaluate(results);
    let warnings = collect_warnings(results);
    let recommendations = recommend(results, summary.composite);

    info!(
        score = summary.composite,
        grade = %summary.grade,
        probes = results.len(),
        warnings = warnings.len(),
        recommendations = recommendations.len(),
        "report assembled"
    );

    AggregateReport {
        score: summary.composite,
        grade: summary.grade,
        warnings,
        recommendations,
        breakdown: summary.breakdown,
        results: results.clone(),
    }
}
