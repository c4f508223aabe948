use crate::engine::Grade;
use crate::recommendations::{Priority, Recommendation};
use crate::report::AggregateReport;
use serde::{Deserialize, Serialize};
use spectaguard_core::{Result, Timestamp};
use std::path::Path;
use tracing::debug;

/// Recommendation as written to an export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRecommendation {
    /// Headline
    pub title: String,
    /// What to do and why
    pub description: String,
    /// Urgency
    pub priority: Priority,
    /// Concrete next step
    pub action: String,
}

impl From<&Recommendation> for ExportedRecommendation {
    fn from(rec: &Recommendation) -> Self {
        Self {
            title: rec.title.clone(),
            description: rec.description.clone(),
            priority: rec.priority,
            action: rec.action.clone(),
        }
    }
}

/// Downloadable summary of a report.
///
/// Carries no probe details or raw evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Composite score
    pub score: u8,
    /// Letter grade
    pub grade: Grade,
    /// When the export was produced (RFC 3339)
    pub timestamp: Timestamp,
    /// Warnings as shown to the user
    pub warnings: Vec<String>,
    /// Recommendations, high priority first
    pub recommendations: Vec<ExportedRecommendation>,
}

impl ExportDocument {
    /// Build an export of `report` stamped with `timestamp`.
    #[must_use]
    pub fn from_report(report: &AggregateReport, timestamp: Timestamp) -> Self {
        Self {
            score: report.score,
            grade: report.grade,
            timestamp,
            warnings: report.warnings.clone(),
            recommendations: report.recommendations.iter().map(Into::into).collect(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON document to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?)?;
        debug!(path = %path.display(), "report exported");
        Ok(())
    }

    /// `privacy-test-<unix millis>.json`
    #[must_use]
    pub fn suggested_file_name(&self) -> String {
        format!("privacy-test-{}.json", self.timestamp.timestamp_millis())
    }
}
