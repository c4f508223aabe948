use serde::{Deserialize, Serialize};
use spectaguard_core::{ProbeId, ProbeStatus};
use spectaguard_scoring::{AggregateReport, Grade};
use std::collections::BTreeMap;

/// Status of one probe as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStatusEntry {
    /// `None` when the probe produced no result
    pub status: Option<ProbeStatus>,
}

/// The anonymous statistics sent after a run.
///
/// Only the composite, the grade and each probe's status. Probe details and
/// raw evidence never leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    /// Composite score
    pub score: u8,
    /// Letter grade
    pub grade: Grade,
    /// Status per probe, every probe listed
    pub results: BTreeMap<ProbeId, ProbeStatusEntry>,
}

impl TelemetryPayload {
    /// Project `report` down to the submitted fields.
    #[must_use]
    pub fn from_report(report: &AggregateReport) -> Self {
        let results = ProbeId::ALL
            .into_iter()
            .map(|probe| {
                let status = report.results.get(probe).map(|r| r.status);
                (probe, ProbeStatusEntry { status })
            })
            .collect();

        Self {
            score: report.score,
            grade: report.grade,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectaguard_core::{ProbeResult, ProbeResults};
    use spectaguard_scoring::assemble;

    #[test]
    fn test_only_statuses_are_submitted() {
        let results: ProbeResults = [(ProbeId::TransportLeak, ProbeResult::failed(50, "absent"))]
            .into_iter()
            .collect();
        let payload = TelemetryPayload::from_report(&assemble(&results));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["score"], 50);
        assert_eq!(json["grade"], "F");
        assert_eq!(json["results"]["transport_leak"]["status"], "failed");
        assert!(json["results"]["fingerprint"]["status"].is_null());
        assert_eq!(json["results"].as_object().unwrap().len(), 4);
        assert!(!json.to_string().contains("absent"));
    }
}
