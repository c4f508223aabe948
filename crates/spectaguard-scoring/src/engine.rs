//! Weighted composite scoring.
//!
//! The composite is the weight-normalized mean of whichever probes reported.
//! A missing probe is excluded from both numerator and denominator rather than
//! counted as zero, so a partial run still yields a meaningful score.

use serde::{Deserialize, Serialize};
use spectaguard_core::{ProbeId, ProbeResults, ProbeStatus};
use std::fmt;

/// Per-probe weights, in breakdown order.
pub const WEIGHTS: [(ProbeId, u32); 4] = [
    (ProbeId::Fingerprint, 30),
    (ProbeId::Canvas, 20),
    (ProbeId::TransportLeak, 25),
    (ProbeId::Storage, 25),
];

/// Letter grade for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above
    A,
    /// 80-89
    B,
    /// 70-79
    C,
    /// 60-69
    D,
    /// Below 60
    F,
}

impl Grade {
    /// Grade for `score`; each lower bound belongs to the higher grade.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            60..=69 => Self::D,
            _ => Self::F,
        }
    }

    /// Single-letter form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One probe's contribution to the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Display name of the probe
    pub test_name: String,
    /// The probe's own 0-100 score
    pub score: u8,
    /// Table weight
    pub weight: u32,
    /// `score * weight / 100`
    pub weighted_score: f64,
    /// The probe's status
    pub status: ProbeStatus,
}

/// Composite, grade and breakdown for one result collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Weight-normalized mean, 0-100
    pub composite: u8,
    /// Letter grade of `composite`
    pub grade: Grade,
    /// Contributions in weight-table order, present probes only
    pub breakdown: Vec<BreakdownEntry>,
}

/// Stateless scorer over the fixed weight table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

#[allow(clippy::unused_self)]
impl ScoringEngine {
    /// Create an engine using [`WEIGHTS`].
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Score a result collection.
    #[must_use]
    pub fn evaluate(&self, results: &ProbeResults) -> ScoreSummary {
        let composite = self.composite_score(results);
        ScoreSummary {
            composite,
            grade: Grade::from_score(composite),
            breakdown: self.breakdown(results),
        }
    }

    /// `round(sum(score * weight) / sum(weight))` over present probes, 0 if none.
    #[must_use]
    pub fn composite_score(&self, results: &ProbeResults) -> u8 {
        let (weighted, total_weight) = WEIGHTS
            .iter()
            .filter_map(|&(probe, weight)| results.get(probe).map(|r| (r.score, weight)))
            .fold((0u32, 0u32), |(sum, total), (score, weight)| {
                (sum + u32::from(score) * weight, total + weight)
            });

        if total_weight == 0 {
            return 0;
        }

        // Half-up integer rounding of weighted / total_weight.
        let rounded = (2 * weighted + total_weight) / (2 * total_weight);
        u8::try_from(rounded).unwrap_or(u8::MAX)
    }

    /// Breakdown entries in weight-table order.
    #[must_use]
    pub fn breakdown(&self, results: &ProbeResults) -> Vec<BreakdownEntry> {
        WEIGHTS
            .iter()
            .filter_map(|&(probe, weight)| {
                results.get(probe).map(|result| BreakdownEntry {
                    test_name: probe.display_name().to_string(),
                    score: result.score,
                    weight,
                    weighted_score: f64::from(result.score) * f64::from(weight) / 100.0,
                    status: result.status,
                })
            })
            .collect()
    }
}
