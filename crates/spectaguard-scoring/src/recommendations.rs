use serde::{Deserialize, Serialize};
use spectaguard_core::{ProbeDetails, ProbeId, ProbeResults};
use std::fmt;

const FINGERPRINT_HARDENING: u8 = 70;
const CANVAS_BLOCKING: u8 = 60;
const NETWORK_ANONYMIZATION: u8 = 60;
const PRIVACY_EXTENSIONS: u8 = 80;

/// How urgently a recommendation should be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Routine upkeep
    Low,
    /// Worth doing soon
    Medium,
    /// Active exposure
    High,
}

impl Priority {
    /// Sort rank; higher sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of remediation advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Urgency
    pub priority: Priority,
    /// Grouping label
    pub category: String,
    /// Headline
    pub title: String,
    /// What to do and why
    pub description: String,
    /// Concrete next step
    pub action: String,
}

impl Recommendation {
    fn new(
        priority: Priority,
        category: &str,
        title: &str,
        description: &str,
        action: &str,
    ) -> Self {
        Self {
            priority,
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            action: action.to_string(),
        }
    }
}

/// Build the recommendation list for `results` and the composite `score`.
///
/// Rules are independent and evaluated in a fixed order regardless of probe
/// status. The general checkup advice is always included. The list is then
/// stably sorted by priority, high first.
#[must_use]
pub fn recommend(results: &ProbeResults, score: u8) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(ProbeDetails::TransportLeak(d)) = details(results, ProbeId::TransportLeak) {
        if d.local_ip_leak {
            recommendations.push(Recommendation::new(
                Priority::High,
                "WebRTC",
                "Stop WebRTC IP Leak",
                "Disable WebRTC in your browser or use a WebRTC Block extension",
                "Disable WebRTC from browser settings",
            ));
        }
    }

    if let Some(ProbeDetails::Fingerprint(d)) = details(results, ProbeId::Fingerprint) {
        if d.uniqueness_percentile > FINGERPRINT_HARDENING {
            recommendations.push(Recommendation::new(
                Priority::High,
                "Browser Privacy",
                "Obfuscate Your Browser Fingerprint",
                "Use Firefox with uBlock Origin or switch to Tor Browser for stronger privacy",
                "Switch to a privacy-focused browser",
            ));
        }
    }

    if let Some(ProbeDetails::Canvas(d)) = details(results, ProbeId::Canvas) {
        if d.uniqueness_score > CANVAS_BLOCKING {
            recommendations.push(Recommendation::new(
                Priority::Medium,
                "Canvas Protection",
                "Block Canvas Fingerprinting",
                "Use Canvas Blocker or disable canvas API via about:config",
                "Enable canvas fingerprint protection",
            ));
        }
    }

    if let Some(ProbeDetails::Storage(d)) = details(results, ProbeId::Storage) {
        if d.cookies.enabled {
            recommendations.push(Recommendation::new(
                Priority::Medium,
                "Cookie Protection",
                "Tighten Cookie Settings",
                "Block third-party cookies and clear existing tracking cookies",
                "Adjust browser privacy settings",
            ));
        }
    }

    if score < NETWORK_ANONYMIZATION {
        recommendations.push(Recommendation::new(
            Priority::High,
            "General Security",
            "Use a VPN",
            "Hide your IP address and location using a trusted VPN service",
            "Get a reputable VPN",
        ));
    }

    if score < PRIVACY_EXTENSIONS {
        recommendations.push(Recommendation::new(
            Priority::Medium,
            "Browser Extensions",
            "Install Privacy Extensions",
            "Use uBlock Origin, Privacy Badger, and DuckDuckGo Privacy Essentials",
            "Install and configure recommended extensions",
        ));
    }

    recommendations.push(Recommendation::new(
        Priority::Low,
        "General Advice",
        "Regular Privacy Checkups",
        "Repeat this test monthly and keep your privacy settings up to date",
        "Add a reminder to your calendar",
    ));

    // sort_by is stable: equal priorities keep generation order.
    recommendations.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
    recommendations
}

fn details(results: &ProbeResults, probe: ProbeId) -> Option<&ProbeDetails> {
    results.get(probe).and_then(|r| r.details.as_ref())
}
