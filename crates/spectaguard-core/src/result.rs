//! The uniform probe result model.
//!
//! Every probe produces a [`ProbeResult`]: a status discriminant, a 0-100
//! score (higher is more private), and a strongly typed detail payload per
//! probe variant. Detail payloads are consumed by the warning and
//! recommendation engines; raw evidence is for display and export only.

use crate::types::{ProbeId, ProbeStatus, RiskLevel};
use serde::{Deserialize, Serialize};

/// Upper bound of every probe and composite score.
pub const MAX_SCORE: u8 = 100;

/// Output of one probe invocation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Outcome discriminant
    pub status: ProbeStatus,
    /// 0-100, higher is safer
    pub score: u8,
    /// Probe-specific structured findings; absent when the probe failed
    pub details: Option<ProbeDetails>,
    /// Probe-specific evidence for display/export, never used in scoring
    pub raw: Option<RawEvidence>,
    /// Failure reason when `status` is `failed`
    pub error: Option<String>,
}

impl ProbeResult {
    /// A probe that ran to completion.
    #[must_use]
    pub fn completed(
        status: ProbeStatus,
        score: u8,
        details: ProbeDetails,
        raw: Option<RawEvidence>,
    ) -> Self {
        Self {
            status,
            score: score.min(MAX_SCORE),
            details: Some(details),
            raw,
            error: None,
        }
    }

    /// A probe that could not run. `fallback_score` is 0 or a neutral value.
    #[must_use]
    pub fn failed(fallback_score: u8, error: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Failed,
            score: fallback_score.min(MAX_SCORE),
            details: None,
            raw: None,
            error: Some(error.into()),
        }
    }
}

/// Strongly typed detail payload, one variant per probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeDetails {
    /// Identity-surface fingerprint findings
    Fingerprint(FingerprintDetails),
    /// Canvas rendering findings
    Canvas(CanvasDetails),
    /// Transport address leak findings
    TransportLeak(TransportLeakDetails),
    /// Storage/header exposure findings
    Storage(StorageDetails),
}

impl ProbeDetails {
    /// The probe that produces this payload variant.
    #[must_use]
    pub const fn probe_id(&self) -> ProbeId {
        match self {
            Self::Fingerprint(_) => ProbeId::Fingerprint,
            Self::Canvas(_) => ProbeId::Canvas,
            Self::TransportLeak(_) => ProbeId::TransportLeak,
            Self::Storage(_) => ProbeId::Storage,
        }
    }
}

/// How trustworthy a content hash is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashQuality {
    /// SHA-256 digest
    Digest,
    /// Rolling 32-bit checksum; not content-equivalent, lower confidence
    Checksum,
}

/// A content hash with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHash {
    /// Lowercase hex
    pub value: String,
    /// Which algorithm produced `value`
    pub quality: HashQuality,
}

impl ContentHash {
    /// Whether the hash came from the degraded checksum path.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.quality == HashQuality::Checksum
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct FingerprintDetails {
    pub fingerprint_hash: ContentHash,
    /// 0-100, higher is more identifiable
    pub uniqueness_percentile: u8,
    /// Length of the serialised identity snapshot
    pub entropy: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CanvasDetails {
    pub canvas_hash: ContentHash,
    /// 0-100, higher is more identifiable
    pub uniqueness_score: u8,
    /// Length of the encoded surface
    pub data_length: usize,
}

/// Addresses surfaced during transport negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportLeakDetails {
    /// At least one private address was discovered
    pub local_ip_leak: bool,
    /// Distinct private addresses, discovery order
    pub local_ips: Vec<String>,
    /// Distinct public addresses, discovery order
    pub public_ips: Vec<String>,
    /// 0-3
    pub leak_severity: u8,
    /// A rendezvous server reflected a public address
    pub stun_response: bool,
    /// Finalized by the timer rather than discovery completion
    pub timed_out: bool,
}

/// The six storage/header sub-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDetails {
    /// Cookie capability
    pub cookies: CookieCheck,
    /// Persistent key/value storage
    pub local_storage: WebStorageCheck,
    /// Session-scoped key/value storage
    pub session_storage: WebStorageCheck,
    /// Declared do-not-track preference
    pub do_not_track: DoNotTrackCheck,
    /// Scheme and policy declaration
    pub transport_security: TransportSecurityCheck,
    /// Sensitive capability inventory
    pub capabilities: CapabilityCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CookieCheck {
    pub enabled: bool,
    pub can_write: bool,
    pub risk_level: RiskLevel,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct WebStorageCheck {
    pub available: bool,
    pub can_write: bool,
    /// Entries present before the probe wrote anything
    pub existing_items: usize,
    pub risk_level: RiskLevel,
    pub error: Option<String>,
}

impl WebStorageCheck {
    /// Result for a storage area that could not be exercised.
    #[must_use]
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            available: false,
            can_write: false,
            existing_items: 0,
            risk_level: RiskLevel::Low,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct DoNotTrackCheck {
    pub enabled: bool,
    pub value: Option<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TransportSecurityCheck {
    pub secure: bool,
    pub hsts: bool,
    pub protocol: String,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CapabilityCheck {
    pub available: CapabilityInventory,
    /// Count of geolocation, camera, microphone, notifications present
    pub sensitive_apis: usize,
    pub risk_level: RiskLevel,
    pub error: Option<String>,
}

/// Which sensitive capability surfaces the platform exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[allow(missing_docs)]
pub struct CapabilityInventory {
    pub geolocation: bool,
    pub camera: bool,
    /// Shares the media-capture capability with `camera`
    pub microphone: bool,
    pub notifications: bool,
    pub clipboard: bool,
    pub webgl: bool,
    pub web_workers: bool,
    pub service_workers: bool,
    /// Number of declared languages
    pub languages: usize,
    pub language: String,
}

impl CapabilityInventory {
    /// Number of surfaces that carry a score penalty.
    #[must_use]
    pub fn sensitive_count(&self) -> usize {
        [
            self.geolocation,
            self.camera,
            self.microphone,
            self.notifications,
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Evidence payloads, for display and export only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum RawEvidence {
    Fingerprint(IdentitySnapshot),
    Canvas(CanvasEvidence),
    TransportLeak(TransportEvidence),
    Storage(StorageEvidence),
}

/// Screen geometry as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
    pub pixel_depth: u32,
}

impl ScreenGeometry {
    /// `WIDTHxHEIGHT`
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Identity-surface attributes read by the fingerprint probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct IdentitySnapshot {
    pub user_agent: String,
    pub language: String,
    pub languages: Vec<String>,
    pub platform: String,
    pub cookie_enabled: bool,
    pub do_not_track: Option<String>,
    pub timezone: String,
    pub screen: ScreenGeometry,
    /// GiB hint, absent when the platform hides it
    pub device_memory: Option<f64>,
    /// Logical cores hint, absent when the platform hides it
    pub hardware_concurrency: Option<u32>,
    pub touch_support: bool,
    /// At most ten plugin names
    pub plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CanvasEvidence {
    /// First 100 characters of the encoded surface followed by `...`
    pub data_url_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TransportEvidence {
    pub local_ip_count: usize,
    pub public_ip_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct StorageEvidence {
    pub cookie_enabled: bool,
    pub do_not_track: Option<String>,
    pub protocol: String,
    /// First 50 characters of the user agent followed by `...`
    pub user_agent_prefix: String,
}

/// One collected probe result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeEntry {
    /// Which probe produced `result`
    pub probe: ProbeId,
    /// The result
    pub result: ProbeResult,
}

/// Probe results keyed by identity, kept in insertion (completion) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeResults {
    entries: Vec<ProbeEntry>,
}

impl ProbeResults {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result. A second result for the same probe replaces the first in place.
    pub fn insert(&mut self, probe: ProbeId, result: ProbeResult) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.probe == probe) {
            entry.result = result;
        } else {
            self.entries.push(ProbeEntry { probe, result });
        }
    }

    /// Look up the result for `probe`.
    #[must_use]
    pub fn get(&self, probe: ProbeId) -> Option<&ProbeResult> {
        self.entries
            .iter()
            .find(|e| e.probe == probe)
            .map(|e| &e.result)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProbeId, &ProbeResult)> {
        self.entries.iter().map(|e| (e.probe, &e.result))
    }

    /// Number of collected results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no results were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ProbeId, ProbeResult)> for ProbeResults {
    fn from_iter<I: IntoIterator<Item = (ProbeId, ProbeResult)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (probe, result) in iter {
            results.insert(probe, result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_details(uniqueness: u8) -> ProbeDetails {
        ProbeDetails::Canvas(CanvasDetails {
            canvas_hash: ContentHash {
                value: "abc".to_string(),
                quality: HashQuality::Digest,
            },
            uniqueness_score: uniqueness,
            data_length: 10,
        })
    }

    #[test]
    fn test_failed_result_has_no_details() {
        let result = ProbeResult::failed(0, "canvas context unavailable");
        assert_eq!(result.status, ProbeStatus::Failed);
        assert_eq!(result.score, 0);
        assert!(result.details.is_none());
        assert_eq!(result.error.as_deref(), Some("canvas context unavailable"));
    }

    #[test]
    fn test_score_clamped() {
        let result = ProbeResult::completed(ProbeStatus::Ok, 140, canvas_details(0), None);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_details_probe_id() {
        assert_eq!(canvas_details(1).probe_id(), ProbeId::Canvas);
    }

    #[test]
    fn test_results_insertion_order_and_replace() {
        let mut results = ProbeResults::new();
        results.insert(ProbeId::Storage, ProbeResult::failed(0, "x"));
        results.insert(ProbeId::Fingerprint, ProbeResult::failed(0, "y"));
        results.insert(ProbeId::Storage, ProbeResult::failed(0, "z"));

        let order: Vec<ProbeId> = results.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![ProbeId::Storage, ProbeId::Fingerprint]);
        assert_eq!(
            results.get(ProbeId::Storage).and_then(|r| r.error.as_deref()),
            Some("z")
        );
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_sensitive_count() {
        let inventory = CapabilityInventory {
            geolocation: true,
            camera: true,
            microphone: true,
            clipboard: true,
            webgl: true,
            ..CapabilityInventory::default()
        };
        assert_eq!(inventory.sensitive_count(), 3);
    }

    #[test]
    fn test_details_serialization_tag() {
        let json = serde_json::to_value(canvas_details(42)).expect("serialize details");
        assert_eq!(json["kind"], "canvas");
        assert_eq!(json["uniqueness_score"], 42);
    }
}
