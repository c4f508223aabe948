use crate::hashing::content_hash;
use crate::platform::{IdentitySurface, PlatformResult};
use crate::probe::Probe;
use async_trait::async_trait;
use spectaguard_core::{
    FingerprintDetails, IdentitySnapshot, ProbeDetails, ProbeId, ProbeResult, ProbeStatus,
    RawEvidence,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Plugin names kept in the snapshot.
const MAX_PLUGINS: usize = 10;

/// Uniqueness above which the result is a warning.
const WARNING_THRESHOLD: u8 = 50;

/// Device-memory (GiB) and core-count hints above this are uncommon.
const HIGH_HARDWARE_THRESHOLD: u32 = 8;

const COMMON_USER_AGENTS: [&str; 4] = ["Chrome", "Firefox", "Safari", "Edge"];

const COMMON_RESOLUTIONS: [&str; 5] = ["1920x1080", "1366x768", "1280x720", "1440x900", "1536x864"];

/// Estimates how identifying the browser's identity surface is.
pub struct FingerprintProbe {
    surface: Arc<dyn IdentitySurface>,
}

impl FingerprintProbe {
    /// Create a probe reading from `surface`.
    #[must_use]
    pub fn new(surface: Arc<dyn IdentitySurface>) -> Self {
        Self { surface }
    }

    /// Read every attribute; any failing read aborts the snapshot.
    fn read_snapshot(&self) -> PlatformResult<IdentitySnapshot> {
        let s = &self.surface;
        Ok(IdentitySnapshot {
            user_agent: s.user_agent()?,
            language: s.language()?,
            languages: s.languages()?,
            platform: s.platform()?,
            cookie_enabled: s.cookie_enabled()?,
            do_not_track: s.do_not_track()?,
            timezone: s.timezone()?,
            screen: s.screen()?,
            device_memory: s.device_memory()?,
            hardware_concurrency: s.hardware_concurrency()?,
            touch_support: s.touch_support()?,
            plugins: s.plugins()?.into_iter().take(MAX_PLUGINS).collect(),
        })
    }

    fn evaluate(&self, snapshot: IdentitySnapshot) -> ProbeResult {
        let serialized = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => return ProbeResult::failed(self.failure_score(), e.to_string()),
        };

        let uniqueness = uniqueness_score(&snapshot);
        let status = if uniqueness > WARNING_THRESHOLD {
            ProbeStatus::Warning
        } else {
            ProbeStatus::Ok
        };

        debug!(uniqueness, "identity surface evaluated");

        ProbeResult::completed(
            status,
            100 - uniqueness,
            ProbeDetails::Fingerprint(FingerprintDetails {
                fingerprint_hash: content_hash(&serialized, self.surface.digest_available()),
                uniqueness_percentile: uniqueness,
                entropy: serialized.len(),
            }),
            Some(RawEvidence::Fingerprint(snapshot)),
        )
    }
}

#[async_trait]
impl Probe for FingerprintProbe {
    fn id(&self) -> ProbeId {
        ProbeId::Fingerprint
    }

    async fn run(&self) -> ProbeResult {
        match self.read_snapshot() {
            Ok(snapshot) => self.evaluate(snapshot),
            Err(e) => {
                warn!(probe = %self.id(), error = %e, "identity surface unreadable");
                ProbeResult::failed(self.failure_score(), e.to_string())
            }
        }
    }
}

/// Additive uniqueness heuristic, clamped to 0-100 (higher is more identifiable).
#[must_use]
pub fn uniqueness_score(snapshot: &IdentitySnapshot) -> u8 {
    let mut score: u32 = 0;

    let common_ua = COMMON_USER_AGENTS
        .iter()
        .any(|ua| snapshot.user_agent.contains(ua));
    score += if common_ua { 10 } else { 25 };

    let resolution = snapshot.screen.resolution();
    score += if COMMON_RESOLUTIONS.contains(&resolution.as_str()) {
        5
    } else {
        15
    };

    score += if snapshot.languages.len() > 1 { 10 } else { 5 };

    if let Some(memory) = snapshot.device_memory {
        score += if memory > f64::from(HIGH_HARDWARE_THRESHOLD) {
            15
        } else {
            5
        };
    }

    if let Some(cores) = snapshot.hardware_concurrency {
        score += if cores > HIGH_HARDWARE_THRESHOLD { 10 } else { 5 };
    }

    let plugins = u32::try_from(snapshot.plugins.len()).unwrap_or(u32::MAX);
    score += plugins.saturating_mul(2).min(20);

    // Touch screens are unusual on Windows desktops.
    if snapshot.touch_support && snapshot.platform.contains("Win") {
        score += 10;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}
