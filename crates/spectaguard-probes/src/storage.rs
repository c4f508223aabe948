use crate::platform::{PlatformResult, StorageSurface, WebStorage};
use crate::probe::Probe;
use async_trait::async_trait;
use spectaguard_core::{
    CapabilityCheck, CapabilityInventory, CookieCheck, DoNotTrackCheck, ProbeDetails, ProbeId,
    ProbeResult, ProbeStatus, RawEvidence, RiskLevel, StorageDetails, StorageEvidence,
    TransportSecurityCheck, WebStorageCheck,
};
use std::sync::Arc;
use tracing::{debug, warn};

const PROBE_COOKIE: &str = "test_privacy_cookie=1; path=/; SameSite=Strict";
const PROBE_COOKIE_PAIR: &str = "test_privacy_cookie=1";
const EXPIRED_PROBE_COOKIE: &str =
    "test_privacy_cookie=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/";

const LOCAL_PROBE_KEY: &str = "privacy_test_local";
const LOCAL_PROBE_VALUE: &str = "test_value_123";
const SESSION_PROBE_KEY: &str = "privacy_test_session";
const SESSION_PROBE_VALUE: &str = "test_session_123";

const POLICY_META: &str = "Strict-Transport-Security";
const SECURE_SCHEME: &str = "https:";

/// Score at or above which the result is `ok`.
const OK_THRESHOLD: u8 = 80;

/// User-agent characters kept as evidence.
const USER_AGENT_PREFIX_LEN: usize = 50;

/// Inspects cookie, web storage, header and capability exposure.
///
/// Each sub-check degrades independently: a failing storage area is recorded
/// as unavailable rather than failing the probe. Only the header reads
/// (do-not-track, scheme, policy meta, user agent) abort the whole check.
pub struct StorageProbe {
    surface: Arc<dyn StorageSurface>,
}

impl StorageProbe {
    /// Create a probe reading from `surface`.
    #[must_use]
    pub fn new(surface: Arc<dyn StorageSurface>) -> Self {
        Self { surface }
    }

    fn inspect(&self) -> PlatformResult<ProbeResult> {
        let cookies = self.check_cookies();
        let local_storage = check_web_storage(
            self.surface.local_storage(),
            LOCAL_PROBE_KEY,
            LOCAL_PROBE_VALUE,
            local_storage_risk,
        );
        let session_storage = check_web_storage(
            self.surface.session_storage(),
            SESSION_PROBE_KEY,
            SESSION_PROBE_VALUE,
            session_storage_risk,
        );
        let do_not_track = self.check_do_not_track()?;
        let transport_security = self.check_transport_security()?;
        let capabilities = self.check_capabilities();
        let user_agent = self.surface.user_agent()?;

        let details = StorageDetails {
            cookies,
            local_storage,
            session_storage,
            do_not_track,
            transport_security,
            capabilities,
        };

        let score = storage_score(&details);
        let status = if score >= OK_THRESHOLD {
            ProbeStatus::Ok
        } else {
            ProbeStatus::Warning
        };

        debug!(
            score,
            cookies = details.cookies.enabled,
            local_items = details.local_storage.existing_items,
            secure = details.transport_security.secure,
            sensitive_apis = details.capabilities.sensitive_apis,
            "storage surface evaluated"
        );

        let mut user_agent_prefix: String =
            user_agent.chars().take(USER_AGENT_PREFIX_LEN).collect();
        user_agent_prefix.push_str("...");

        let evidence = StorageEvidence {
            cookie_enabled: details.cookies.enabled,
            do_not_track: details.do_not_track.value.clone(),
            protocol: details.transport_security.protocol.clone(),
            user_agent_prefix,
        };

        Ok(ProbeResult::completed(
            status,
            score,
            ProbeDetails::Storage(details),
            Some(RawEvidence::Storage(evidence)),
        ))
    }

    fn check_cookies(&self) -> CookieCheck {
        match self.exercise_cookie() {
            Ok((enabled, can_write)) => CookieCheck {
                enabled,
                can_write,
                risk_level: if enabled {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                },
                error: None,
            },
            Err(e) => {
                debug!(error = %e, "cookie check unavailable");
                CookieCheck {
                    enabled: false,
                    can_write: false,
                    risk_level: RiskLevel::Low,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Write, read back and expire the probe cookie.
    fn exercise_cookie(&self) -> PlatformResult<(bool, bool)> {
        let enabled = self.surface.cookies_enabled()?;
        self.surface.set_cookie(PROBE_COOKIE)?;
        let can_write = self.surface.cookie_string()?.contains(PROBE_COOKIE_PAIR);
        self.surface.set_cookie(EXPIRED_PROBE_COOKIE)?;
        Ok((enabled, can_write))
    }

    fn check_do_not_track(&self) -> PlatformResult<DoNotTrackCheck> {
        let value = self.surface.do_not_track()?;
        let enabled = matches!(value.as_deref(), Some("1" | "yes"));
        Ok(DoNotTrackCheck {
            enabled,
            value,
            risk_level: if enabled {
                RiskLevel::Low
            } else {
                RiskLevel::Medium
            },
        })
    }

    fn check_transport_security(&self) -> PlatformResult<TransportSecurityCheck> {
        let protocol = self.surface.protocol()?;
        let secure = protocol == SECURE_SCHEME;
        let hsts = self.surface.has_meta_http_equiv(POLICY_META)?;
        Ok(TransportSecurityCheck {
            secure,
            hsts,
            protocol,
            risk_level: if secure {
                RiskLevel::Low
            } else {
                RiskLevel::High
            },
        })
    }

    fn check_capabilities(&self) -> CapabilityCheck {
        match self.surface.capabilities() {
            Ok(inventory) => CapabilityCheck {
                sensitive_apis: inventory.sensitive_count(),
                risk_level: if inventory.geolocation || inventory.camera {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
                available: inventory,
                error: None,
            },
            Err(e) => {
                debug!(error = %e, "capability inventory unavailable");
                CapabilityCheck {
                    available: CapabilityInventory::default(),
                    sensitive_apis: 0,
                    risk_level: RiskLevel::Low,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl Probe for StorageProbe {
    fn id(&self) -> ProbeId {
        ProbeId::Storage
    }

    async fn run(&self) -> ProbeResult {
        self.inspect().unwrap_or_else(|e| {
            warn!(probe = %self.id(), error = %e, "storage inspection failed");
            ProbeResult::failed(self.failure_score(), e.to_string())
        })
    }
}

/// Round-trip a probe entry through a storage area and count what was there.
fn check_web_storage(
    area: PlatformResult<&dyn WebStorage>,
    key: &str,
    value: &str,
    risk: fn(usize) -> RiskLevel,
) -> WebStorageCheck {
    let outcome = area.and_then(|storage| {
        storage.set_item(key, value)?;
        let can_write = storage.get_item(key)?.as_deref() == Some(value);
        storage.remove_item(key)?;
        Ok((can_write, storage.len()?))
    });

    match outcome {
        Ok((can_write, existing_items)) => WebStorageCheck {
            available: true,
            can_write,
            existing_items,
            risk_level: risk(existing_items),
            error: None,
        },
        Err(e) => {
            debug!(key, error = %e, "storage area unavailable");
            WebStorageCheck::unavailable(e.to_string())
        }
    }
}

fn local_storage_risk(existing: usize) -> RiskLevel {
    match existing {
        0 => RiskLevel::Low,
        1..=5 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

fn session_storage_risk(existing: usize) -> RiskLevel {
    if existing > 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Fold the six sub-checks into a 0-100 score.
#[must_use]
pub fn storage_score(details: &StorageDetails) -> u8 {
    let mut score: i32 = 100;

    if details.cookies.enabled {
        score -= 15;
    }
    if details.cookies.can_write {
        score -= 10;
    }

    let local = &details.local_storage;
    if local.available && local.can_write {
        score -= 10;
    }
    let existing_penalty = local.existing_items.saturating_mul(2).min(20);
    score -= i32::try_from(existing_penalty).unwrap_or(20);

    let session = &details.session_storage;
    if session.available && session.can_write {
        score -= 5;
    }

    if details.do_not_track.enabled {
        score += 10;
    }

    score += if details.transport_security.secure {
        5
    } else {
        -25
    };

    let sensitive = i32::try_from(details.capabilities.sensitive_apis).unwrap_or(i32::MAX);
    score = score.saturating_sub(sensitive.saturating_mul(10));

    u8::try_from(score.clamp(0, 100)).unwrap_or(0)
}
