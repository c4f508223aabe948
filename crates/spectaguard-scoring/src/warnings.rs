use spectaguard_core::{ProbeDetails, ProbeResults};

const FINGERPRINT_HIGHLY_UNIQUE: u8 = 80;
const FINGERPRINT_IDENTIFIABLE: u8 = 50;
const CANVAS_TRACKABLE: u8 = 70;

/// Human-readable warnings for every probe that needs attention.
///
/// Probes are visited in collection order and rules in declaration order.
/// Identical messages from different rules are kept.
#[must_use]
pub fn collect_warnings(results: &ProbeResults) -> Vec<String> {
    let mut warnings = Vec::new();

    for (_, result) in results.iter() {
        if !result.status.needs_attention() {
            continue;
        }
        if let Some(details) = &result.details {
            warnings.extend(warnings_for(details));
        }
    }

    warnings
}

fn warnings_for(details: &ProbeDetails) -> Vec<String> {
    let mut warnings = Vec::new();

    match details {
        ProbeDetails::Fingerprint(d) => {
            if d.uniqueness_percentile > FINGERPRINT_HIGHLY_UNIQUE {
                warnings.push(
                    "Your browser fingerprint is highly unique: you can be easily tracked"
                        .to_string(),
                );
            }
            if d.uniqueness_percentile > FINGERPRINT_IDENTIFIABLE {
                warnings.push("Your browser settings make you uniquely identifiable".to_string());
            }
        }
        ProbeDetails::Canvas(d) => {
            if d.uniqueness_score > CANVAS_TRACKABLE {
                warnings.push(
                    "Canvas fingerprint detected: your graphics hardware may be trackable"
                        .to_string(),
                );
            }
        }
        ProbeDetails::TransportLeak(d) => {
            if d.local_ip_leak {
                warnings.push(format!(
                    "WebRTC IP leak detected ({} local IP addresses)",
                    d.local_ips.len()
                ));
            }
            if !d.public_ips.is_empty() {
                warnings.push(
                    "Your real public IP address is exposed: your VPN may not be working"
                        .to_string(),
                );
            }
        }
        ProbeDetails::Storage(d) => {
            if d.cookies.enabled {
                warnings.push("Cookies are enabled: websites can track your activity".to_string());
            }
            if d.local_storage.existing_items > 0 {
                warnings.push(format!(
                    "{} localStorage items detected",
                    d.local_storage.existing_items
                ));
            }
            if !d.transport_security.secure {
                warnings.push("Unsecured HTTP connection: your data is not encrypted".to_string());
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectaguard_core::{
        CanvasDetails, ContentHash, FingerprintDetails, HashQuality, ProbeId, ProbeResult,
        ProbeStatus, TransportLeakDetails,
    };

    fn hash() -> ContentHash {
        ContentHash {
            value: "0123456789abcdef".to_string(),
            quality: HashQuality::Digest,
        }
    }

    fn fingerprint(uniqueness: u8, status: ProbeStatus) -> ProbeResult {
        ProbeResult::completed(
            status,
            100 - uniqueness,
            ProbeDetails::Fingerprint(FingerprintDetails {
                fingerprint_hash: hash(),
                uniqueness_percentile: uniqueness,
                entropy: 400,
            }),
            None,
        )
    }

    fn transport(local: &[&str], public: &[&str]) -> ProbeResult {
        ProbeResult::completed(
            ProbeStatus::Warning,
            0,
            ProbeDetails::TransportLeak(TransportLeakDetails {
                local_ip_leak: !local.is_empty(),
                local_ips: local.iter().map(ToString::to_string).collect(),
                public_ips: public.iter().map(ToString::to_string).collect(),
                leak_severity: 3,
                stun_response: !public.is_empty(),
                timed_out: false,
            }),
            None,
        )
    }

    #[test]
    fn test_highly_unique_fingerprint_emits_both() {
        let results: ProbeResults = [(ProbeId::Fingerprint, fingerprint(85, ProbeStatus::Warning))]
            .into_iter()
            .collect();
        let warnings = collect_warnings(&results);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("highly unique"));
        assert!(warnings[1].contains("uniquely identifiable"));
    }

    #[test]
    fn test_ok_status_is_silent() {
        // An ok result is skipped even when its details would match a rule.
        let results: ProbeResults = [(ProbeId::Fingerprint, fingerprint(85, ProbeStatus::Ok))]
            .into_iter()
            .collect();
        assert!(collect_warnings(&results).is_empty());
    }

    #[test]
    fn test_failed_without_details_is_silent() {
        let results: ProbeResults = [(ProbeId::Canvas, ProbeResult::failed(0, "no 2d context"))]
            .into_iter()
            .collect();
        assert!(collect_warnings(&results).is_empty());
    }

    #[test]
    fn test_transport_messages() {
        let results: ProbeResults = [(
            ProbeId::TransportLeak,
            transport(&["192.168.1.2", "10.0.0.3"], &["203.0.113.7"]),
        )]
        .into_iter()
        .collect();
        assert_eq!(
            collect_warnings(&results),
            vec![
                "WebRTC IP leak detected (2 local IP addresses)".to_string(),
                "Your real public IP address is exposed: your VPN may not be working".to_string(),
            ]
        );
    }

    #[test]
    fn test_follows_collection_order() {
        let canvas = ProbeResult::completed(
            ProbeStatus::Warning,
            20,
            ProbeDetails::Canvas(CanvasDetails {
                canvas_hash: hash(),
                uniqueness_score: 80,
                data_length: 12_000,
            }),
            None,
        );
        let results: ProbeResults = [
            (ProbeId::TransportLeak, transport(&["10.0.0.3"], &[])),
            (ProbeId::Canvas, canvas),
        ]
        .into_iter()
        .collect();

        let warnings = collect_warnings(&results);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("WebRTC"));
        assert!(warnings[1].starts_with("Canvas"));
    }
}
