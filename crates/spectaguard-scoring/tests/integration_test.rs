//! Integration tests for report assembly
//!
//! Runs the probe suite against fixture providers and checks the assembled
//! report and its export.

use spectaguard_core::{PlatformError, ProbeId, ProbeStatus, Timestamp};
use spectaguard_probes::platform::fixture::{
    self, FixedCanvas, FixedIdentity, FixedStorage, ScriptStep, ScriptedTransport,
};
use spectaguard_probes::{PlatformProviders, ProbeOrchestrator};
use spectaguard_scoring::{assemble, ExportDocument, Grade, Priority};
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn test_typical_desktop_report() {
    let results = ProbeOrchestrator::new(&fixture::typical_desktop()).run().await;
    let report = assemble(&results);

    // fingerprint 55, canvas 50-70, transport 0, storage 19
    assert!((31..=35).contains(&report.score), "score {}", report.score);
    assert_eq!(report.grade, Grade::F);

    assert_eq!(
        report.warnings,
        vec![
            "WebRTC IP leak detected (1 local IP addresses)".to_string(),
            "Your real public IP address is exposed: your VPN may not be working".to_string(),
            "Cookies are enabled: websites can track your activity".to_string(),
            "3 localStorage items detected".to_string(),
        ]
    );

    let titles: Vec<&str> = report
        .recommendations
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Stop WebRTC IP Leak",
            "Use a VPN",
            "Tighten Cookie Settings",
            "Install Privacy Extensions",
            "Regular Privacy Checkups",
        ]
    );

    let names: Vec<&str> = report.breakdown.iter().map(|b| b.test_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Browser Fingerprint",
            "Canvas Fingerprint",
            "WebRTC Leak",
            "Headers & Storage"
        ]
    );
    assert_eq!(report.results.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_clean_transport_and_storage() {
    let platform = PlatformProviders {
        identity: Arc::new(FixedIdentity::typical_desktop()),
        canvas: Arc::new(FixedCanvas::png(1_000)),
        transport: Arc::new(ScriptedTransport::new(vec![ScriptStep::Complete])),
        storage: Arc::new(FixedStorage::hardened()),
    };

    let report = assemble(&ProbeOrchestrator::new(&platform).run().await);

    // fingerprint 55, canvas 60-80, transport 100, storage 100
    assert!((79..=83).contains(&report.score), "score {}", report.score);
    assert!(report.warnings.is_empty());
    assert_eq!(
        report.recommendations.last().map(|r| r.priority),
        Some(Priority::Low)
    );
}

#[tokio::test]
async fn test_unsupported_transport_contributes_neutral_score() {
    let platform = PlatformProviders {
        identity: Arc::new(FixedIdentity::failing(PlatformError::Blocked("navigator".into()))),
        canvas: Arc::new(FixedCanvas::failing(PlatformError::Unavailable("2d".into()))),
        transport: Arc::new(ScriptedTransport::unsupported(PlatformError::Unavailable(
            "RTCPeerConnection".into(),
        ))),
        storage: Arc::new(FixedStorage::hardened()),
    };

    let report = assemble(&ProbeOrchestrator::new(&platform).run().await);

    // (0*30 + 0*20 + 50*25 + 100*25) / 100 = 37.5
    assert_eq!(report.score, 38);
    assert_eq!(report.grade, Grade::F);
    let transport = report.results.get(ProbeId::TransportLeak).unwrap();
    assert_eq!(transport.status, ProbeStatus::Failed);
    assert!(report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reassembly_and_export_round_trip() {
    let results = ProbeOrchestrator::new(&fixture::typical_desktop()).run().await;
    let first = assemble(&results);
    let second = assemble(&results);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );

    let dir = tempfile::tempdir().unwrap();
    let export = ExportDocument::from_report(&first, Timestamp::now());
    let path = dir.path().join(export.suggested_file_name());
    export.write_to(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["score"], u64::from(first.score));
    assert_eq!(json["warnings"].as_array().map(Vec::len), Some(4));
    assert!(json.get("results").is_none());
}
