//! Integration tests for the probe suite
//!
//! Runs the full sequence against fixture providers and checks the collected
//! results end to end.

use spectaguard_core::{PlatformError, ProbeDetails, ProbeId, ProbeStatus};
use spectaguard_probes::platform::fixture::{
    self, FixedCanvas, FixedIdentity, FixedStorage, ScriptStep, ScriptedTransport,
};
use spectaguard_probes::{PlatformProviders, ProbeOrchestrator};
use std::sync::Arc;
use std::time::Duration;

fn locked_down(transport: ScriptedTransport) -> PlatformProviders {
    PlatformProviders {
        identity: Arc::new(FixedIdentity::typical_desktop()),
        canvas: Arc::new(FixedCanvas::png(1_000)),
        transport: Arc::new(transport),
        storage: Arc::new(FixedStorage::hardened()),
    }
}

#[tokio::test(start_paused = true)]
async fn test_typical_desktop_suite() {
    let results = ProbeOrchestrator::new(&fixture::typical_desktop()).run().await;
    assert_eq!(results.len(), 4);

    for (probe, result) in results.iter() {
        assert!(result.score <= 100, "{probe} out of range");
    }

    let fingerprint = results.get(ProbeId::Fingerprint).unwrap();
    assert_eq!(fingerprint.status, ProbeStatus::Ok);
    assert_eq!(fingerprint.score, 55);

    let canvas = results.get(ProbeId::Canvas).unwrap();
    assert_eq!(canvas.status, ProbeStatus::Ok);
    assert!((50..=70).contains(&canvas.score));

    let transport = results.get(ProbeId::TransportLeak).unwrap();
    assert_eq!(transport.status, ProbeStatus::Warning);
    assert_eq!(transport.score, 0);
    let Some(ProbeDetails::TransportLeak(leak)) = &transport.details else {
        panic!("expected transport details");
    };
    assert_eq!(leak.local_ips, vec!["192.168.1.23"]);
    assert_eq!(leak.public_ips, vec!["203.0.113.7"]);
    assert!(!leak.timed_out);

    let storage = results.get(ProbeId::Storage).unwrap();
    assert_eq!(storage.status, ProbeStatus::Warning);
    assert_eq!(storage.score, 19);
}

#[tokio::test]
async fn test_missing_transport_api_is_neutral() {
    let transport =
        ScriptedTransport::unsupported(PlatformError::Unavailable("RTCPeerConnection".into()));
    let results = ProbeOrchestrator::new(&locked_down(transport)).run().await;

    assert_eq!(results.len(), 4);
    let transport = results.get(ProbeId::TransportLeak).unwrap();
    assert_eq!(transport.status, ProbeStatus::Failed);
    assert_eq!(transport.score, 50);

    let storage = results.get(ProbeId::Storage).unwrap();
    assert_eq!(storage.status, ProbeStatus::Ok);
    assert_eq!(storage.score, 100);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_discovery_bounded_by_timeout() {
    let transport = Arc::new(ScriptedTransport::new(vec![ScriptStep::Hang]));
    let platform = PlatformProviders {
        transport: transport.clone(),
        ..locked_down(ScriptedTransport::default())
    };

    let started = tokio::time::Instant::now();
    let results = ProbeOrchestrator::new(&platform).run().await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11));
    assert_eq!(transport.closed_sessions(), 1);

    let leak = results.get(ProbeId::TransportLeak).unwrap();
    assert_eq!(leak.status, ProbeStatus::Ok);
    assert_eq!(leak.score, 100);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_offer_bounded_by_timeout() {
    let transport = Arc::new(ScriptedTransport::offer_stalled());
    let platform = PlatformProviders {
        transport: transport.clone(),
        ..locked_down(ScriptedTransport::default())
    };

    let started = tokio::time::Instant::now();
    let results = tokio::time::timeout(
        Duration::from_secs(60),
        ProbeOrchestrator::new(&platform).run(),
    )
    .await
    .expect("suite finishes despite a stalled offer");
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11));
    assert_eq!(results.len(), 4);
    assert_eq!(transport.closed_sessions(), 1);

    let leak = results.get(ProbeId::TransportLeak).unwrap();
    assert_eq!(leak.status, ProbeStatus::Ok);
    let Some(ProbeDetails::TransportLeak(details)) = &leak.details else {
        panic!("expected transport details");
    };
    assert!(details.timed_out);
}

#[tokio::test]
async fn test_failing_surfaces_still_yield_every_entry() {
    let platform = PlatformProviders {
        identity: Arc::new(FixedIdentity::failing(PlatformError::Blocked("navigator".into()))),
        canvas: Arc::new(FixedCanvas::failing(PlatformError::Unavailable("2d".into()))),
        transport: Arc::new(ScriptedTransport::offer_rejected(PlatformError::Failed(
            "createOffer".into(),
        ))),
        storage: Arc::new({
            let mut storage = FixedStorage::typical_desktop();
            storage.header_failure = Some(PlatformError::Failed("location".into()));
            storage
        }),
    };

    let results = ProbeOrchestrator::new(&platform).run().await;

    assert_eq!(results.len(), 4);
    for (probe, result) in results.iter() {
        assert_eq!(result.status, ProbeStatus::Failed, "{probe}");
        assert!(result.error.is_some());
        let expected = if probe == ProbeId::TransportLeak { 50 } else { 0 };
        assert_eq!(result.score, expected, "{probe}");
    }
}
