//! Sequential probe orchestrator.
//!
//! The `ProbeOrchestrator` runs the fixed probe sequence one probe at a time,
//! awaiting each to completion before starting the next, and collects every
//! result in completion order. A probe that panics is recorded as `failed`
//! with its own fallback score so the collection always has one entry per
//! invoked probe.

use crate::canvas::CanvasProbe;
use crate::fingerprint::FingerprintProbe;
use crate::platform::PlatformProviders;
use crate::probe::Probe;
use crate::storage::StorageProbe;
use crate::transport::TransportLeakProbe;
use futures::FutureExt;
use spectaguard_core::{ProbeId, ProbeResult, ProbeResults, ProbeStatus};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

/// Where a probe is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    /// The probe is about to run
    Started,
    /// The probe settled with this status
    Finished(ProbeStatus),
}

/// Progress notification emitted around each probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeProgress {
    /// Zero-based position in the sequence
    pub index: usize,
    /// Number of probes in the sequence
    pub total: usize,
    /// Which probe
    pub probe: ProbeId,
    /// Started or finished
    pub phase: ProbePhase,
}

/// Runs the probe sequence.
pub struct ProbeOrchestrator {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeOrchestrator {
    /// Build the standard sequence: fingerprint, canvas, transport leak, storage.
    #[must_use]
    pub fn new(platform: &PlatformProviders) -> Self {
        Self {
            probes: vec![
                Box::new(FingerprintProbe::new(platform.identity.clone())),
                Box::new(CanvasProbe::new(platform.canvas.clone())),
                Box::new(TransportLeakProbe::new(platform.transport.clone())),
                Box::new(StorageProbe::new(platform.storage.clone())),
            ],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_probes(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Probe identities in run order.
    #[must_use]
    pub fn probe_ids(&self) -> Vec<ProbeId> {
        self.probes.iter().map(|p| p.id()).collect()
    }

    /// Run every probe and collect the results.
    pub async fn run(&self) -> ProbeResults {
        self.run_with_progress(|_| {}).await
    }

    /// Run every probe, reporting progress before and after each.
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> ProbeResults
    where
        F: FnMut(ProbeProgress) + Send,
    {
        let total = self.probes.len();
        let mut results = ProbeResults::new();

        for (index, probe) in self.probes.iter().enumerate() {
            let id = probe.id();
            on_progress(ProbeProgress {
                index,
                total,
                probe: id,
                phase: ProbePhase::Started,
            });
            info!(probe = %id, index, total, activity = id.description(), "probe started");

            let result = run_guarded(probe.as_ref()).await;

            info!(probe = %id, score = result.score, status = ?result.status, "probe finished");
            on_progress(ProbeProgress {
                index,
                total,
                probe: id,
                phase: ProbePhase::Finished(result.status),
            });
            results.insert(id, result);
        }

        results
    }
}

/// Run one probe, converting a panic into its failure result.
async fn run_guarded(probe: &dyn Probe) -> ProbeResult {
    match AssertUnwindSafe(probe.run()).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(probe = %probe.id(), error = %message, "probe panicked");
            ProbeResult::failed(probe.failure_score(), message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "probe panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fixture;
    use async_trait::async_trait;

    struct PanickingProbe {
        id: ProbeId,
        fallback: u8,
    }

    #[async_trait]
    impl Probe for PanickingProbe {
        fn id(&self) -> ProbeId {
            self.id
        }

        async fn run(&self) -> ProbeResult {
            panic!("surface exploded");
        }

        fn failure_score(&self) -> u8 {
            self.fallback
        }
    }

    #[test]
    fn test_standard_order() {
        let orchestrator = ProbeOrchestrator::new(&fixture::typical_desktop());
        assert_eq!(orchestrator.probe_ids(), ProbeId::ALL.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_every_probe() {
        let results = ProbeOrchestrator::new(&fixture::typical_desktop()).run().await;

        assert_eq!(results.len(), 4);
        let order: Vec<ProbeId> = results.iter().map(|(id, _)| id).collect();
        assert_eq!(order, ProbeId::ALL.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_brackets_each_probe() {
        let mut events = Vec::new();
        let results = ProbeOrchestrator::new(&fixture::typical_desktop())
            .run_with_progress(|progress| events.push(progress))
            .await;

        assert_eq!(events.len(), 8);
        for (i, pair) in events.chunks(2).enumerate() {
            assert_eq!(pair[0].index, i);
            assert_eq!(pair[0].total, 4);
            assert_eq!(pair[0].phase, ProbePhase::Started);
            let status = results.get(pair[1].probe).map(|r| r.status);
            assert_eq!(Some(pair[1].phase), status.map(ProbePhase::Finished));
        }
    }

    #[tokio::test]
    async fn test_panicking_probe_is_recovered() {
        let orchestrator = ProbeOrchestrator::from_probes(vec![
            Box::new(PanickingProbe {
                id: ProbeId::Canvas,
                fallback: 0,
            }),
            Box::new(PanickingProbe {
                id: ProbeId::TransportLeak,
                fallback: 50,
            }),
        ]);

        let results = orchestrator.run().await;

        assert_eq!(results.len(), 2);
        let canvas = results.get(ProbeId::Canvas).expect("canvas entry");
        assert_eq!(canvas.status, ProbeStatus::Failed);
        assert_eq!(canvas.score, 0);
        assert_eq!(canvas.error.as_deref(), Some("surface exploded"));

        let transport = results.get(ProbeId::TransportLeak).expect("transport entry");
        assert_eq!(transport.score, 50);
    }

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(other.as_ref()), "probe panicked");
    }
}
