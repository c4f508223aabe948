use crate::ip::{classify_address, extract_ipv4, is_wired_range, is_wireless_range, AddressClass};
use crate::platform::{CandidateEvent, SessionConfig, TransportSurface};
use crate::probe::Probe;
use async_trait::async_trait;
use spectaguard_core::{
    PlatformError, ProbeDetails, ProbeId, ProbeResult, ProbeStatus, RawEvidence,
    TransportEvidence, TransportLeakDetails,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Upper bound on candidate discovery.
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Rendezvous servers handed to every session.
pub const RENDEZVOUS_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

const DATA_CHANNEL_LABEL: &str = "test";

/// Score reported when the transport cannot be tested at all.
const NEUTRAL_SCORE: u8 = 50;

const MAX_SEVERITY: u8 = 3;

/// Lifecycle of one transport leak check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportState {
    /// Nothing opened yet
    Idle,
    /// Session open, waiting for candidates
    Negotiating,
    /// Handling one candidate
    Classifying,
    /// Discovery over, session being torn down
    Finalizing,
    /// Discovery signalled completion
    Resolved,
    /// The discovery timeout fired first
    TimedOut,
    /// The session could not be opened or negotiated
    Unsupported,
}

impl TransportState {
    /// Whether no further transition is possible.
    const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::TimedOut | Self::Unsupported)
    }
}

/// Accumulates classified addresses until finalisation.
///
/// `finalize` consumes the machine, so a check resolves exactly once and the
/// address sets cannot be touched afterwards.
#[derive(Debug)]
struct LeakStateMachine {
    state: TransportState,
    local_ips: Vec<String>,
    public_ips: Vec<String>,
}

impl LeakStateMachine {
    fn new() -> Self {
        Self {
            state: TransportState::Idle,
            local_ips: Vec::new(),
            public_ips: Vec::new(),
        }
    }

    fn transition(&mut self, next: TransportState) {
        debug_assert!(!self.state.is_terminal(), "transition out of {:?}", self.state);
        trace!(from = ?self.state, to = ?next, "transport state transition");
        self.state = next;
    }

    fn begin_negotiation(&mut self) {
        self.transition(TransportState::Negotiating);
    }

    fn classify(&mut self, candidate: &str) {
        self.transition(TransportState::Classifying);

        if let Some(addr) = extract_ipv4(candidate) {
            let set = match classify_address(addr) {
                AddressClass::Private => &mut self.local_ips,
                AddressClass::Public => &mut self.public_ips,
            };
            if !set.iter().any(|known| known == addr) {
                set.push(addr.to_string());
            }
        }

        self.transition(TransportState::Negotiating);
    }

    fn finalize(mut self, timed_out: bool) -> (TransportState, TransportLeakDetails) {
        self.transition(TransportState::Finalizing);

        let severity = assess_leak_severity(&self.local_ips, &self.public_ips);
        let details = TransportLeakDetails {
            local_ip_leak: !self.local_ips.is_empty(),
            stun_response: !self.public_ips.is_empty(),
            leak_severity: severity,
            local_ips: self.local_ips,
            public_ips: self.public_ips,
            timed_out,
        };

        let terminal = if timed_out {
            TransportState::TimedOut
        } else {
            TransportState::Resolved
        };
        trace!(from = ?TransportState::Finalizing, to = ?terminal, "transport state transition");
        (terminal, details)
    }
}

/// Detects local-network and public address exposure through candidate
/// discovery on a locally negotiated real-time-transport session.
///
/// No remote peer ever connects. Discovery ends on the completion signal or
/// after [`DISCOVERY_TIMEOUT`], whichever comes first; the session is then
/// cancelled and closed.
pub struct TransportLeakProbe {
    surface: Arc<dyn TransportSurface>,
}

impl TransportLeakProbe {
    /// Create a probe opening sessions on `surface`.
    #[must_use]
    pub fn new(surface: Arc<dyn TransportSurface>) -> Self {
        Self { surface }
    }

    fn unsupported(&self, error: &PlatformError) -> ProbeResult {
        warn!(probe = %self.id(), state = ?TransportState::Unsupported, error = %error, "transport negotiation unavailable");
        ProbeResult::failed(self.failure_score(), error.to_string())
    }
}

#[async_trait]
impl Probe for TransportLeakProbe {
    fn id(&self) -> ProbeId {
        ProbeId::TransportLeak
    }

    async fn run(&self) -> ProbeResult {
        let mut machine = LeakStateMachine::new();
        let config = SessionConfig {
            ice_servers: RENDEZVOUS_SERVERS.iter().map(ToString::to_string).collect(),
        };

        // Covers opening and negotiation as well as discovery itself.
        let deadline = tokio::time::sleep(DISCOVERY_TIMEOUT);
        tokio::pin!(deadline);

        let opened = tokio::select! {
            () = &mut deadline => None,
            opened = self.surface.open_session(&config) => Some(opened),
        };
        let mut session = match opened {
            Some(Ok(session)) => session,
            Some(Err(e)) => return self.unsupported(&e),
            None => {
                debug!(probe = %self.id(), "session did not open before the deadline");
                return leak_result(machine.finalize(true));
            }
        };
        machine.begin_negotiation();

        if let Err(e) = session.create_data_channel(DATA_CHANNEL_LABEL) {
            session.close();
            return self.unsupported(&e);
        }

        let cancel = CancellationToken::new();
        let negotiated = tokio::select! {
            () = &mut deadline => None,
            discovery = session.start_discovery(cancel.clone()) => Some(discovery),
        };

        let timed_out = match negotiated {
            Some(Ok(mut events)) => {
                let timed_out = loop {
                    tokio::select! {
                        () = &mut deadline => break true,
                        event = events.recv() => match event {
                            Some(CandidateEvent::Candidate(line)) => machine.classify(&line),
                            // A closed stream means the session will report nothing more.
                            Some(CandidateEvent::GatheringComplete) | None => break false,
                        },
                    }
                };
                cancel.cancel();
                drop(events);
                timed_out
            }
            Some(Err(e)) => {
                session.close();
                return self.unsupported(&e);
            }
            None => {
                debug!(probe = %self.id(), "offer did not settle before the deadline");
                cancel.cancel();
                true
            }
        };
        session.close();

        leak_result(machine.finalize(timed_out))
    }

    fn failure_score(&self) -> u8 {
        NEUTRAL_SCORE
    }
}

fn leak_result((state, details): (TransportState, TransportLeakDetails)) -> ProbeResult {
    debug!(
        state = ?state,
        local = details.local_ips.len(),
        public = details.public_ips.len(),
        severity = details.leak_severity,
        "transport discovery finished"
    );

    let (status, score) = if details.local_ip_leak {
        (
            ProbeStatus::Warning,
            75u8.saturating_sub(details.leak_severity * 25),
        )
    } else {
        (ProbeStatus::Ok, 100)
    };

    let evidence = TransportEvidence {
        local_ip_count: details.local_ips.len(),
        public_ip_count: details.public_ips.len(),
    };

    ProbeResult::completed(
        status,
        score,
        ProbeDetails::TransportLeak(details),
        Some(RawEvidence::TransportLeak(evidence)),
    )
}

/// Leak severity 0-3 from the discovered address sets.
#[must_use]
pub fn assess_leak_severity(local_ips: &[String], public_ips: &[String]) -> u8 {
    let mut severity = 0u8;

    if !local_ips.is_empty() {
        severity += 1;
    }
    if local_ips.len() > 2 {
        severity += 1;
    }
    if !public_ips.is_empty() {
        severity += 2;
    }

    let wireless = local_ips.iter().any(|ip| is_wireless_range(ip));
    let wired = local_ips.iter().any(|ip| is_wired_range(ip));
    if wireless && wired {
        severity += 1;
    }

    severity.min(MAX_SEVERITY)
}
