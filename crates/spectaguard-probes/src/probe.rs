use async_trait::async_trait;
use spectaguard_core::{ProbeId, ProbeResult};

/// A self-contained check of one platform capability.
///
/// Implementations must not fail outward: every platform error is recovered
/// into a `failed` [`ProbeResult`] carrying [`Probe::failure_score`].
#[async_trait]
pub trait Probe: Send + Sync {
    /// Which probe this is.
    fn id(&self) -> ProbeId;

    /// Inspect the capability and score it.
    async fn run(&self) -> ProbeResult;

    /// Score reported when the probe could not run.
    ///
    /// Zero for most probes; a neutral value where being unable to test is
    /// evidence of neither leak nor safety.
    fn failure_score(&self) -> u8 {
        0
    }
}
