//! The privacy check session.
//!
//! `PrivacyCheck` ties the pipeline together: run the probe sequence,
//! assemble the report, then hand anonymous statistics to the telemetry sink
//! on a detached task so submission never delays the report.

use spectaguard_core::{Result, SpectaguardError, SuiteConfig, Timestamp};
use spectaguard_probes::{PlatformProviders, ProbeOrchestrator, ProbeProgress};
use spectaguard_scoring::{assemble, AggregateReport, ExportDocument};
use spectaguard_telemetry::{submit_detached, HttpTelemetrySink, TelemetryPayload, TelemetrySink};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// One configured privacy check over a set of platform providers.
pub struct PrivacyCheck {
    orchestrator: ProbeOrchestrator,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl PrivacyCheck {
    /// Create a check. Telemetry is wired up only when enabled in `config`.
    pub fn new(config: &SuiteConfig, platform: &PlatformProviders) -> Result<Self> {
        config.validate()?;

        let telemetry: Option<Arc<dyn TelemetrySink>> = if config.telemetry.enabled {
            let sink = HttpTelemetrySink::from_config(&config.telemetry)
                .map_err(|e| SpectaguardError::Internal(e.to_string()))?;
            debug!(endpoint = %sink.endpoint(), "telemetry enabled");
            Some(Arc::new(sink))
        } else {
            None
        };

        Ok(Self {
            orchestrator: ProbeOrchestrator::new(platform),
            telemetry,
        })
    }

    /// Create a check configured from the process environment.
    pub fn from_env(platform: &PlatformProviders) -> Result<Self> {
        let config = SuiteConfig::from_env()?;
        Self::new(&config, platform)
    }

    /// Replace the telemetry destination.
    #[must_use]
    pub fn with_telemetry_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Whether statistics will be submitted after each run.
    #[must_use]
    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry.is_some()
    }

    /// Run every probe and return the assembled report.
    pub async fn run(&self) -> AggregateReport {
        self.run_with_progress(|_| {}).await
    }

    /// Run every probe with progress notifications and return the report.
    pub async fn run_with_progress<F>(&self, on_progress: F) -> AggregateReport
    where
        F: FnMut(ProbeProgress) + Send,
    {
        let span = info_span!("privacy_check", run_id = %Uuid::new_v4());

        async move {
            info!(probes = self.orchestrator.probe_ids().len(), "privacy check started");

            let results = self.orchestrator.run_with_progress(on_progress).await;
            let report = assemble(&results);

            if let Some(sink) = &self.telemetry {
                drop(submit_detached(
                    Arc::clone(sink),
                    TelemetryPayload::from_report(&report),
                ));
            }

            info!(score = report.score, grade = %report.grade, "privacy check finished");
            report
        }
        .instrument(span)
        .await
    }

    /// Export document for `report`, stamped now.
    #[must_use]
    pub fn export(&self, report: &AggregateReport) -> ExportDocument {
        ExportDocument::from_report(report, Timestamp::now())
    }
}
