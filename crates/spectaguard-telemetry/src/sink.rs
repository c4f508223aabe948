use crate::error::{Result, TelemetryError};
use crate::payload::TelemetryPayload;
use async_trait::async_trait;
use reqwest::Client;
use spectaguard_core::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

/// Destination for anonymous run statistics.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Deliver one payload.
    async fn submit(&self, payload: &TelemetryPayload) -> Result<()>;
}

/// Posts payloads as JSON to a collection endpoint.
#[derive(Debug, Clone)]
pub struct HttpTelemetrySink {
    client: Client,
    endpoint: Url,
}

impl HttpTelemetrySink {
    /// Create a sink posting to `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Build a sink from configuration.
    ///
    /// Returns [`TelemetryError::Disabled`] when telemetry is off or has no
    /// endpoint.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        let endpoint = match (&config.endpoint, config.enabled) {
            (Some(endpoint), true) => endpoint,
            _ => return Err(TelemetryError::Disabled),
        };
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TelemetryError::Client(format!("invalid endpoint: {e}")))?;

        Self::new(endpoint, Duration::from_secs(config.timeout_secs))
    }

    /// The collection endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetrySink {
    async fn submit(&self, payload: &TelemetryPayload) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TelemetryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "telemetry submitted");
        Ok(())
    }
}

/// Submit `payload` on a background task.
///
/// Returns immediately; failures are logged and otherwise dropped.
pub fn submit_detached(sink: Arc<dyn TelemetrySink>, payload: TelemetryPayload) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = sink.submit(&payload).await {
            warn!(error = %e, "telemetry submission failed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectaguard_scoring::Grade;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct RecordingSink {
        received: Mutex<Vec<TelemetryPayload>>,
        fail: bool,
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn submit(&self, payload: &TelemetryPayload) -> Result<()> {
            self.received.lock().unwrap().push(payload.clone());
            if self.fail {
                Err(TelemetryError::Status {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn payload() -> TelemetryPayload {
        TelemetryPayload {
            score: 72,
            grade: Grade::C,
            results: BTreeMap::new(),
        }
    }

    #[test]
    fn test_disabled_config_builds_no_sink() {
        let config = TelemetryConfig::default();
        assert!(matches!(
            HttpTelemetrySink::from_config(&config),
            Err(TelemetryError::Disabled)
        ));

        let config = TelemetryConfig {
            enabled: false,
            endpoint: Some("https://stats.example.com/collect".to_string()),
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpTelemetrySink::from_config(&config),
            Err(TelemetryError::Disabled)
        ));
    }

    #[test]
    fn test_enabled_config_builds_sink() {
        let config = TelemetryConfig {
            enabled: true,
            endpoint: Some("https://stats.example.com/collect".to_string()),
            timeout_secs: 5,
        };
        let sink = HttpTelemetrySink::from_config(&config).unwrap();
        assert_eq!(sink.endpoint().host_str(), Some("stats.example.com"));
    }

    #[test]
    fn test_invalid_endpoint_is_client_error() {
        let config = TelemetryConfig {
            enabled: true,
            endpoint: Some("not a url".to_string()),
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpTelemetrySink::from_config(&config),
            Err(TelemetryError::Client(_))
        ));
    }

    #[tokio::test]
    async fn test_detached_failure_is_swallowed() {
        let sink = Arc::new(RecordingSink {
            received: Mutex::new(Vec::new()),
            fail: true,
        });

        let handle = submit_detached(sink.clone(), payload());
        handle.await.expect("task completes without panicking");

        assert_eq!(sink.received.lock().unwrap().len(), 1);
    }
}
