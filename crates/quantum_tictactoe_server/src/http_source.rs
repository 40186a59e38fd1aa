//! Measurement source backed by the HTTP measurement backend.

use crate::backend::ALIVE_MESSAGE;
use async_trait::async_trait;
use quantum_tictactoe::{MeasurementError, MeasurementSource};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

#[derive(Debug, Deserialize)]
struct RemoteOutcome {
    collapse_result: i64,
}

/// Calls `POST {base_url}/quantum-move` for every collapse.
#[derive(Debug, Clone)]
pub struct HttpMeasurementSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMeasurementSource {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError`] if the HTTP client cannot be built.
    #[instrument(skip(base_url), fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, MeasurementError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeasurementError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MeasurementSource for HttpMeasurementSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn measure(&self, seed: u64) -> Result<u8, MeasurementError> {
        debug!("Requesting measurement");
        let response = self
            .client
            .post(format!("{}/quantum-move", self.base_url))
            .json(&serde_json::json!({ "seed": seed }))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Measurement request failed");
                MeasurementError::new(format!("Measurement request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Measurement backend error");
            return Err(MeasurementError::new(format!(
                "Measurement backend returned {}",
                status
            )));
        }

        let outcome: RemoteOutcome = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse measurement response");
            MeasurementError::new(format!("Failed to parse measurement response: {}", e))
        })?;
        debug!(collapse_result = outcome.collapse_result, "Measurement received");

        u8::try_from(outcome.collapse_result).map_err(|_| {
            MeasurementError::new(format!(
                "Measurement out of range: {}",
                outcome.collapse_result
            ))
        })
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn is_available(&self) -> bool {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                if body != ALIVE_MESSAGE {
                    debug!(%body, "Unexpected liveness body");
                }
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Measurement backend not healthy");
                false
            }
            Err(e) => {
                warn!(error = %e, "Measurement backend unreachable");
                false
            }
        }
    }
}

/// In-process measurement source running the same simulation as the
/// backend, without HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedMeasurement;

#[async_trait]
impl MeasurementSource for SimulatedMeasurement {
    fn name(&self) -> &str {
        "simulator"
    }

    async fn measure(&self, seed: u64) -> Result<u8, MeasurementError> {
        Ok(crate::qubit::measure_superposition(seed))
    }
}
