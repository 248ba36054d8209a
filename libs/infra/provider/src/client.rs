// [libs/infra/provider/src/client.rs]
/*!
 * =================================================================
 * APARATO: GENERATIVE PROVIDER UPLINK (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CREAR PREDICCIÓN Y SONDEAR HASTA UN ESTADO TERMINAL
 *
 * VISION HOLÍSTICA:
 * Contrato narrow de spec §1: "create prediction / poll for result".
 * El proveedor concreto es un colaborador externo no respecificado aquí;
 * este cliente solo conoce el sobre JSON mínimo (id, status, output,
 * error) que cualquier backend de predicción expone.
 * =================================================================
 */

use crate::errors::ProviderError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionState {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionState {
    fn from_provider_key(key: &str) -> Self {
        match key {
            "succeeded" => PredictionState::Succeeded,
            "failed" => PredictionState::Failed,
            "canceled" | "cancelled" => PredictionState::Canceled,
            "processing" => PredictionState::Processing,
            _ => PredictionState::Starting,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionState::Succeeded | PredictionState::Failed | PredictionState::Canceled)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionEnvelope {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PredictionHandle {
    pub prediction_id: String,
    pub state: PredictionState,
}

/// Resultado de sondear hasta un estado terminal (spec §4.7 paso 6).
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub prediction_id: String,
    pub output_url: String,
}

#[derive(Serialize)]
struct CreatePredictionPayload<'a> {
    model: &'a str,
    input: &'a Value,
}

pub struct ProviderClient {
    http_client: Client,
    base_url: String,
}

impl ProviderClient {
    pub fn new(base_url: String, api_token: String) -> Self {
        let mut header_map = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_token}"))
            .expect("FATAL: invalid provider API token format.");
        header_map.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            http_client: Client::builder()
                .default_headers(header_map)
                .user_agent("RealStageAI-ProviderUplink/1.0")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("FATAL: provider client initialization failed."),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_prediction(&self, model_id: &str, input: &Value) -> Result<PredictionHandle, ProviderError> {
        let url = format!("{}/v1/predictions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&CreatePredictionPayload { model: model_id, input })
            .send()
            .await?;

        if response.status() != StatusCode::OK && response.status() != StatusCode::CREATED {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(status, body));
        }

        let envelope: PredictionEnvelope = response.json().await?;
        info!("🎨 [PREDICTION_CREATED]: {} on model {}.", envelope.id, model_id);
        Ok(PredictionHandle { prediction_id: envelope.id, state: PredictionState::from_provider_key(&envelope.status) })
    }

    #[instrument(skip(self))]
    async fn get_prediction(&self, prediction_id: &str) -> Result<PredictionEnvelope, ProviderError> {
        let url = format!("{}/v1/predictions/{prediction_id}", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(status, body));
        }
        Ok(response.json().await?)
    }

    /**
     * Sondea una predicción a intervalo fijo hasta un estado terminal del
     * proveedor o hasta que `total_timeout` transcurra (spec §4.7 paso 6:
     * "a total timeout of 5 minutes", impuesto aquí regardless de lo que
     * el proveedor reporte).
     */
    #[instrument(skip(self))]
    pub async fn poll_to_completion(
        &self,
        prediction_id: &str,
        poll_interval: Duration,
        total_timeout: Duration,
    ) -> Result<PredictionOutcome, ProviderError> {
        let deadline = tokio::time::Instant::now() + total_timeout;

        loop {
            let envelope = self.get_prediction(prediction_id).await?;
            let state = PredictionState::from_provider_key(&envelope.status);

            match state {
                PredictionState::Succeeded => {
                    let output_url = extract_output_url(&envelope.output)
                        .ok_or_else(|| ProviderError::PredictionFailed("succeeded prediction carried no output url".to_string()))?;
                    return Ok(PredictionOutcome { prediction_id: envelope.id, output_url });
                }
                PredictionState::Failed => {
                    return Err(ProviderError::PredictionFailed(envelope.error.unwrap_or_else(|| "unknown provider error".to_string())));
                }
                PredictionState::Canceled => return Err(ProviderError::PredictionCanceled),
                PredictionState::Starting | PredictionState::Processing => {}
            }

            if tokio::time::Instant::now() >= deadline {
                warn!("⏱️ [PREDICTION_TIMEOUT]: {} exceeded {:?}.", prediction_id, total_timeout);
                return Err(ProviderError::Timeout);
            }

            tokio::time::sleep(poll_interval.min(deadline.saturating_duration_since(tokio::time::Instant::now()))).await;
        }
    }
}

fn extract_output_url(output: &Option<Value>) -> Option<String> {
    match output {
        Some(Value::String(url)) => Some(url.clone()),
        Some(Value::Array(items)) => items.first().and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_state_maps_provider_keys() {
        assert_eq!(PredictionState::from_provider_key("succeeded"), PredictionState::Succeeded);
        assert_eq!(PredictionState::from_provider_key("failed"), PredictionState::Failed);
        assert_eq!(PredictionState::from_provider_key("canceled"), PredictionState::Canceled);
        assert_eq!(PredictionState::from_provider_key("processing"), PredictionState::Processing);
        assert_eq!(PredictionState::from_provider_key("starting"), PredictionState::Starting);
    }

    #[test]
    fn only_terminal_states_report_terminal() {
        assert!(PredictionState::Succeeded.is_terminal());
        assert!(PredictionState::Failed.is_terminal());
        assert!(PredictionState::Canceled.is_terminal());
        assert!(!PredictionState::Processing.is_terminal());
        assert!(!PredictionState::Starting.is_terminal());
    }

    #[test]
    fn extract_output_url_handles_string_and_array_shapes() {
        assert_eq!(extract_output_url(&Some(Value::String("https://x/y.png".into()))), Some("https://x/y.png".to_string()));
        assert_eq!(
            extract_output_url(&Some(serde_json::json!(["https://x/a.png", "https://x/b.png"]))),
            Some("https://x/a.png".to_string())
        );
        assert_eq!(extract_output_url(&None), None);
    }
}
