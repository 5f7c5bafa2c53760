//! Credential and health probe for the Gemini backend.
//!
//! Probe: `GET {endpoint}/v1beta/models/{model}` with the API key header.
//! A 2xx means the key is accepted and the model exists.
//!
//! - [`HealthService::verify`] is strict and used at startup: a rejected key
//!   or any other failure is an error, so the process can halt before serving.
//! - [`HealthService::check`] is resilient and never fails (errors mapped to
//!   `ok=false`); the returned [`HealthStatus`] is JSON-serializable for `/health`.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};
use crate::services::gemini_service::default_headers;

/// A serializable health snapshot for the configured model.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier probed.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Probe runner that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
}

impl HealthService {
    /// Creates a probe for `cfg` with a client timeout (seconds, default 10).
    ///
    /// # Errors
    /// - [`crate::error_handler::ProviderError`] if key/endpoint are unusable
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig, timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers(&cfg)?)
            .build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            model = %cfg.model,
            "HealthService initialized"
        );

        Ok(Self { client, cfg })
    }

    /// Strict probe: fails unless the key is accepted and the model is visible.
    ///
    /// # Errors
    /// - [`HealthError::CredentialRejected`] on 400/401/403
    /// - [`HealthError::HttpStatus`] on other non-2xx statuses
    /// - [`AiLlmError::HttpTransport`] when the endpoint is unreachable
    pub async fn verify(&self) -> Result<HealthStatus, AiLlmError> {
        let url = self.cfg.model_url();
        let start = Instant::now();

        debug!(model = %self.cfg.model, "GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let latency = start.elapsed().as_millis();
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let http = HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            };

            error!(
                %status,
                url = %http.url,
                snippet = %http.snippet,
                latency_ms = latency,
                "model probe returned non-success status"
            );

            let err = match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    HealthError::CredentialRejected(http)
                }
                _ => HealthError::HttpStatus(http),
            };
            return Err(err.into());
        }

        // Expected minimal JSON: { "name": "models/<model>", ... }
        #[derive(serde::Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let info = resp
            .json::<ModelInfo>()
            .await
            .map_err(|e| HealthError::Decode(format!("serde error: {e}; expected `name`")))?;

        Ok(HealthStatus::new(
            &self.cfg,
            true,
            latency,
            format!("Gemini is reachable; {} is available", info.name),
        ))
    }

    /// Resilient probe for `/health`; never returns an error.
    pub async fn check(&self) -> HealthStatus {
        let start = Instant::now();
        match self.verify().await {
            Ok(status) => {
                info!(
                    model = %status.model,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(&self.cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    model = %status.model,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: "gemini-test".into(),
            endpoint: endpoint.into(),
            api_key: "probe-key".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    #[tokio::test]
    async fn accepted_key_is_healthy() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v1beta/models/gemini-test")
            .match_header("x-goog-api-key", "probe-key")
            .with_status(200)
            .with_body(r#"{"name":"models/gemini-test","displayName":"Test"}"#)
            .create_async()
            .await;

        let svc = HealthService::new(cfg(&server.url()), Some(5)).unwrap();
        let status = svc.verify().await.unwrap();
        assert!(status.ok);
        assert!(status.message.contains("models/gemini-test"));
    }

    #[tokio::test]
    async fn rejected_key_fails_verify_but_not_check() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v1beta/models/gemini-test")
            .with_status(400)
            .with_body(r#"{"error":{"message":"API key not valid"}}"#)
            .expect_at_least(2)
            .create_async()
            .await;

        let svc = HealthService::new(cfg(&server.url()), Some(5)).unwrap();
        let err = svc.verify().await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Health(HealthError::CredentialRejected(_))
        ));

        let status = svc.check().await;
        assert!(!status.ok);
        assert!(status.message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn server_error_is_not_a_credential_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v1beta/models/gemini-test")
            .with_status(503)
            .create_async()
            .await;

        let svc = HealthService::new(cfg(&server.url()), Some(5)).unwrap();
        let err = svc.verify().await.unwrap_err();
        assert!(matches!(err, AiLlmError::Health(HealthError::HttpStatus(_))));
    }
}
