//! Gemini service for text generation.
//!
//! Minimal, non-streaming client around the Gemini REST API.
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1beta/models/{model}:generateContent, single completion
//!
//! Constructor validation:
//! - `cfg.api_key` must be non-empty and a valid header value
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    completion::CompletionService,
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, ProviderError, make_snippet},
};

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin client for the Gemini API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (default headers, optional timeout).
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`ProviderError::InvalidApiKey`] if the key is empty or not header-safe
    /// - [`ProviderError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let headers = default_headers(&cfg)?;

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_generate = cfg.generate_url();

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = ?cfg.timeout_secs,
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a **non-streaming** `generateContent` request.
    ///
    /// The prompt is sent as a single user turn; sampling options come from config.
    ///
    /// # Errors
    /// - [`ProviderError::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`ProviderError::Decode`] if the JSON cannot be parsed
    /// - [`ProviderError::Blocked`] if the prompt was blocked upstream
    /// - [`ProviderError::EmptyCandidates`] if no candidate text is returned
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateContentRequest::from_cfg(&self.cfg, prompt);

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            "POST {}", self.url_generate
        );

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "generateContent returned non-success status"
            );

            return Err(ProviderError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        let out: GenerateContentResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode generateContent response"
                );
                return Err(ProviderError::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts[].text`"
                ))
                .into());
            }
        };

        let text = out.into_text()?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            reply_len = text.len(),
            "completion finished"
        );

        Ok(text)
    }
}

#[async_trait]
impl CompletionService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        GeminiService::generate(self, prompt).await
    }
}

/// Default headers shared by the completion client and the credential probe.
pub(crate) fn default_headers(cfg: &LlmModelConfig) -> Result<header::HeaderMap, AiLlmError> {
    let key = cfg.api_key.trim();
    if key.is_empty() {
        return Err(ProviderError::InvalidApiKey("key is empty".into()).into());
    }

    let endpoint = cfg.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ProviderError::InvalidEndpoint(cfg.endpoint.clone()).into());
    }

    let mut key_value = header::HeaderValue::from_str(key)
        .map_err(|e| ProviderError::InvalidApiKey(format!("not a valid header value: {e}")))?;
    key_value.set_sensitive(true);

    let mut headers = header::HeaderMap::new();
    headers.insert(API_KEY_HEADER, key_value);
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str) -> Self {
        let generation_config =
            if cfg.temperature.is_none() && cfg.top_p.is_none() && cfg.max_tokens.is_none() {
                None
            } else {
                Some(GenerationConfig {
                    temperature: cfg.temperature,
                    top_p: cfg.top_p,
                    max_output_tokens: cfg.max_tokens,
                })
            };

        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Minimal response for `generateContent`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate. Later candidates are ignored.
    fn into_text(self) -> Result<String, ProviderError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .filter(|joined| !joined.is_empty());

        match (text, self.prompt_feedback.and_then(|f| f.block_reason)) {
            (Some(text), _) => Ok(text),
            (None, Some(reason)) => Err(ProviderError::Blocked(reason)),
            (None, None) => Err(ProviderError::EmptyCandidates),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    const PATH: &str = "/v1beta/models/gemini-test:generateContent";

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: "gemini-test".into(),
            endpoint: endpoint.into(),
            api_key: "test-key".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn rejects_bad_key_and_endpoint() {
        let mut c = cfg("http://localhost");
        c.api_key = "  ".into();
        assert!(matches!(
            GeminiService::new(c),
            Err(AiLlmError::Provider(ProviderError::InvalidApiKey(_)))
        ));

        let c = cfg("localhost:1234");
        assert!(matches!(
            GeminiService::new(c),
            Err(AiLlmError::Provider(ProviderError::InvalidEndpoint(_)))
        ));
    }

    #[test]
    fn request_body_uses_camel_case_generation_config() {
        let mut c = cfg("http://localhost");
        c.max_tokens = Some(256);
        c.temperature = Some(0.5);
        let body = serde_json::to_value(GenerateContentRequest::from_cfg(&c, "hi")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert!(body["generationConfig"].get("topP").is_none());

        let plain = serde_json::to_value(GenerateContentRequest::from_cfg(&cfg("http://x"), "hi"))
            .unwrap();
        assert!(plain.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn returns_joined_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "plan please" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [{ "text": "Day 1: " }, { "text": "squats" }] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let svc = GeminiService::new(cfg(&server.url())).unwrap();
        let out = svc.generate("plan please").await.unwrap();

        assert_eq!(out, "Day 1: squats");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body(r#"{"error":{"message":"quota exceeded"}}"#)
            .create_async()
            .await;

        let svc = GeminiService::new(cfg(&server.url())).unwrap();
        let err = svc.generate("x").await.unwrap_err();

        match err {
            AiLlmError::Provider(ProviderError::HttpStatus(http)) => {
                assert_eq!(http.status.as_u16(), 429);
                assert!(http.snippet.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_and_empty_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .expect(1)
            .create_async()
            .await;

        let svc = GeminiService::new(cfg(&server.url())).unwrap();
        let err = svc.generate("x").await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError::Blocked(ref r)) if r == "SAFETY"
        ));

        let empty = GenerateContentResponse::default().into_text();
        assert!(matches!(empty, Err(ProviderError::EmptyCandidates)));
    }

    #[test]
    fn only_the_first_candidate_counts() {
        let out: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first " }, { "text": "answer" }] } },
                { "content": { "parts": [{ "text": "second answer" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(out.into_text().unwrap(), "first answer");

        let out: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "finishReason": "SAFETY" },
                { "content": { "parts": [{ "text": "second answer" }] } }
            ]
        }))
        .unwrap();
        assert!(matches!(out.into_text(), Err(ProviderError::EmptyCandidates)));
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let svc = GeminiService::new(cfg(&server.url())).unwrap();
        let err = svc.generate("x").await.unwrap_err();
        assert!(matches!(err, AiLlmError::Provider(ProviderError::Decode(_))));
    }
}
