//! Gemini config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY`    = API key (mandatory)
//! - `GEMINI_MODEL`      = model id (default `gemini-2.5-flash`)
//! - `GEMINI_ENDPOINT`   = API base (default `https://generativelanguage.googleapis.com`)
//! - `LLM_MAX_TOKENS`    = optional max output tokens (u32)
//! - `LLM_TEMPERATURE`   = optional temperature (0.0..=2.0)
//! - `LLM_TOP_P`         = optional nucleus sampling (0.0..=1.0)
//! - `LLM_TIMEOUT_SECS`  = optional request timeout (u64)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        AiLlmError, ConfigError, must_var, opt_f32, opt_u32, opt_u64, opt_var,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Reads the Gemini config from the process environment.
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `GEMINI_API_KEY` is absent
/// - [`ConfigError::InvalidFormat`] / [`ConfigError::OutOfRange`] /
///   [`ConfigError::InvalidNumber`] for malformed optional knobs
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    config_gemini_from(&|name: &str| std::env::var(name).ok())
}

/// Same as [`config_gemini`] but reads values through `lookup`.
pub fn config_gemini_from<F>(lookup: &F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = must_var(lookup, "GEMINI_API_KEY")?;

    let model = opt_var(lookup, "GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    if model.contains('/') || model.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidFormat {
            var: "GEMINI_MODEL",
            reason: "model id must not contain '/' or whitespace",
        }
        .into());
    }

    let endpoint =
        opt_var(lookup, "GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    validate_http_endpoint("GEMINI_ENDPOINT", &endpoint)?;

    let max_tokens = opt_u32(lookup, "LLM_MAX_TOKENS")?;

    let temperature = opt_f32(lookup, "LLM_TEMPERATURE")?;
    if let Some(t) = temperature {
        validate_range_f32("LLM_TEMPERATURE", t, 0.0, 2.0, "expected 0.0..=2.0")?;
    }

    let top_p = opt_f32(lookup, "LLM_TOP_P")?;
    if let Some(p) = top_p {
        validate_range_f32("LLM_TOP_P", p, 0.0, 1.0, "expected 0.0..=1.0")?;
    }

    let timeout_secs = opt_u64(lookup, "LLM_TIMEOUT_SECS")?;

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature,
        top_p,
        timeout_secs,
    })
}
