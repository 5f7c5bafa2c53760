//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`], [`HealthError`]). Small helpers for reading/validating
//! configuration values are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup only).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors reported while talking to the completion provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Credential/health probe errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (connect, TLS, timeout, body read).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (limits, timeouts, sampling knobs).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL or boolean).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `GEMINI_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `LLM_TEMPERATURE`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Upstream HTTP failure details shared by provider and health errors.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL (never carries the credential).
    pub url: String,
    /// Short, trimmed snippet of the response body.
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Errors produced by the completion provider client.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API key was empty or cannot be sent as a header value.
    #[error("[AI LLM Service] invalid API key: {0}")]
    InvalidApiKey(String),

    /// Endpoint is empty or does not start with http/https.
    #[error("[AI LLM Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),

    /// The prompt was rejected by upstream safety filters.
    #[error("[AI LLM Service] prompt blocked by provider: {0}")]
    Blocked(String),

    /// The response carried no candidate text.
    #[error("[AI LLM Service] response contained no candidate text")]
    EmptyCandidates,
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for credential/health probes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// Upstream refused the credential (400/401/403 on the probe).
    #[error("[AI LLM Service] credential rejected: {0}")]
    CredentialRejected(HttpError),

    /// Upstream returned another non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Probe payload could not be decoded.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Config helpers                                                            */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable through `lookup`.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or blank.
pub fn must_var<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Reads an optional variable (`None` if unset or blank).
pub fn opt_var<F>(lookup: &F, name: &'static str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u32` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the value is set but not a `u32`.
pub fn opt_u32<F>(lookup: &F, name: &'static str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_parse(lookup, name, "expected u32")
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
pub fn opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_parse(lookup, name, "expected u64")
}

/// Parses an optional `f32` (`Ok(None)` if unset/empty).
pub fn opt_f32<F>(lookup: &F, name: &'static str) -> Result<Option<f32>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_parse(lookup, name, "expected a decimal number")
}

/// Parses a boolean flag (`true/false/1/0/yes/no/on/off`), with default.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] for any other value.
pub fn flag_var<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = opt_var(lookup, name) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFormat {
            var: name,
            reason: "expected a boolean (true/false)",
        }
        .into()),
    }
}

fn opt_parse<F, T>(lookup: &F, name: &'static str, reason: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match opt_var(lookup, name) {
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber { var: name, reason })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] otherwise.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]` or not finite.
pub fn validate_range_f32(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    detail: &'static str,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

/* ------------------------------------------------------------------------- */
/* Misc                                                                      */
/* ------------------------------------------------------------------------- */

/// Max characters of an upstream body kept in logs and error messages.
pub const SNIPPET_LIMIT: usize = 300;

/// Collapses whitespace and clips a response body to [`SNIPPET_LIMIT`] chars.
pub fn make_snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_LIMIT {
        flat
    } else {
        let mut out: String = flat.chars().take(SNIPPET_LIMIT).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn must_var_rejects_blank() {
        let lookup = vars(&[("KEY", "   ")]);
        let err = must_var(&lookup, "KEY").unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::MissingVar("KEY"))));
    }

    #[test]
    fn numbers_and_flags() {
        let lookup = vars(&[("N", "42"), ("BAD", "4x"), ("F", "Off")]);
        assert_eq!(opt_u32(&lookup, "N").unwrap(), Some(42));
        assert_eq!(opt_u32(&lookup, "MISSING").unwrap(), None);
        assert!(opt_u32(&lookup, "BAD").is_err());
        assert!(!flag_var(&lookup, "F", true).unwrap());
        assert!(flag_var(&lookup, "MISSING", true).unwrap());
        assert!(flag_var(&lookup, "N", true).is_err());
    }

    #[test]
    fn snippet_is_flattened_and_clipped() {
        assert_eq!(make_snippet("a\n  b\tc"), "a b c");
        let long = "x".repeat(SNIPPET_LIMIT + 10);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_LIMIT + 1);
        assert!(s.ends_with('…'));
    }
}
