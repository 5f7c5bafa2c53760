/// Configuration for the Gemini completion model.
///
/// Built once at startup (see [`crate::config::default_config::config_gemini`])
/// and shared read-only for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_model_config::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     model: "gemini-2.5-flash".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: "AIza...".to_string(),
///     max_tokens: None,
///     temperature: None,
///     top_p: None,
///     timeout_secs: None,
/// };
/// assert_eq!(cfg.generate_url(), "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent");
/// ```
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier (e.g., `"gemini-2.5-flash"`).
    pub model: String,

    /// API base URL, without the `/v1beta` suffix.
    pub endpoint: String,

    /// Static API key sent as `x-goog-api-key`.
    pub api_key: String,

    /// Maximum number of output tokens (`generationConfig.maxOutputTokens`).
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout in seconds. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Endpoint base with trailing slashes removed.
    pub fn base(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }

    /// `POST` target for `generateContent`.
    pub fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base(), self.model)
    }

    /// `GET` target describing the configured model (used by the credential probe).
    pub fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base(), self.model)
    }
}

// Hand-written so the key never reaches logs through `{:?}`.
impl std::fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
