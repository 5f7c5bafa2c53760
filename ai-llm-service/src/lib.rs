//! Gemini completion adapter.
//!
//! - [`config`]: env-driven [`LlmModelConfig`](config::llm_model_config::LlmModelConfig)
//! - [`services::gemini_service`]: non-streaming `generateContent` client
//! - [`completion`]: the [`CompletionService`] seam and the error-as-text collapse
//! - [`health_service`]: credential probe used at startup and by `/health`
//! - [`telemetry`]: the shared tracing layer

pub mod completion;
pub mod error_handler;
pub mod health_service;
pub mod telemetry;

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
}

pub mod services {
    pub mod gemini_service;
}

pub use completion::{CompletionOutcome, CompletionService, ERROR_REPLY_PREFIX};
pub use config::default_config::{config_gemini, config_gemini_from};
pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::AiLlmError;
pub use health_service::{HealthService, HealthStatus};
pub use services::gemini_service::GeminiService;
