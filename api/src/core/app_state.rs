use std::{net::SocketAddr, sync::Arc};

use ai_llm_service::{
    AiLlmError, CompletionService, HealthService,
    error_handler::{flag_var, opt_var},
};
use thiserror::Error;

use crate::core::session_registry::SessionRegistry;

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8080";

/// Server-side settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Listen address (`API_ADDRESS`).
    pub api_address: SocketAddr,
    /// Verify the LLM credential before serving (`GEMINI_STARTUP_PROBE`).
    pub startup_probe: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API_ADDRESS {value:?}: {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error(transparent)]
    Env(#[from] AiLlmError),
}

impl AppConfig {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = opt_var(&lookup, "API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into());
        let api_address = raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidAddress {
                value: raw.clone(),
                reason: e.to_string(),
            })?;

        let startup_probe = flag_var(&lookup, "GEMINI_STARTUP_PROBE", true)?;

        Ok(Self {
            api_address,
            startup_probe,
        })
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub config: AppConfig,
    /// Process-wide completion client; read-only after startup.
    pub completion: Arc<dyn CompletionService>,
    /// Probe reported by `/health`; absent when no live backend is wired in.
    pub health: Option<HealthService>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        completion: Arc<dyn CompletionService>,
        health: Option<HealthService>,
    ) -> Self {
        Self {
            config,
            completion,
            health,
            sessions: SessionRegistry::default(),
        }
    }
}
