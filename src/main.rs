use std::sync::Arc;

use ai_llm_service::{GeminiService, HealthService, config_gemini, telemetry};
use anyhow::Context;
use api::{AppConfig, AppState};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables may come from the real environment alone; only a broken .env is fatal.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to load .env");
        }
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .init();

    let app_config = AppConfig::from_env().context("invalid server configuration")?;
    let llm = config_gemini().context("invalid Gemini configuration")?;

    let health = HealthService::new(llm.clone(), llm.timeout_secs)
        .context("GEMINI_API_KEY or GEMINI_ENDPOINT is unusable")?;

    if app_config.startup_probe {
        let status = health
            .verify()
            .await
            .context("GEMINI_API_KEY check failed (set GEMINI_STARTUP_PROBE=false to skip)")?;
        info!(
            model = %status.model,
            latency_ms = status.latency_ms,
            "Gemini credential verified"
        );
    } else {
        warn!("startup credential probe disabled");
    }

    let completion = GeminiService::new(llm).context("failed to build Gemini client")?;
    let state = AppState::new(app_config, Arc::new(completion), Some(health));

    api::start(state).await?;

    Ok(())
}
