use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<HealthStatus>,
}

/// Liveness plus an LLM probe. An unreachable LLM does not fail the route.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let llm = match &state.health {
        Some(probe) => Some(probe.check().await),
        None => None,
    };

    let body = HealthResponse {
        status: "ok",
        sessions: state.sessions.len().await,
        llm,
    };
    ApiResponse::success(body).into_response_with_status(StatusCode::OK)
}
