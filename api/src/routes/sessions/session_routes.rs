use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{
        request_id,
        sessions::session_response::{SessionCreatedResponse, SessionSnapshot},
    },
};

pub async fn create_session_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let session_id = state.sessions.create().await;
    info!(
        request_id = %request_id(&headers),
        session_id = %session_id,
        "create_session_route: created"
    );

    let body = SessionCreatedResponse {
        session_id,
        state: coach_core::SessionState::NoProfile,
    };
    ApiResponse::success(body).into_response_with_status(StatusCode::CREATED)
}

pub async fn get_session_route(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Response> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;
    let session = handle.lock().await;

    Ok(ApiResponse::success(SessionSnapshot::of(session_id, &session))
        .into_response_with_status(StatusCode::OK))
}

pub async fn delete_session_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> AppResult<Response> {
    if !state.sessions.remove(session_id).await {
        return Err(AppError::SessionNotFound(session_id));
    }
    debug!(
        request_id = %request_id(&headers),
        session_id = %session_id,
        "delete_session_route: removed"
    );
    Ok(StatusCode::NO_CONTENT.into_response())
}
