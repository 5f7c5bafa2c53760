use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use coach_core::ProfileForm;
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{request_id, sessions::session_response::ProfileSavedResponse},
};

/// Form fields with ranges, options and current values.
pub async fn profile_form_route(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Response> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;
    let form = handle.lock().await.profile_form();

    Ok(ApiResponse::success(form).into_response_with_status(StatusCode::OK))
}

/// Validates and stores the profile; moves the session to `ready`.
pub async fn save_profile_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
    Json(form): Json<ProfileForm>,
) -> AppResult<Response> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;
    let mut session = handle.lock().await;

    let profile = session.save_profile(form)?.clone();
    info!(
        request_id = %request_id(&headers),
        session_id = %session_id,
        "save_profile_route: saved"
    );

    let body = ProfileSavedResponse {
        state: session.state(),
        profile,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
