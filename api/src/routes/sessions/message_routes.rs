use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{
        request_id,
        sessions::{session_request::SubmitMessageRequest, session_response::TranscriptResponse},
    },
};

pub async fn list_messages_route(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Response> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;
    let messages = handle.lock().await.transcript().messages().to_vec();

    Ok(ApiResponse::success(TranscriptResponse { messages })
        .into_response_with_status(StatusCode::OK))
}

/// Runs one chat turn. A failed completion still answers 200: the reply
/// carries the error text and `completed` is `false`.
pub async fn submit_message_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
    Json(p): Json<SubmitMessageRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    debug!(
        request_id = %request_id,
        session_id = %session_id,
        text_len = p.text.len(),
        "submit_message_route: start"
    );

    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(AppError::SessionNotFound(session_id))?;

    // Held across the completion call so turns of one session never interleave.
    let mut session = handle.lock_owned().await;
    let completion = Arc::clone(&state.completion);

    // Once started, the turn runs to completion on its own task even if the
    // client goes away and this handler future is dropped.
    let text = p.text;
    let turn = tokio::spawn(async move {
        session.submit_message(completion.as_ref(), &text).await
    })
    .await
    .map_err(|e| AppError::TurnAborted(e.to_string()))??;

    debug!(
        request_id = %request_id,
        session_id = %session_id,
        completed = turn.completed,
        "submit_message_route: done"
    );

    Ok(ApiResponse::success(turn).into_response_with_status(StatusCode::OK))
}
