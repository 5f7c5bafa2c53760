use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coach_core::{ProfileError, SessionError};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::{
    app_state::ConfigError,
    http::response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / session ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("invalid profile: {0}")]
    InvalidProfile(ProfileError),

    #[error("save a profile before chatting")]
    ProfileRequired,

    #[error("message is empty")]
    EmptyMessage,

    #[error("chat turn did not finish: {0}")]
    TurnAborted(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::EmptyMessage => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProfileRequired => StatusCode::CONFLICT,
            AppError::InvalidProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::TurnAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // startup-only
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AppError::InvalidProfile(_) => "INVALID_PROFILE",
            AppError::ProfileRequired => "PROFILE_REQUIRED",
            AppError::EmptyMessage => "EMPTY_MESSAGE",
            AppError::TurnAborted(_) => "TURN_ABORTED",
        }
    }

    fn details(&self) -> Vec<ApiErrorDetail> {
        match self {
            AppError::InvalidProfile(e) => {
                let hint = match e {
                    ProfileError::OutOfRange { min, max, .. } => {
                        format!("Must be between {min} and {max}.")
                    }
                    ProfileError::UnknownGoal(_) => format!(
                        "One of: {}.",
                        coach_core::FitnessGoal::ALL.map(|g| g.label()).join(", ")
                    ),
                    ProfileError::UnknownExperience(_) => format!(
                        "One of: {}.",
                        coach_core::ExperienceLevel::ALL.map(|l| l.label()).join(", ")
                    ),
                };
                vec![ApiErrorDetail::field(e.field(), hint)]
            }
            AppError::EmptyMessage => {
                vec![ApiErrorDetail::field("text", "Type a question first.")]
            }
            _ => Vec::new(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidProfile(e) => AppError::InvalidProfile(e),
            SessionError::ProfileRequired => AppError::ProfileRequired,
            SessionError::EmptyMessage => AppError::EmptyMessage,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(code = self.error_code(), error = %self, "request rejected");
        }
        ApiResponse::<()>::error(self.error_code(), self.to_string(), self.details())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
