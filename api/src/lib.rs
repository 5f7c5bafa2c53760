//! HTTP surface for the coaching chat: one JSON route per session event.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tokio::signal;
use tracing::{info, warn};

pub mod core {
    pub mod app_state;
    pub mod session_registry;

    pub mod http {
        pub mod response_envelope;
    }
}

pub mod error_handler;

mod middleware_layer {
    pub mod json_extractor;
}

mod routes {
    use axum::http::HeaderMap;

    pub mod health_route;

    pub mod sessions {
        pub mod message_routes;
        pub mod profile_routes;
        pub mod session_request;
        pub mod session_response;
        pub mod session_routes;
    }

    /// `X-Request-Id` of the incoming request, or `-`.
    pub(crate) fn request_id(headers: &HeaderMap) -> String {
        headers
            .get("X-Request-Id")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("-")
            .to_string()
    }
}

pub use crate::core::app_state::{AppConfig, AppState};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        health_route::health_route,
        sessions::{
            message_routes::{list_messages_route, submit_message_route},
            profile_routes::{profile_form_route, save_profile_route},
            session_routes::{create_session_route, delete_session_route, get_session_route},
        },
    },
};

/// Builds the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_route))
        .route("/sessions", post(create_session_route))
        .route(
            "/sessions/{session_id}",
            get(get_session_route).delete(delete_session_route),
        )
        .route("/sessions/{session_id}/profile/form", get(profile_form_route))
        .route("/sessions/{session_id}/profile", put(save_profile_route))
        .route(
            "/sessions/{session_id}/messages",
            get(list_messages_route).post(submit_message_route),
        )
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Binds `state.config.api_address` and serves until Ctrl+C.
pub async fn start(state: AppState) -> Result<(), AppError> {
    let addr = state.config.api_address;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
