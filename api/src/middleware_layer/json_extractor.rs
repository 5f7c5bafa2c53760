use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

const REQUEST_ID: &str = "X-Request-Id";

/// Body fields a serde rejection message may point at.
const KNOWN_FIELDS: [&str; 6] = ["age", "weight", "height", "goal", "experience", "text"];

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    // `missing field `age`` first, then the `age: invalid type` path prefix.
    let quoted = KNOWN_FIELDS
        .iter()
        .find(|key| msg.contains(&format!("`{key}`")));
    let prefixed = || {
        KNOWN_FIELDS
            .iter()
            .find(|key| msg.contains(&format!("{key}: ")))
    };
    quoted.or_else(prefixed).map(|key| key.to_string())
}

fn hint_from_serde_msg(msg: &str) -> Option<String> {
    if msg.contains("invalid type: string") || msg.contains("expected f64") {
        Some("Numeric fields (age, weight, height) take JSON numbers.".into())
    } else if msg.contains("missing field") {
        Some("Send every field of the request body.".into())
    } else if msg.contains("expected a map") || msg.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"field\": \"value\" }).".into())
    } else if msg.contains("UUID") {
        Some("Session ids are UUIDs returned by POST /sessions.".into())
    } else {
        None
    }
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts.headers.get(REQUEST_ID).and_then(|h| h.to_str().ok()) {
        if !v.trim().is_empty() {
            return v.to_string();
        }
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(value) = HeaderValue::from_str(&id) {
        parts.headers.insert(REQUEST_ID, value);
    }
    id
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Rewrites plain-text extractor rejections (400/422) into the JSON envelope.
/// Responses that are already JSON pass through unchanged.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let request_id = ensure_request_id(&mut parts);
    if is_json(&parts) {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let original = String::from_utf8_lossy(&bytes);
    tracing::debug!(request_id = %request_id, status = %status, "extractor rejection");

    let detail = ApiErrorDetail {
        path: guess_path_from_serde_msg(&original),
        hint: hint_from_serde_msg(&original),
    };
    let details = if detail.path.is_some() || detail.hint.is_some() {
        vec![detail]
    } else {
        Vec::new()
    };

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        details,
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(body))
}
