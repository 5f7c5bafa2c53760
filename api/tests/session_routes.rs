use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use ai_llm_service::{AiLlmError, CompletionService, error_handler::ProviderError};
use api::{AppConfig, AppState, router};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct Scripted {
    prompts: Mutex<Vec<String>>,
    fail: bool,
    delay: Option<Duration>,
}

#[async_trait]
impl CompletionService for Scripted {
    async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProviderError::EmptyCandidates.into());
        }
        Ok("Day 1: squats".to_string())
    }
}

fn app_with(svc: Arc<Scripted>) -> Router {
    let config = AppConfig::from_lookup(|_| None).unwrap();
    router(Arc::new(AppState::new(config, svc, None)))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["state"], "no_profile");
    body["data"]["session_id"].as_str().unwrap().to_string()
}

fn profile() -> Value {
    json!({
        "age": 25,
        "weight": 70.0,
        "height": 175.0,
        "goal": "General Fitness",
        "experience": "Beginner"
    })
}

#[tokio::test]
async fn chat_requires_profile() {
    let svc = Arc::new(Scripted::default());
    let app = app_with(svc.clone());
    let id = new_session(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/sessions/{id}/messages"),
        Some(json!({ "text": "hello" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "PROFILE_REQUIRED");
    assert!(svc.prompts.lock().unwrap().is_empty());

    let (_, body) = call(&app, Method::GET, &format!("/sessions/{id}/messages"), None).await;
    assert_eq!(body["data"]["messages"], json!([]));
}

#[tokio::test]
async fn first_turn_over_http() {
    let svc = Arc::new(Scripted::default());
    let app = app_with(svc.clone());
    let id = new_session(&app).await;

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/sessions/{id}/profile"),
        Some(profile()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "ready");

    let q = "Create a 3-day workout plan for me";
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/sessions/{id}/messages"),
        Some(json!({ "text": q })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["content"], q);
    assert_eq!(body["data"]["assistant"]["role"], "assistant");
    assert_eq!(body["data"]["assistant"]["content"], "Day 1: squats");
    assert_eq!(body["data"]["completed"], true);

    let prompt = svc.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Age: 25"));
    assert!(prompt.contains("Weight: 70.0 kg"));
    assert!(prompt.ends_with(q));

    let (_, body) = call(&app, Method::GET, &format!("/sessions/{id}"), None).await;
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(body["data"]["profile"]["goal"], "General Fitness");
}

#[tokio::test]
async fn completion_failure_is_a_normal_turn() {
    let svc = Arc::new(Scripted {
        fail: true,
        ..Default::default()
    });
    let app = app_with(svc);
    let id = new_session(&app).await;
    call(&app, Method::PUT, &format!("/sessions/{id}/profile"), Some(profile())).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/sessions/{id}/messages"),
        Some(json!({ "text": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], false);
    let reply = body["data"]["assistant"]["content"].as_str().unwrap();
    assert!(reply.starts_with("Error generating response:"));
}

#[tokio::test]
async fn invalid_profile_is_422_with_field() {
    let app = app_with(Arc::new(Scripted::default()));
    let id = new_session(&app).await;

    let mut bad = profile();
    bad["age"] = json!(12);
    let (status, body) = call(&app, Method::PUT, &format!("/sessions/{id}/profile"), Some(bad)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_PROFILE");
    assert_eq!(body["error"]["details"][0]["path"], "age");

    let (_, body) = call(&app, Method::GET, &format!("/sessions/{id}"), None).await;
    assert_eq!(body["data"]["state"], "no_profile");
}

#[tokio::test]
async fn blank_message_is_400() {
    let app = app_with(Arc::new(Scripted::default()));
    let id = new_session(&app).await;
    call(&app, Method::PUT, &format!("/sessions/{id}/profile"), Some(profile())).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/sessions/{id}/messages"),
        Some(json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_MESSAGE");
}

#[tokio::test]
async fn unknown_and_deleted_sessions_are_404() {
    let app = app_with(Arc::new(Scripted::default()));

    let missing = "00000000-0000-4000-8000-000000000000";
    let (status, body) = call(&app, Method::GET, &format!("/sessions/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");

    let id = new_session(&app).await;
    let (status, _) = call(&app, Method::DELETE, &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &format!("/sessions/{id}/messages"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_wrapped_in_envelope() {
    let app = app_with(Arc::new(Scripted::default()));
    let id = new_session(&app).await;

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/sessions/{id}/profile"),
        Some(json!({ "age": "old", "weight": 70.0, "height": 175.0, "goal": "General Fitness", "experience": "Beginner" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn profile_form_is_prefilled_after_save() {
    let app = app_with(Arc::new(Scripted::default()));
    let id = new_session(&app).await;

    let (status, before) = call(&app, Method::GET, &format!("/sessions/{id}/profile/form"), None).await;
    assert_eq!(status, StatusCode::OK);

    let mut edited = profile();
    edited["age"] = json!(40);
    call(&app, Method::PUT, &format!("/sessions/{id}/profile"), Some(edited)).await;

    let (_, after) = call(&app, Method::GET, &format!("/sessions/{id}/profile/form"), None).await;
    assert_eq!(before["data"]["age"]["value"], 25);
    assert_eq!(after["data"]["age"]["value"], 40);
    assert_eq!(after["data"]["goal"]["value"], "General Fitness");
}

#[tokio::test]
async fn health_reports_sessions() {
    let app = app_with(Arc::new(Scripted::default()));
    new_session(&app).await;

    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["sessions"], 1);
}

#[tokio::test]
async fn disconnected_client_does_not_cancel_turn() {
    let svc = Arc::new(Scripted {
        delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let app = app_with(svc.clone());
    let id = new_session(&app).await;
    call(&app, Method::PUT, &format!("/sessions/{id}/profile"), Some(profile())).await;

    let uri = format!("/sessions/{id}/messages");
    let dropped = tokio::time::timeout(
        Duration::from_millis(20),
        call(&app, Method::POST, &uri, Some(json!({ "text": "slow question" }))),
    )
    .await;
    assert!(dropped.is_err());

    // Waits on the session lock until the detached turn has finished.
    let (status, body) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "slow question");
    assert_eq!(messages[1]["content"], "Day 1: squats");
    assert_eq!(svc.prompts.lock().unwrap().len(), 1);
}
