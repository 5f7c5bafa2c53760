use serde::Deserialize;

/// Body of `POST /sessions/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub text: String,
}
