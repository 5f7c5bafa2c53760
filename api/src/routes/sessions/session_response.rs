use coach_core::{ChatMessage, SessionController, SessionState, UserProfile};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub state: SessionState,
}

/// Full view of one session.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: SessionState,
    pub profile: Option<UserProfile>,
    pub messages: Vec<ChatMessage>,
}

impl SessionSnapshot {
    pub fn of(session_id: Uuid, session: &SessionController) -> Self {
        Self {
            session_id,
            state: session.state(),
            profile: session.profile().cloned(),
            messages: session.transcript().messages().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileSavedResponse {
    pub state: SessionState,
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
}
