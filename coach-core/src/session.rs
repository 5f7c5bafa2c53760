//! Session controller: owns one user's profile and transcript and processes
//! their events one at a time.
//!
//! States: [`SessionState::NoProfile`] (initial, chat disabled) and
//! [`SessionState::Ready`]. `save_profile` is accepted in both and moves the
//! session to `Ready`; `submit_message` is only accepted in `Ready`.

use ai_llm_service::CompletionService;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::SessionError,
    profile::{ProfileForm, ProfileFormView, UserProfile},
    prompt::{PromptProfile, build_prompt},
    transcript::{ChatMessage, Transcript},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoProfile,
    Ready,
}

/// One processed chat turn, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
    /// `false` when `assistant.content` is the error text standing in for a reply.
    pub completed: bool,
}

#[derive(Debug, Default)]
pub struct SessionController {
    profile: Option<UserProfile>,
    transcript: Transcript,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.profile.is_some() {
            SessionState::Ready
        } else {
            SessionState::NoProfile
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Form contents to render, prefilled from the saved profile.
    pub fn profile_form(&self) -> ProfileFormView {
        ProfileFormView::prefilled(self.profile.as_ref())
    }

    /// Validates `form` and replaces the stored profile. The transcript is kept.
    ///
    /// # Errors
    /// [`SessionError::InvalidProfile`]; the previous profile stays in place.
    pub fn save_profile(&mut self, form: ProfileForm) -> Result<&UserProfile, SessionError> {
        let profile = UserProfile::try_from(form)?;
        info!(
            age = profile.age,
            goal = %profile.goal,
            experience = %profile.experience,
            replaced = self.profile.is_some(),
            "profile saved"
        );
        Ok(self.profile.insert(profile))
    }

    /// Runs one chat turn: build the prompt, call the completion service, then
    /// append the user message and the reply (or the error text standing in for it).
    ///
    /// The transcript is only touched after the completion returns, so dropping
    /// the future mid-call leaves the session as it was.
    ///
    /// # Errors
    /// - [`SessionError::ProfileRequired`] while no profile is saved
    /// - [`SessionError::EmptyMessage`] for blank input
    ///
    /// Neither error touches the transcript.
    #[instrument(name = "submit_message", skip_all, fields(history = self.transcript.len()))]
    pub async fn submit_message<C>(
        &mut self,
        completion: &C,
        text: &str,
    ) -> Result<Turn, SessionError>
    where
        C: CompletionService + ?Sized,
    {
        let Some(profile) = self.profile.as_ref() else {
            debug!("message refused: no profile yet");
            return Err(SessionError::ProfileRequired);
        };
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let prompt = build_prompt(
            &PromptProfile::from(profile),
            self.transcript.messages(),
            text,
        );

        debug!(prompt_len = prompt.len(), "prompt built");
        let outcome = completion.complete_tagged(&prompt).await;
        let completed = outcome.is_success();
        if !completed {
            warn!("assistant turn carries an error reply");
        }

        // Both messages land together, after the only await point.
        let user = ChatMessage::user(text);
        let assistant = ChatMessage::assistant(outcome.into_text());
        self.transcript.push(user.clone());
        self.transcript.push(assistant.clone());

        info!(
            completed,
            reply_len = assistant.content.len(),
            transcript_len = self.transcript.len(),
            "turn finished"
        );

        Ok(Turn {
            user,
            assistant,
            completed,
        })
    }
}
