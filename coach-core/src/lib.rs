//! Coaching core: profile store, transcript, prompt builder and the
//! per-session controller that ties them to a completion service.
//!
//! The crate knows nothing about HTTP or rendering. A UI layer drives a
//! [`SessionController`] with two events (`save_profile`, `submit_message`)
//! and renders from its accessors (`profile_form`, `transcript`).

mod error;
pub mod profile;
pub mod prompt;
pub mod session;
pub mod transcript;

pub use error::{ProfileError, SessionError};
pub use profile::{ExperienceLevel, FitnessGoal, ProfileForm, ProfileFormView, UserProfile};
pub use prompt::{NOT_PROVIDED, PromptProfile, build_prompt, render_history};
pub use session::{SessionController, SessionState, Turn};
pub use transcript::{ChatMessage, Role, Transcript};
