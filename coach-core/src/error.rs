//! Typed errors for the coach-core crate.

use thiserror::Error;

/// Why a submitted profile form was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// A numeric field fell outside its inclusive range (or was not finite).
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("unknown fitness goal: {0:?}")]
    UnknownGoal(String),

    #[error("unknown experience level: {0:?}")]
    UnknownExperience(String),
}

impl ProfileError {
    /// Name of the form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ProfileError::OutOfRange { field, .. } => field,
            ProfileError::UnknownGoal(_) => "goal",
            ProfileError::UnknownExperience(_) => "experience",
        }
    }
}

/// Events a session refuses to process. None of them mutate the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),

    /// Chat is disabled until a profile has been saved.
    #[error("a profile must be saved before chatting")]
    ProfileRequired,

    #[error("message must not be empty")]
    EmptyMessage,
}
