//! Completion seam shared by the session layer and the providers.
//!
//! [`CompletionService::generate`] is the strict call. [`CompletionService::complete`]
//! never fails: any error is folded into the text
//! `Error generating response: {details}`, which callers render as a normal
//! assistant reply. [`CompletionService::complete_tagged`] keeps the two cases
//! apart for callers that want to tell them apart before rendering.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::error_handler::AiLlmError;

/// Prefix of the text returned in place of a reply when the completion fails.
pub const ERROR_REPLY_PREFIX: &str = "Error generating response:";

/// Result of one completion attempt, before it is collapsed into display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// Model text, verbatim.
    Success(String),
    /// Human-readable failure details.
    Failure(String),
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionOutcome::Success(_))
    }

    /// Collapses the outcome into the text shown as the assistant reply.
    pub fn into_text(self) -> String {
        match self {
            CompletionOutcome::Success(text) => text,
            CompletionOutcome::Failure(details) => format!("{ERROR_REPLY_PREFIX} {details}"),
        }
    }
}

/// Opaque prompt → text completion service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Issues one completion request.
    ///
    /// # Errors
    /// Any transport, credential or provider failure.
    async fn generate(&self, prompt: &str) -> Result<String, AiLlmError>;

    /// Like [`generate`](Self::generate) but reports failures as a tagged outcome.
    async fn complete_tagged(&self, prompt: &str) -> CompletionOutcome {
        match self.generate(prompt).await {
            Ok(text) => CompletionOutcome::Success(text),
            Err(err) => {
                warn!(error = %err, prompt_len = prompt.len(), "completion failed");
                CompletionOutcome::Failure(err.to_string())
            }
        }
    }

    /// Returns the model text, or the error text standing in for it.
    async fn complete(&self, prompt: &str) -> String {
        self.complete_tagged(prompt).await.into_text()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error_handler::ProviderError;

    /// Echoes the prompt length; deterministic.
    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
            Ok(format!("reply to {} chars", prompt.len()))
        }
    }

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionService for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, AiLlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::EmptyCandidates.into())
        }
    }

    #[tokio::test]
    async fn identical_prompts_give_identical_output() {
        let svc = Echo;
        let a = svc.complete("same prompt").await;
        let b = svc.complete("same prompt").await;
        assert_eq!(a, b);
        assert_eq!(a, "reply to 11 chars");
    }

    #[tokio::test]
    async fn failures_become_error_text() {
        let svc = Failing {
            calls: AtomicUsize::new(0),
        };
        let text = svc.complete("anything").await;
        assert!(text.starts_with(ERROR_REPLY_PREFIX));
        assert!(text.contains("no candidate text"));
        // No retries.
        assert_eq!(svc.calls.load(Ordering::SeqCst), 1);

        let tagged = svc.complete_tagged("anything").await;
        assert!(!tagged.is_success());
    }

    #[test]
    fn outcome_serializes_tagged() {
        let v = serde_json::to_value(CompletionOutcome::Failure("boom".into())).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["text"], "boom");
    }
}
