//! Generation step: produce one new draft, retrying transient failures.
//!
//! The step builds a [`GenerationRequest`] from the conversation state and
//! hands it to a [`ContentGenerator`]. Failed attempts are retried up to the
//! configured bound with the previous error carried into the next request so
//! the generator can correct itself. A draft is appended only on success, so
//! a fatal failure leaves the state exactly as it was.

use std::future::Future;
use std::sync::Arc;

use quill_types::conversation::{ConversationState, Draft};
use quill_types::llm::LlmError;

use super::retry::{RetryConfig, RetryHandler};

/// Input to one generator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    /// Latest feedback content, or the "no feedback yet" marker. Never empty
    /// in a request built from state.
    pub latest_feedback: String,
    /// Note about the previous attempt's failure, if this is a retry.
    pub prior_error: Option<String>,
}

impl GenerationRequest {
    /// Build the first-attempt request for `state`.
    pub fn from_state(state: &ConversationState) -> Self {
        Self {
            topic: state.topic().to_string(),
            latest_feedback: state.latest_feedback_or_marker().to_string(),
            prior_error: None,
        }
    }
}

/// Port for the external content generator.
///
/// Treated as an opaque call: prompt construction is the implementor's
/// concern. See `crate::llm::generator::LlmContentGenerator`.
pub trait ContentGenerator: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<T: ContentGenerator> ContentGenerator for Arc<T> {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        (**self).generate(request)
    }
}

/// The generator failed on every allowed attempt.
#[derive(Debug, thiserror::Error)]
#[error("generation failed for topic '{topic}' after {attempts} attempt(s): {last_error}")]
pub struct GenerationError {
    pub topic: String,
    pub attempts: u32,
    #[source]
    pub last_error: LlmError,
}

/// Retrying wrapper around a [`ContentGenerator`].
pub struct GenerationStep<G: ContentGenerator> {
    generator: G,
    retry: RetryConfig,
}

impl<G: ContentGenerator> GenerationStep<G> {
    pub fn new(generator: G, retry: RetryConfig) -> Self {
        Self { generator, retry }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Generate one draft and append it to `state`.
    ///
    /// On `Err`, `state` is untouched.
    pub async fn run(&self, state: &mut ConversationState) -> Result<(), GenerationError> {
        let mut request = GenerationRequest::from_state(state);
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        tracing::info!(
            topic = state.topic(),
            feedback_count = state.feedback().len(),
            "generating draft"
        );

        loop {
            match self.generator.generate(&request).await {
                Ok(content) => {
                    tracing::debug!(attempt, chars = content.len(), "draft generated");
                    state.push_draft(Draft::new(content));
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "generation attempt failed"
                    );

                    if !RetryHandler::should_retry(&self.retry, attempt) {
                        return Err(GenerationError {
                            topic: state.topic().to_string(),
                            attempts: attempt,
                            last_error: err,
                        });
                    }

                    request.prior_error = Some(RetryHandler::prior_error_note(&err.to_string()));
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::ScriptedGenerator;
    use quill_types::conversation::{FeedbackEntry, NO_FEEDBACK_MARKER};

    #[test]
    fn request_uses_marker_without_feedback() {
        let state = ConversationState::new("AI in healthcare");
        let request = GenerationRequest::from_state(&state);
        assert_eq!(request.topic, "AI in healthcare");
        assert_eq!(request.latest_feedback, NO_FEEDBACK_MARKER);
        assert!(request.prior_error.is_none());
    }

    #[test]
    fn request_uses_latest_feedback() {
        let mut state = ConversationState::new("topic");
        state.push_feedback(FeedbackEntry::new("first"));
        state.push_feedback(FeedbackEntry::new("second"));
        let request = GenerationRequest::from_state(&state);
        assert_eq!(request.latest_feedback, "second");
    }

    #[tokio::test]
    async fn success_appends_one_draft_and_keeps_feedback() {
        let step = GenerationStep::new(ScriptedGenerator::new(vec![Ok("a post")]), RetryConfig::default());
        let mut state = ConversationState::new("topic");
        state.push_feedback(FeedbackEntry::new("shorter"));

        step.run(&mut state).await.unwrap();

        assert_eq!(state.drafts().len(), 1);
        assert_eq!(state.latest_draft().unwrap().content, "a post");
        assert_eq!(state.feedback().len(), 1);
        assert_eq!(step.generator().calls(), 1);
    }

    #[tokio::test]
    async fn recovers_on_third_attempt_carrying_last_error_only() {
        let generator = ScriptedGenerator::new(vec![Err("timeout"), Err("overloaded"), Ok("finally")]);
        let step = GenerationStep::new(generator, RetryConfig::default());
        let mut state = ConversationState::new("topic");

        step.run(&mut state).await.unwrap();

        assert_eq!(state.drafts().len(), 1);
        assert_eq!(state.latest_draft().unwrap().content, "finally");

        let requests = step.generator().requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].prior_error.is_none());
        let second = requests[1].prior_error.as_deref().unwrap();
        assert!(second.contains("timeout"));
        let third = requests[2].prior_error.as_deref().unwrap();
        assert!(third.contains("overloaded"));
        assert!(!third.contains("timeout"), "only the last error is carried");
        // Every attempt sees the same non-empty feedback.
        assert!(requests.iter().all(|r| r.latest_feedback == NO_FEEDBACK_MARKER));
    }

    #[tokio::test]
    async fn exhausting_attempts_leaves_state_untouched() {
        let generator = ScriptedGenerator::new(vec![Err("e1"), Err("e2"), Err("e3"), Ok("never")]);
        let step = GenerationStep::new(generator, RetryConfig::default());
        let mut state = ConversationState::new("AI in healthcare");
        let before = state.clone();

        let err = step.run(&mut state).await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.topic, "AI in healthcare");
        assert!(err.last_error.to_string().contains("e3"));
        assert_eq!(state, before);
        assert_eq!(step.generator().calls(), 3);
    }

    #[tokio::test]
    async fn single_attempt_config_does_not_retry() {
        let generator = ScriptedGenerator::new(vec![Err("boom"), Ok("unused")]);
        let step = GenerationStep::new(generator, RetryConfig::new(1));
        let mut state = ConversationState::new("topic");

        let err = step.run(&mut state).await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(step.generator().calls(), 1);
    }

    #[test]
    fn generation_error_display_reports_topic_attempts_and_error() {
        let err = GenerationError {
            topic: "AI".to_string(),
            attempts: 3,
            last_error: LlmError::AuthenticationFailed,
        };
        let msg = err.to_string();
        assert!(msg.contains("'AI'"));
        assert!(msg.contains("3 attempt"));
        assert!(msg.contains("authentication failed"));
    }
}
