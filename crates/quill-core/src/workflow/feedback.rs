//! Feedback step: the workflow's only suspension point.
//!
//! The engine exposes the latest draft to a [`Reviewer`] and feeds the
//! response back through [`FeedbackStep::decide`]. A `"done"` response ends
//! the run; anything else becomes a new feedback entry and sends the
//! workflow back to generation. This step never touches `drafts`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use quill_types::checkpoint::WorkflowStep;
use quill_types::config::EmptyFeedbackPolicy;
use quill_types::conversation::{ConversationState, FeedbackEntry, is_done_signal};

/// What the reviewer is shown at a suspension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub thread_id: String,
    pub latest_draft: String,
    pub prompt: String,
}

/// Errors from the reviewer channel.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The channel has no more input (EOF, script exhausted).
    #[error("reviewer channel closed")]
    Closed,

    #[error("reviewer I/O error: {0}")]
    Io(String),
}

/// Port for the human reviewer.
///
/// Blocking from the engine's point of view: the returned future resolves
/// only once a response is available. There is no timeout.
pub trait Reviewer: Send + Sync {
    fn review(
        &self,
        request: &ReviewRequest,
    ) -> impl Future<Output = Result<String, ReviewError>> + Send;
}

/// Reviewer that replays a fixed list of responses, then reports `Closed`.
#[derive(Debug, Default)]
pub struct ScriptedReviewer {
    responses: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<ReviewRequest>>,
}

impl ScriptedReviewer {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn seen(&self) -> Vec<ReviewRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Reviewer for ScriptedReviewer {
    async fn review(&self, request: &ReviewRequest) -> Result<String, ReviewError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|e| ReviewError::Io(e.to_string()))?;
        responses.pop_front().ok_or(ReviewError::Closed)
    }
}

/// The reviewer's response was rejected by the empty-feedback policy.
#[derive(Debug, thiserror::Error)]
#[error("malformed feedback: {reason}")]
pub struct MalformedFeedbackError {
    pub reason: String,
}

/// Outcome of classifying a reviewer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackDecision {
    /// The reviewer approved; the run ends.
    Terminate,
    /// The reviewer asked for changes; store this entry and regenerate.
    Revise(FeedbackEntry),
}

/// Classifies reviewer responses and applies them to the state.
#[derive(Debug, Clone)]
pub struct FeedbackStep {
    prompt: String,
    empty_policy: EmptyFeedbackPolicy,
}

impl FeedbackStep {
    pub fn new(prompt: impl Into<String>, empty_policy: EmptyFeedbackPolicy) -> Self {
        Self {
            prompt: prompt.into(),
            empty_policy,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// What to show the reviewer for the current state.
    pub fn review_request(&self, thread_id: &str, state: &ConversationState) -> ReviewRequest {
        ReviewRequest {
            thread_id: thread_id.to_string(),
            latest_draft: state
                .latest_draft()
                .map(|draft| draft.content.clone())
                .unwrap_or_default(),
            prompt: self.prompt.clone(),
        }
    }

    /// Classify a reviewer response without touching any state.
    pub fn decide(&self, response: &str) -> Result<FeedbackDecision, MalformedFeedbackError> {
        if is_done_signal(response) {
            return Ok(FeedbackDecision::Terminate);
        }

        if response.trim().is_empty() && self.empty_policy == EmptyFeedbackPolicy::Reject {
            return Err(MalformedFeedbackError {
                reason: "feedback is empty".to_string(),
            });
        }

        Ok(FeedbackDecision::Revise(FeedbackEntry::new(response)))
    }

    /// Apply a decision to `state` and return the next step.
    pub fn apply(decision: FeedbackDecision, state: &mut ConversationState) -> WorkflowStep {
        match decision {
            FeedbackDecision::Terminate => WorkflowStep::Terminated,
            FeedbackDecision::Revise(entry) => {
                state.push_feedback(entry);
                WorkflowStep::Generating
            }
        }
    }
}
