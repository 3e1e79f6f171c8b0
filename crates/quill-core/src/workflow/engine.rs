//! Workflow engine: the generate/review state machine with durable suspension.
//!
//! The engine walks `Start -> Generating -> AwaitingFeedback`, then loops
//! `AwaitingFeedback -> Generating` until the reviewer answers `"done"` and
//! the run reaches `Terminated`.
//!
//! # Suspend / resume protocol
//!
//! 1. [`WorkflowEngine::start`] generates the first draft, writes a
//!    checkpoint pending `AwaitingFeedback`, and returns a [`Suspension`]
//!    to the caller. The store now owns the state.
//! 2. [`WorkflowEngine::resume`] loads that checkpoint and re-enters the
//!    feedback step directly (no regeneration of the pending draft). Non-done
//!    feedback is appended, one new draft is generated, and a new checkpoint
//!    supersedes the old one before the next `Suspension` is returned.
//! 3. On `"done"` the checkpoint is superseded by a terminal one and the final
//!    state is returned.
//!
//! A cycle whose generation fails writes nothing, so the last checkpoint is
//! still the pre-feedback one and the same feedback can be resubmitted.
//!
//! [`WorkflowEngine::run`] drives the same protocol in-process with a
//! [`Reviewer`] standing in for the caller.

use quill_types::checkpoint::{Checkpoint, CheckpointSummary, WorkflowStep};
use quill_types::config::{DEFAULT_REVIEW_PROMPT, EmptyFeedbackPolicy, WorkflowConfig};
use quill_types::conversation::ConversationState;
use uuid::Uuid;

use crate::repository::checkpoint::CheckpointStore;

use super::checkpoint::{CheckpointError, CheckpointManager};
use super::feedback::{
    FeedbackDecision, FeedbackStep, MalformedFeedbackError, ReviewError, ReviewRequest, Reviewer,
};
use super::generation::{ContentGenerator, GenerationError, GenerationStep};
use super::retry::RetryConfig;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables for a [`WorkflowEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub retry: RetryConfig,
    pub review_prompt: String,
    pub empty_feedback: EmptyFeedbackPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            review_prompt: DEFAULT_REVIEW_PROMPT.to_string(),
            empty_feedback: EmptyFeedbackPolicy::default(),
        }
    }
}

impl From<&WorkflowConfig> for EngineOptions {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            retry: RetryConfig::new(config.max_attempts),
            review_prompt: config.review_prompt.clone(),
            empty_feedback: config.empty_feedback,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The engine has paused in `AwaitingFeedback` and returned control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspension {
    pub thread_id: String,
    pub checkpoint_id: Uuid,
    pub latest_draft: String,
    pub prompt: String,
    /// Completed generation cycles so far.
    pub cycle: u32,
}

impl Suspension {
    /// The request a reviewer should answer to resume this suspension.
    pub fn review_request(&self) -> ReviewRequest {
        ReviewRequest {
            thread_id: self.thread_id.clone(),
            latest_draft: self.latest_draft.clone(),
            prompt: self.prompt.clone(),
        }
    }
}

/// Result of resuming a suspended thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// A new draft was generated and the thread is suspended again.
    Suspended(Suspension),
    /// The reviewer said "done"; this is the final state.
    Terminated(ConversationState),
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Resumable draft-refinement engine.
///
/// Generic over the generator and the checkpoint store; both are injected
/// and owned by the engine, so there is no process-wide shared state.
pub struct WorkflowEngine<G: ContentGenerator, S: CheckpointStore> {
    generation: GenerationStep<G>,
    feedback: FeedbackStep,
    checkpoints: CheckpointManager<S>,
}

impl<G: ContentGenerator, S: CheckpointStore> WorkflowEngine<G, S> {
    pub fn new(generator: G, store: S, options: EngineOptions) -> Self {
        Self {
            generation: GenerationStep::new(generator, options.retry),
            feedback: FeedbackStep::new(options.review_prompt, options.empty_feedback),
            checkpoints: CheckpointManager::new(store),
        }
    }

    pub fn generator(&self) -> &G {
        self.generation.generator()
    }

    pub fn store(&self) -> &S {
        self.checkpoints.store()
    }

    /// Begin a run: generate the first draft and suspend for review.
    pub async fn start(
        &self,
        initial_state: ConversationState,
        thread_id: &str,
    ) -> Result<Suspension, EngineError> {
        if let Some(existing) = self.checkpoints.restore(thread_id).await? {
            if existing.pending_step == WorkflowStep::AwaitingFeedback {
                tracing::warn!(
                    thread_id,
                    cycle = existing.cycle,
                    "starting over a suspended thread; its checkpoint will be superseded"
                );
            }
        }

        tracing::info!(thread_id, topic = initial_state.topic(), "starting workflow run");

        let mut state = initial_state;
        transition(thread_id, WorkflowStep::Start, WorkflowStep::Generating);
        self.generation.run(&mut state).await?;
        self.suspend(thread_id, state).await
    }

    /// Resume a suspended thread with the reviewer's response.
    ///
    /// Rejects with [`InvalidResumeError`] before touching the store if the
    /// thread has no checkpoint or is not awaiting feedback. A
    /// [`MalformedFeedbackError`] likewise leaves the stored state as is.
    pub async fn resume(
        &self,
        thread_id: &str,
        feedback_text: &str,
    ) -> Result<ResumeOutcome, EngineError> {
        let checkpoint = self
            .checkpoints
            .restore(thread_id)
            .await?
            .ok_or_else(|| InvalidResumeError::NoCheckpoint {
                thread_id: thread_id.to_string(),
            })?;

        if checkpoint.pending_step != WorkflowStep::AwaitingFeedback {
            return Err(InvalidResumeError::NotAwaitingFeedback {
                thread_id: thread_id.to_string(),
                step: checkpoint.pending_step,
            }
            .into());
        }

        let decision = self.feedback.decide(feedback_text)?;
        let mut state = checkpoint.state;

        tracing::debug!(thread_id, cycle = checkpoint.cycle, "resuming from checkpoint");

        match FeedbackStep::apply(decision, &mut state) {
            WorkflowStep::Terminated => {
                transition(thread_id, WorkflowStep::AwaitingFeedback, WorkflowStep::Terminated);
                self.checkpoints.checkpoint_terminated(thread_id, &state).await?;
                tracing::info!(
                    thread_id,
                    drafts = state.drafts().len(),
                    feedback = state.feedback().len(),
                    "workflow terminated"
                );
                Ok(ResumeOutcome::Terminated(state))
            }
            next => {
                transition(thread_id, WorkflowStep::AwaitingFeedback, next);
                self.generation.run(&mut state).await?;
                Ok(ResumeOutcome::Suspended(self.suspend(thread_id, state).await?))
            }
        }
    }

    /// Drive a whole run to termination, asking `reviewer` at each suspension.
    ///
    /// Responses rejected as malformed are re-asked; any other error ends the
    /// run and propagates.
    pub async fn run<R: Reviewer>(
        &self,
        reviewer: &R,
        initial_state: ConversationState,
        thread_id: &str,
    ) -> Result<ConversationState, EngineError> {
        let mut suspension = self.start(initial_state, thread_id).await?;

        loop {
            let response = reviewer.review(&suspension.review_request()).await?;

            match self.resume(thread_id, &response).await {
                Ok(ResumeOutcome::Suspended(next)) => suspension = next,
                Ok(ResumeOutcome::Terminated(state)) => return Ok(state),
                Err(EngineError::MalformedFeedback(err)) => {
                    tracing::warn!(thread_id, error = %err, "feedback rejected, asking again");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Latest checkpoint for `thread_id`, without changing it.
    pub async fn checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>, EngineError> {
        Ok(self.checkpoints.restore(thread_id).await?)
    }

    /// Summaries of every stored thread.
    pub async fn threads(&self) -> Result<Vec<CheckpointSummary>, EngineError> {
        Ok(self.checkpoints.list().await?)
    }

    /// Persist `state` and hand control back as a [`Suspension`].
    async fn suspend(
        &self,
        thread_id: &str,
        state: ConversationState,
    ) -> Result<Suspension, EngineError> {
        transition(thread_id, WorkflowStep::Generating, WorkflowStep::AwaitingFeedback);

        let request = self.feedback.review_request(thread_id, &state);
        let checkpoint = self.checkpoints.checkpoint_suspension(thread_id, state).await?;

        Ok(Suspension {
            thread_id: thread_id.to_string(),
            checkpoint_id: checkpoint.id,
            latest_draft: request.latest_draft,
            prompt: request.prompt,
            cycle: checkpoint.cycle,
        })
    }
}

fn transition(thread_id: &str, from: WorkflowStep, to: WorkflowStep) {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    tracing::debug!(thread_id, %from, %to, "workflow transition");
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// `resume` was called for a thread that cannot be resumed.
#[derive(Debug, thiserror::Error)]
pub enum InvalidResumeError {
    #[error("no checkpoint for thread '{thread_id}'")]
    NoCheckpoint { thread_id: String },

    #[error("thread '{thread_id}' is not awaiting feedback (pending step: {step})")]
    NotAwaitingFeedback { thread_id: String, step: WorkflowStep },
}

/// Errors that can occur while driving a workflow.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("invalid resume: {0}")]
    InvalidResume(#[from] InvalidResumeError),

    #[error(transparent)]
    MalformedFeedback(#[from] MalformedFeedbackError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
