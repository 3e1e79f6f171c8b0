//! Checkpoint types for the resumable workflow.
//!
//! A [`Checkpoint`] is a snapshot of [`ConversationState`] plus the step the
//! engine will re-enter on resume. The latest checkpoint for a thread
//! supersedes any earlier one; they are never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::conversation::ConversationState;

/// Engine state / step identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Start,
    Generating,
    AwaitingFeedback,
    Terminated,
}

impl WorkflowStep {
    /// Whether `self -> next` is an edge of the workflow graph.
    ///
    /// `Generating -> Generating` is deliberately absent: retries happen
    /// inside the generation step and never surface as a transition.
    pub fn can_transition_to(self, next: WorkflowStep) -> bool {
        matches!(
            (self, next),
            (WorkflowStep::Start, WorkflowStep::Generating)
                | (WorkflowStep::Generating, WorkflowStep::AwaitingFeedback)
                | (WorkflowStep::AwaitingFeedback, WorkflowStep::Generating)
                | (WorkflowStep::AwaitingFeedback, WorkflowStep::Terminated)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == WorkflowStep::Terminated
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::Start => write!(f, "start"),
            WorkflowStep::Generating => write!(f, "generating"),
            WorkflowStep::AwaitingFeedback => write!(f, "awaiting_feedback"),
            WorkflowStep::Terminated => write!(f, "terminated"),
        }
    }
}

impl FromStr for WorkflowStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(WorkflowStep::Start),
            "generating" => Ok(WorkflowStep::Generating),
            "awaiting_feedback" => Ok(WorkflowStep::AwaitingFeedback),
            "terminated" => Ok(WorkflowStep::Terminated),
            other => Err(format!("invalid workflow step: '{other}'")),
        }
    }
}

/// Snapshot sufficient to resume a conversation exactly where it paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique checkpoint identifier (UUID v7, time-sortable).
    pub id: Uuid,
    pub thread_id: String,
    pub state: ConversationState,
    pub pending_step: WorkflowStep,
    /// Completed generation cycles at the time of the snapshot.
    pub cycle: u32,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, state: ConversationState, pending_step: WorkflowStep) -> Self {
        let cycle = state.cycle();
        Self {
            id: Uuid::now_v7(),
            thread_id: thread_id.into(),
            state,
            pending_step,
            cycle,
            created_at: Utc::now(),
        }
    }

    /// Listing row for this checkpoint.
    pub fn summary(&self) -> CheckpointSummary {
        CheckpointSummary {
            thread_id: self.thread_id.clone(),
            topic: self.state.topic().to_string(),
            pending_step: self.pending_step,
            cycle: self.cycle,
            updated_at: self.created_at,
        }
    }
}

/// Lightweight description of a stored checkpoint.
///
/// Avoids cloning the full state when only metadata is needed
/// (e.g., "thread-1 -- awaiting_feedback, cycle 3").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointSummary {
    pub thread_id: String,
    pub topic: String,
    pub pending_step: WorkflowStep,
    pub cycle: u32,
    pub updated_at: DateTime<Utc>,
}
