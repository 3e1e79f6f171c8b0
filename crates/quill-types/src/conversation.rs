//! Conversation state for the draft refinement loop.
//!
//! `ConversationState` is the value threaded through every workflow step.
//! Its two sequences are append-only: the fields are private and the only
//! mutators push to the end, so history can never be truncated or reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used in place of feedback before the reviewer has said anything.
///
/// Only ever used to build a generation request; it is never stored in
/// [`ConversationState::feedback`].
pub const NO_FEEDBACK_MARKER: &str = "No feedback yet";

/// Reserved reviewer response that ends the workflow.
pub const DONE_SIGNAL: &str = "done";

/// Returns `true` if a reviewer response is the termination sentinel.
///
/// Matching is case-insensitive and ignores surrounding whitespace, so
/// `" Done "` and `"DONE"` both count.
pub fn is_done_signal(response: &str) -> bool {
    response.trim().eq_ignore_ascii_case(DONE_SIGNAL)
}

/// One generated candidate post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// One piece of reviewer input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl FeedbackEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            received_at: Utc::now(),
        }
    }
}

/// State of one refinement conversation.
///
/// Created with only a topic. Drafts are appended by the generation step and
/// feedback by the feedback step; nothing else mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    topic: String,
    #[serde(default)]
    drafts: Vec<Draft>,
    #[serde(default)]
    feedback: Vec<FeedbackEntry>,
}

impl ConversationState {
    /// Start a new conversation about `topic` with no drafts or feedback.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            drafts: Vec::new(),
            feedback: Vec::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// All drafts, oldest first.
    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    /// All stored feedback, oldest first.
    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    /// The most recent draft, if any generation has completed.
    pub fn latest_draft(&self) -> Option<&Draft> {
        self.drafts.last()
    }

    /// The most recent feedback entry, if the reviewer has responded.
    pub fn latest_feedback(&self) -> Option<&FeedbackEntry> {
        self.feedback.last()
    }

    /// Content of the latest feedback, or [`NO_FEEDBACK_MARKER`] if there is none.
    pub fn latest_feedback_or_marker(&self) -> &str {
        self.latest_feedback()
            .map(|entry| entry.content.as_str())
            .unwrap_or(NO_FEEDBACK_MARKER)
    }

    pub fn push_draft(&mut self, draft: Draft) {
        self.drafts.push(draft);
    }

    pub fn push_feedback(&mut self, entry: FeedbackEntry) {
        self.feedback.push(entry);
    }

    /// Number of completed generation cycles.
    pub fn cycle(&self) -> u32 {
        self.drafts.len() as u32
    }
}
