//! Durable checkpoint manager for conversation state.
//!
//! Wraps a `CheckpointStore` to provide the two writes the engine performs
//! (suspension and termination) and the read it performs on resume. Every
//! write completes before the engine hands control back to its caller, so
//! a suspension is durable by the time it is observed.

use quill_types::checkpoint::{Checkpoint, CheckpointSummary, WorkflowStep};
use quill_types::conversation::ConversationState;

use crate::repository::checkpoint::CheckpointStore;

// ---------------------------------------------------------------------------
// CheckpointManager
// ---------------------------------------------------------------------------

/// Manages durable checkpoints for conversation threads.
///
/// Generic over `S: CheckpointStore` so it works with any storage backend
/// (in-memory map, test mock, etc.).
pub struct CheckpointManager<S: CheckpointStore> {
    store: S,
}

impl<S: CheckpointStore> CheckpointManager<S> {
    /// Create a new checkpoint manager backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `state` as pending feedback for `thread_id`.
    ///
    /// Takes the state by value: from here until the next resume the store
    /// is its only owner. Returns the checkpoint as written.
    pub async fn checkpoint_suspension(
        &self,
        thread_id: &str,
        state: ConversationState,
    ) -> Result<Checkpoint, CheckpointError> {
        let checkpoint = Checkpoint::new(thread_id, state, WorkflowStep::AwaitingFeedback);

        self.store
            .put(checkpoint.clone())
            .await
            .map_err(|e| CheckpointError::Repository(e.to_string()))?;

        tracing::debug!(
            thread_id,
            checkpoint_id = %checkpoint.id,
            cycle = checkpoint.cycle,
            "checkpointed suspension"
        );

        Ok(checkpoint)
    }

    /// Mark `thread_id` as terminated so it can no longer be resumed.
    pub async fn checkpoint_terminated(
        &self,
        thread_id: &str,
        state: &ConversationState,
    ) -> Result<(), CheckpointError> {
        let checkpoint = Checkpoint::new(thread_id, state.clone(), WorkflowStep::Terminated);

        self.store
            .put(checkpoint)
            .await
            .map_err(|e| CheckpointError::Repository(e.to_string()))?;

        tracing::debug!(thread_id, "checkpointed termination");
        Ok(())
    }

    /// Load the latest checkpoint for `thread_id`, if any.
    pub async fn restore(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        self.store
            .get(thread_id)
            .await
            .map_err(|e| CheckpointError::Repository(e.to_string()))
    }

    /// Summaries of every stored thread.
    pub async fn list(&self) -> Result<Vec<CheckpointSummary>, CheckpointError> {
        self.store
            .list()
            .await
            .map_err(|e| CheckpointError::Repository(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Underlying store operation failed.
    #[error("checkpoint store error: {0}")]
    Repository(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::MockStore;
    use quill_types::conversation::Draft;

    #[tokio::test]
    async fn suspension_is_visible_to_restore() {
        let manager = CheckpointManager::new(MockStore::default());
        let mut state = ConversationState::new("topic");
        state.push_draft(Draft::new("draft"));

        let written = manager.checkpoint_suspension("t-1", state).await.unwrap();
        let restored = manager.restore("t-1").await.unwrap().unwrap();

        assert_eq!(restored, written);
        assert_eq!(restored.pending_step, WorkflowStep::AwaitingFeedback);
        assert_eq!(restored.cycle, 1);
    }

    #[tokio::test]
    async fn termination_supersedes_suspension() {
        let manager = CheckpointManager::new(MockStore::default());
        let state = ConversationState::new("topic");

        manager.checkpoint_suspension("t-1", state.clone()).await.unwrap();
        manager.checkpoint_terminated("t-1", &state).await.unwrap();

        let restored = manager.restore("t-1").await.unwrap().unwrap();
        assert_eq!(restored.pending_step, WorkflowStep::Terminated);
        assert_eq!(manager.store().puts(), 2);
        assert_eq!(manager.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn restore_unknown_thread_is_none() {
        let manager = CheckpointManager::new(MockStore::default());
        assert!(manager.restore("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failure_maps_to_repository_error() {
        let manager = CheckpointManager::new(MockStore::failing());
        let err = manager
            .checkpoint_suspension("t-1", ConversationState::new("topic"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("checkpoint store error"));
    }
}
