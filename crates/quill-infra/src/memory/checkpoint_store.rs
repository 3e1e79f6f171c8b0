//! `DashMap`-backed checkpoint store.
//!
//! One entry per thread identity. `put` is a plain insert that completes
//! before its future resolves, which gives the per-key read-after-write
//! guarantee the engine relies on. Values are cloned on read so no `DashMap`
//! guard is ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;

use quill_core::repository::checkpoint::CheckpointStore;
use quill_types::checkpoint::{Checkpoint, CheckpointSummary};
use quill_types::error::RepositoryError;

/// In-process [`CheckpointStore`].
///
/// Cloning produces a shared view of the same underlying map (backed by `Arc`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    inner: Arc<DashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with a stored checkpoint.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), RepositoryError> {
        tracing::trace!(
            thread_id = checkpoint.thread_id.as_str(),
            checkpoint_id = %checkpoint.id,
            "storing checkpoint"
        );
        self.inner.insert(checkpoint.thread_id.clone(), checkpoint);
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>, RepositoryError> {
        Ok(self.inner.get(thread_id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<CheckpointSummary>, RepositoryError> {
        let mut summaries: Vec<CheckpointSummary> =
            self.inner.iter().map(|entry| entry.value().summary()).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use quill_core::workflow::engine::{EngineError, EngineOptions, ResumeOutcome, WorkflowEngine};
    use quill_core::workflow::feedback::ScriptedReviewer;
    use quill_core::workflow::generation::{ContentGenerator, GenerationRequest};
    use quill_types::checkpoint::WorkflowStep;
    use quill_types::conversation::{ConversationState, Draft};
    use quill_types::llm::LlmError;

    const TOPIC: &str = "The future of AI in healthcare";

    /// Fails with the scripted messages first, then always succeeds.
    struct FlakyGenerator {
        failures: Mutex<VecDeque<&'static str>>,
    }

    impl FlakyGenerator {
        fn failing(failures: Vec<&'static str>) -> Self {
            Self {
                failures: Mutex::new(failures.into()),
            }
        }
    }

    impl ContentGenerator for FlakyGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
            let failure = self.failures.lock().unwrap().pop_front();
            match failure {
                Some(message) => Err(LlmError::Provider {
                    message: message.to_string(),
                }),
                None => Ok(format!("Post about {} ({})", request.topic, request.latest_feedback)),
            }
        }
    }

    fn checkpoint(thread_id: &str, drafts: usize) -> Checkpoint {
        let mut state = ConversationState::new(TOPIC);
        for i in 0..drafts {
            state.push_draft(Draft::new(format!("draft {i}")));
        }
        Checkpoint::new(thread_id, state, WorkflowStep::AwaitingFeedback)
    }

    #[tokio::test]
    async fn put_then_get_same_thread() {
        let store = InMemoryCheckpointStore::new();
        let cp = checkpoint("t-1", 1);

        store.put(cp.clone()).await.unwrap();

        assert_eq!(store.get("t-1").await.unwrap(), Some(cp));
        assert!(store.get("t-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_supersedes_previous_checkpoint() {
        let store = InMemoryCheckpointStore::new();
        store.put(checkpoint("t-1", 1)).await.unwrap();
        let newer = checkpoint("t-1", 2);
        store.put(newer.clone()).await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.get("t-1").await.unwrap().unwrap();
        assert_eq!(stored.id, newer.id);
        assert_eq!(stored.cycle, 2);
    }

    #[tokio::test]
    async fn repeated_get_returns_identical_snapshots() {
        let store = InMemoryCheckpointStore::new();
        store.put(checkpoint("t-1", 3)).await.unwrap();

        let first = store.get("t-1").await.unwrap();
        let second = store.get("t-1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn clones_share_the_same_map() {
        let store = InMemoryCheckpointStore::new();
        let view = store.clone();
        store.put(checkpoint("t-1", 1)).await.unwrap();
        assert!(view.get("t-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_is_most_recent_first() {
        let store = InMemoryCheckpointStore::new();
        store.put(checkpoint("older", 1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.put(checkpoint("newer", 1)).await.unwrap();

        let listed = store.list().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|s| s.thread_id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }

    // -------------------------------------------------------------------
    // End-to-end runs through the engine
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn end_to_end_shorter_then_done() {
        let store = InMemoryCheckpointStore::new();
        let engine = WorkflowEngine::new(
            FlakyGenerator::failing(vec![]),
            store.clone(),
            EngineOptions::default(),
        );
        let reviewer = ScriptedReviewer::new(["Make it shorter", "done"]);

        let state = engine
            .run(&reviewer, ConversationState::new(TOPIC), "linkedin")
            .await
            .unwrap();

        assert_eq!(state.drafts().len(), 2);
        assert_eq!(state.feedback().len(), 1);
        assert_eq!(state.feedback()[0].content, "Make it shorter");
        assert!(state.drafts()[1].content.contains("Make it shorter"));

        let stored = store.get("linkedin").await.unwrap().unwrap();
        assert_eq!(stored.pending_step, WorkflowStep::Terminated);
    }

    #[tokio::test]
    async fn end_to_end_two_failures_then_success() {
        let store = InMemoryCheckpointStore::new();
        let engine = WorkflowEngine::new(
            FlakyGenerator::failing(vec!["HTTP 529", "HTTP 529"]),
            store.clone(),
            EngineOptions::default(),
        );

        let suspension = engine.start(ConversationState::new(TOPIC), "t").await.unwrap();

        assert_eq!(suspension.cycle, 1);
        let stored = store.get("t").await.unwrap().unwrap();
        assert_eq!(stored.state.drafts().len(), 1);
        assert_eq!(stored.pending_step, WorkflowStep::AwaitingFeedback);
    }

    #[tokio::test]
    async fn end_to_end_three_failures_leave_store_untouched() {
        let store = InMemoryCheckpointStore::new();
        store.put(checkpoint("other-thread", 1)).await.unwrap();
        let engine = WorkflowEngine::new(
            FlakyGenerator::failing(vec!["a", "b", "c"]),
            store.clone(),
            EngineOptions::default(),
        );

        let err = engine
            .start(ConversationState::new(TOPIC), "t")
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Generation(_)));
        assert!(store.get("t").await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn resume_across_engine_instances_sharing_a_store() {
        let store = InMemoryCheckpointStore::new();
        let first = WorkflowEngine::new(
            FlakyGenerator::failing(vec![]),
            store.clone(),
            EngineOptions::default(),
        );
        first.start(ConversationState::new(TOPIC), "t").await.unwrap();
        drop(first);

        let second = WorkflowEngine::new(
            FlakyGenerator::failing(vec![]),
            store.clone(),
            EngineOptions::default(),
        );
        match second.resume("t", "add a statistic").await.unwrap() {
            ResumeOutcome::Suspended(s) => assert_eq!(s.cycle, 2),
            other => panic!("expected Suspended, got {other:?}"),
        }
        match second.resume("t", "DONE").await.unwrap() {
            ResumeOutcome::Terminated(state) => {
                assert_eq!(state.drafts().len(), 2);
                assert_eq!(state.feedback().len(), 1);
            }
            other => panic!("expected Terminated, got {other:?}"),
        }
    }
}
