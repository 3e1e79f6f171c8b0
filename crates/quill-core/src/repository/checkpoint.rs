//! Checkpoint store trait definition.
//!
//! Defines the storage interface for conversation checkpoints: one entry per
//! thread identity, each `put` superseding the previous one.

use std::future::Future;
use std::sync::Arc;

use quill_types::checkpoint::{Checkpoint, CheckpointSummary};
use quill_types::error::RepositoryError;

/// Persistence interface for workflow checkpoints.
///
/// Implementations must be sequentially consistent per key: once `put`
/// resolves, a `get` for the same `thread_id` observes that checkpoint.
/// No ordering is required across different thread identities.
///
/// Uses RPITIT (return position `impl Trait` in traits) consistent with
/// all async traits in this project.
pub trait CheckpointStore: Send + Sync {
    /// Store a checkpoint, replacing any existing one for its `thread_id`.
    fn put(&self, checkpoint: Checkpoint) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Load the latest checkpoint for a thread.
    ///
    /// Returns `None` if nothing has been stored for `thread_id`.
    fn get(
        &self,
        thread_id: &str,
    ) -> impl Future<Output = Result<Option<Checkpoint>, RepositoryError>> + Send;

    /// List all stored checkpoints as lightweight summaries.
    ///
    /// Ordered by `updated_at` descending (most recently touched first).
    fn list(&self) -> impl Future<Output = Result<Vec<CheckpointSummary>, RepositoryError>> + Send;
}

impl<T: CheckpointStore> CheckpointStore for Arc<T> {
    fn put(&self, checkpoint: Checkpoint) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        (**self).put(checkpoint)
    }

    fn get(
        &self,
        thread_id: &str,
    ) -> impl Future<Output = Result<Option<Checkpoint>, RepositoryError>> + Send {
        (**self).get(thread_id)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<CheckpointSummary>, RepositoryError>> + Send {
        (**self).list()
    }
}
