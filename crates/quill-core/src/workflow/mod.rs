//! Workflow engine core: generation, review, and durable checkpointing.
//!
//! - `generation` -- generator port and the retrying generation step
//! - `retry` -- stateless retry policy for failed generation attempts
//! - `feedback` -- reviewer port and the feedback (suspension) step
//! - `checkpoint` -- checkpoint manager wrapping a `CheckpointStore`
//! - `engine` -- state machine, suspend/resume protocol, and run loop

pub mod checkpoint;
pub mod engine;
pub mod feedback;
pub mod generation;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;
