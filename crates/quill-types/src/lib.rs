//! Shared domain types for Quill.
//!
//! This crate contains the value types threaded through the refinement
//! workflow: conversation state, checkpoints, LLM request/response shapes,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod checkpoint;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
