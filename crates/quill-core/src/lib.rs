//! Workflow engine and port trait definitions for Quill.
//!
//! This crate defines the "ports" (generator, reviewer, checkpoint store)
//! that the infrastructure layer implements, and the engine that drives a
//! conversation through them. It depends only on `quill-types` -- never on
//! `quill-infra` or any network/IO crate.

pub mod llm;
pub mod repository;
pub mod workflow;
