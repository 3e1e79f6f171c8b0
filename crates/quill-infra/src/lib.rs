//! Infrastructure layer for Quill.
//!
//! Contains implementations of the port traits defined in `quill-core`:
//! the in-process checkpoint store, the Anthropic LLM provider, and
//! configuration loading from `config.toml` and the environment.

pub mod config;
pub mod llm;
pub mod memory;
