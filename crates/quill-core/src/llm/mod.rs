//! LLM provider abstractions for Quill.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `LlmContentGenerator`: adapts a provider to the workflow's generator port

pub mod generator;
pub mod provider;
