//! Anthropic Claude provider.
//!
//! [`AnthropicProvider`] implements
//! [`LlmProvider`](quill_core::llm::provider::LlmProvider) on top of the
//! Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
