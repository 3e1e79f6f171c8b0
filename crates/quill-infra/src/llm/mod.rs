//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`](quill_core::llm::provider::LlmProvider)
//! trait defined in `quill-core`, plus a factory ([`create_provider`]) that
//! builds the configured one.

pub mod anthropic;

use secrecy::SecretString;

use quill_types::config::ModelConfig;
use quill_types::llm::{LlmError, ProviderType};

use self::anthropic::AnthropicProvider;

/// Build the provider named by `config`.
pub fn create_provider(
    config: &ModelConfig,
    api_key: SecretString,
) -> Result<AnthropicProvider, LlmError> {
    match config.provider {
        ProviderType::Anthropic => {
            let provider = AnthropicProvider::new(api_key)?;
            Ok(match config.base_url.as_deref() {
                Some(url) => provider.with_base_url(url),
                None => provider,
            })
        }
    }
}
