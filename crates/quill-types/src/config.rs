//! Configuration types for Quill.
//!
//! `QuillConfig` represents the top-level `config.toml` that controls the
//! generation backend and workflow behaviour. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Thread identity used when the caller does not supply one.
pub const DEFAULT_THREAD_ID: &str = "linkedin_multi_conversation_thread";

/// Prompt shown to the reviewer at every suspension.
pub const DEFAULT_REVIEW_PROMPT: &str =
    "Please provide your feedback on the generated post (or type 'done' to finish): ";

/// Top-level configuration, loaded from `~/.quill/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Override for the provider's API base URL (proxies, testing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_provider() -> ProviderType {
    ProviderType::Anthropic
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: None,
        }
    }
}

/// How an empty or whitespace-only reviewer response is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFeedbackPolicy {
    /// Store it as ordinary feedback and regenerate.
    #[default]
    Accept,
    /// Reject it without touching stored state.
    Reject,
}

/// Workflow engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Total generation attempts per cycle (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_thread_id")]
    pub default_thread_id: String,

    #[serde(default = "default_review_prompt")]
    pub review_prompt: String,

    #[serde(default)]
    pub empty_feedback: EmptyFeedbackPolicy,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_thread_id() -> String {
    DEFAULT_THREAD_ID.to_string()
}

fn default_review_prompt() -> String {
    DEFAULT_REVIEW_PROMPT.to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            default_thread_id: default_thread_id(),
            review_prompt: default_review_prompt(),
            empty_feedback: EmptyFeedbackPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = QuillConfig::default();
        assert_eq!(config.model.provider, ProviderType::Anthropic);
        assert!((config.model.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.workflow.max_attempts, 3);
        assert_eq!(config.workflow.default_thread_id, DEFAULT_THREAD_ID);
        assert_eq!(config.workflow.empty_feedback, EmptyFeedbackPolicy::Accept);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: QuillConfig = toml::from_str("").unwrap();
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.workflow.review_prompt, DEFAULT_REVIEW_PROMPT);
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[model]
model = "claude-haiku-3-5-20250514"
temperature = 0.2

[workflow]
max_attempts = 5
empty_feedback = "reject"
"#;
        let config: QuillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.model, "claude-haiku-3-5-20250514");
        assert!((config.model.temperature - 0.2).abs() < f64::EPSILON);
        // Unset fields keep their defaults.
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.workflow.max_attempts, 5);
        assert_eq!(config.workflow.empty_feedback, EmptyFeedbackPolicy::Reject);
        assert_eq!(config.workflow.default_thread_id, DEFAULT_THREAD_ID);
    }
}
