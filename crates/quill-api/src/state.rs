//! Application state wiring config, provider and engine together.
//!
//! The engine is generic over its generator and store; AppState pins it to
//! the Anthropic-backed generator and the in-process checkpoint store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use quill_core::llm::generator::{GeneratorSettings, LlmContentGenerator};
use quill_core::workflow::engine::{EngineOptions, WorkflowEngine};
use quill_infra::config::{
    apply_env_overrides, default_config_path, load_config, resolve_api_key, resolve_data_dir,
};
use quill_infra::llm::anthropic::AnthropicProvider;
use quill_infra::llm::create_provider;
use quill_infra::memory::InMemoryCheckpointStore;
use quill_types::config::QuillConfig;

pub type ConcreteGenerator = LlmContentGenerator<AnthropicProvider>;

pub type ConcreteEngine = WorkflowEngine<ConcreteGenerator, InMemoryCheckpointStore>;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteEngine>,
    pub config: QuillConfig,
}

impl AppState {
    /// Load config (explicit path or `{data_dir}/config.toml`), resolve the
    /// API key, and wire the engine.
    pub async fn init(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.unwrap_or_else(|| default_config_path(&resolve_data_dir()));

        let mut config = load_config(&config_path).await;
        apply_env_overrides(&mut config);

        tracing::debug!(
            config = %config_path.display(),
            model = config.model.model.as_str(),
            max_attempts = config.workflow.max_attempts,
            "configuration loaded"
        );

        let api_key = resolve_api_key()?;
        let provider = create_provider(&config.model, api_key)
            .context("failed to initialize the generation provider")?;

        let generator = LlmContentGenerator::new(
            provider,
            GeneratorSettings {
                model: config.model.model.clone(),
                max_tokens: config.model.max_tokens,
                temperature: config.model.temperature,
            },
        );

        let engine = WorkflowEngine::new(
            generator,
            InMemoryCheckpointStore::new(),
            EngineOptions::from(&config.workflow),
        );

        Ok(Self {
            engine: Arc::new(engine),
            config,
        })
    }

    pub fn default_thread_id(&self) -> &str {
        &self.config.workflow.default_thread_id
    }
}
