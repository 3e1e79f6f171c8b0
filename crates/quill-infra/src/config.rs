//! Configuration loading for Quill.
//!
//! Reads `config.toml` from the data directory (`~/.quill/` by default) or an
//! explicit path and deserializes it into [`QuillConfig`]. Falls back to
//! defaults when the file is missing or malformed, then applies environment
//! overrides.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use quill_types::config::QuillConfig;

pub const DATA_DIR_ENV: &str = "QUILL_DATA_DIR";
pub const MODEL_ENV: &str = "QUILL_MODEL";
pub const TEMPERATURE_ENV: &str = "QUILL_TEMPERATURE";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolve the data directory.
///
/// Priority:
/// 1. `QUILL_DATA_DIR` environment variable
/// 2. `~/.quill`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".quill");
    }

    PathBuf::from(".quill")
}

/// `{data_dir}/config.toml`.
pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Load `.env` from the working directory (or a parent), if present.
///
/// Returns the path that was loaded. Variables already set in the process
/// environment are not overwritten.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenv::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!("Failed to load .env: {err}");
            None
        }
    }
}

/// Load configuration from `path`.
///
/// - Missing file: [`QuillConfig::default()`].
/// - Unreadable or unparseable file: logs a warning and returns the default.
pub async fn load_config(path: &Path) -> QuillConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return QuillConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return QuillConfig::default();
        }
    };

    match toml::from_str::<QuillConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            QuillConfig::default()
        }
    }
}

/// Apply `QUILL_MODEL` / `QUILL_TEMPERATURE` from the process environment.
pub fn apply_env_overrides(config: &mut QuillConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` as the environment.
///
/// An unparseable temperature is ignored with a warning.
pub fn apply_overrides_from<F>(config: &mut QuillConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
        config.model.model = model.trim().to_string();
    }

    if let Some(raw) = lookup(TEMPERATURE_ENV) {
        match raw.trim().parse::<f64>() {
            Ok(t) if (0.0..=1.0).contains(&t) => config.model.temperature = t,
            _ => tracing::warn!("Ignoring {TEMPERATURE_ENV}={raw:?}: expected a number in 0.0..=1.0"),
        }
    }
}

/// Read the provider API key from `ANTHROPIC_API_KEY`.
pub fn resolve_api_key() -> Result<SecretString, ConfigError> {
    api_key_from(|key| std::env::var(key).ok())
}

pub fn api_key_from<F>(lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_ENV)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or(ConfigError::MissingApiKey { var: API_KEY_ENV })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set (export it or add it to .env)")]
    MissingApiKey { var: &'static str },
}
