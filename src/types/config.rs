//! Configuration types for the QA service.

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_BATCH_CONCURRENCY, DEFAULT_MAX_PROMPT_TOKENS, DEFAULT_PORT, DEFAULT_SOURCE_REPOSITORY,
};

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen port
    pub port: u16,

    /// Label stamped on generated records
    pub source_repository: String,

    /// Prompts above this many tokens are not sent to the generator
    pub max_prompt_tokens: usize,

    /// Maximum in-flight generations for batch requests
    pub batch_concurrency: usize,

    /// Generation backend; `None` selects the deterministic stand-in
    pub generation: Option<GenerationConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            source_repository: DEFAULT_SOURCE_REPOSITORY.to_string(),
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            generation: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            source_repository: std::env::var("SOURCE_REPOSITORY")
                .unwrap_or_else(|_| DEFAULT_SOURCE_REPOSITORY.to_string()),
            max_prompt_tokens: std::env::var("MAX_PROMPT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_PROMPT_TOKENS),
            batch_concurrency: std::env::var("BATCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_BATCH_CONCURRENCY),
            generation: std::env::var("GENERATION_SERVICE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(GenerationConfig::from_env_with_url),
        }
    }
}

/// Settings for an OpenAI-compatible generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL, e.g. `http://localhost:11434/v1`
    pub base_url: String,

    /// Model name sent with each request
    pub model: String,

    /// Bearer token, if the backend wants one
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "qwen2.5-coder".to_string(),
            api_key: None,
            timeout_secs: 120,
            max_retries: 2,
            temperature: 0.2,
        }
    }
}

impl GenerationConfig {
    fn from_env_with_url(base_url: String) -> Self {
        let defaults = Self::default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: std::env::var("GENERATION_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("GENERATION_API_KEY").ok(),
            timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_retries: std::env::var("GENERATION_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            temperature: std::env::var("GENERATION_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }

    /// Create a config pointing at the given base URL.
    pub fn with_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}
