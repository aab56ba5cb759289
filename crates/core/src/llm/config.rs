//! Configuration types for the inference service
//!
//! Selects which backend answers completion and advice prompts and how it
//! is called. API keys are never stored here; only the name of the
//! environment variable holding them.

use serde::{Deserialize, Serialize};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default Anthropic Messages API endpoint
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Default environment variable for the Anthropic API key
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Inference backend selection
///
/// - `None`: no inference service (completion and advice are skipped)
/// - `Ollama`: a locally hosted Ollama server
/// - `Anthropic`: the Anthropic Messages API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LlmMode {
    /// No inference service
    #[default]
    None,

    /// Ollama API
    Ollama {
        /// Ollama API URL (default: http://localhost:11434)
        #[serde(default = "default_ollama_url")]
        url: String,
        /// Model name (e.g., "llama3.2", "mistral")
        model: String,
    },

    /// Anthropic Messages API
    Anthropic {
        /// Model name
        model: String,
        /// Environment variable holding the API key
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        /// API base URL
        #[serde(default = "default_anthropic_url")]
        base_url: String,
    },
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_anthropic_url() -> String {
    DEFAULT_ANTHROPIC_URL.to_string()
}

impl LlmMode {
    /// Ollama mode with the default URL
    pub fn ollama(model: impl Into<String>) -> Self {
        LlmMode::Ollama {
            url: default_ollama_url(),
            model: model.into(),
        }
    }

    /// Anthropic mode reading the key from `ANTHROPIC_API_KEY`
    pub fn anthropic(model: impl Into<String>) -> Self {
        LlmMode::Anthropic {
            model: model.into(),
            api_key_env: default_api_key_env(),
            base_url: default_anthropic_url(),
        }
    }

    /// Check if an inference service is configured
    pub fn is_enabled(&self) -> bool {
        !matches!(self, LlmMode::None)
    }
}

/// Configuration for calls to the inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selection
    pub backend: LlmMode,

    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,

    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate per call
    pub max_output_tokens: usize,

    /// Maximum context tokens accepted by the model
    pub max_context_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmMode::None,
            timeout_seconds: 60,
            temperature: 0.1,
            max_output_tokens: 2000,
            max_context_tokens: 8192,
        }
    }
}

impl LlmConfig {
    /// Config for an Ollama model
    pub fn with_ollama(model: impl Into<String>) -> Self {
        Self {
            backend: LlmMode::ollama(model),
            ..Default::default()
        }
    }

    /// Config for an Anthropic model
    pub fn with_anthropic(model: impl Into<String>) -> Self {
        Self {
            backend: LlmMode::anthropic(model),
            ..Default::default()
        }
    }

    /// Set timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Check if an inference service is configured
    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }
}
