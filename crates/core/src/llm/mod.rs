//! Inference service clients
//!
//! This module provides the `LlmClient` abstraction used by the completion
//! engine and the optimization advisor, plus HTTP clients for Ollama and the
//! Anthropic Messages API.
//!
//! # Example
//!
//! ```ignore
//! use bom_reconcile_core::llm::{LlmConfig, build_client};
//!
//! let config = LlmConfig::with_ollama("llama3.2").with_timeout(60);
//! let client = build_client(&config)?.expect("inference enabled");
//!
//! let text = client.complete("...").await?;
//! ```
//!
//! # Feature Flags
//!
//! - `llm-online`: Enable the HTTP clients (reqwest)
//!
//! Without it, clients can be constructed but every call returns
//! [`LlmError::FeatureNotAvailable`].

pub mod anthropic;
pub mod client;
pub mod config;
pub mod error;
pub mod ollama;
pub mod prompt;

// Re-export main types
pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use config::{LlmConfig, LlmMode};
pub use error::{LlmError, LlmResult};
pub use ollama::OllamaClient;
pub use prompt::{
    CompletionPromptContext, PromptField, build_advisor_prompt, estimate_tokens, extract_json,
    extract_json_array,
};

#[cfg(test)]
pub use client::MockLlmClient;

/// Build the client selected by the configuration
///
/// Returns `Ok(None)` when no inference service is configured. For the
/// Anthropic backend the API key is read from the configured environment
/// variable.
pub fn build_client(config: &LlmConfig) -> LlmResult<Option<Box<dyn LlmClient>>> {
    match &config.backend {
        LlmMode::None => Ok(None),
        LlmMode::Ollama { url, model } => {
            tracing::info!(url = %url, model = %model, "Using Ollama inference service");
            let client = OllamaClient::new(url.clone(), model.clone())
                .with_timeout(config.timeout_seconds)
                .with_max_context(config.max_context_tokens)
                .with_max_output(config.max_output_tokens)
                .with_temperature(config.temperature);
            Ok(Some(Box::new(client)))
        }
        LlmMode::Anthropic {
            model,
            api_key_env,
            base_url,
        } => {
            tracing::info!(model = %model, "Using Anthropic inference service");
            let client = AnthropicClient::from_env(model.clone(), api_key_env)?
                .with_base_url(base_url.clone())
                .with_timeout(config.timeout_seconds)
                .with_max_output(config.max_output_tokens)
                .with_temperature(config.temperature);
            Ok(Some(Box::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_none() {
        assert!(build_client(&LlmConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_build_client_ollama() {
        let client = build_client(&LlmConfig::with_ollama("llama3.2"))
            .unwrap()
            .unwrap();
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[test]
    fn test_build_client_anthropic_without_key() {
        let config = LlmConfig {
            backend: LlmMode::Anthropic {
                model: "m".to_string(),
                api_key_env: "BOMR_TEST_UNSET_KEY".to_string(),
                base_url: config::DEFAULT_ANTHROPIC_URL.to_string(),
            },
            ..Default::default()
        };
        assert!(matches!(build_client(&config), Err(LlmError::ConfigError(_))));
    }
}
