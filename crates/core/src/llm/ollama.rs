//! Ollama API client
//!
//! Talks to a locally hosted Ollama server. Completion prompts ask for JSON,
//! so requests set Ollama's `format: "json"` constrained decoding.
//!
//! # Example
//!
//! ```ignore
//! use bom_reconcile_core::llm::ollama::OllamaClient;
//!
//! let client = OllamaClient::new("http://localhost:11434", "llama3.2")
//!     .with_timeout(60);
//!
//! let response = client.complete("Fill in the missing BOM fields...").await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::LlmClient;
use super::error::{LlmError, LlmResult};

/// Ollama API client
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "llm-online"), allow(dead_code))]
pub struct OllamaClient {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to use
    model: String,
    /// Request timeout in seconds
    timeout_seconds: u64,
    /// Maximum context tokens
    max_context_tokens: usize,
    /// Maximum tokens to generate
    max_output_tokens: usize,
    /// Temperature for sampling
    temperature: f32,
    /// Ask the server for JSON output
    json_output: bool,
    /// HTTP client
    #[cfg(feature = "llm-online")]
    client: reqwest::Client,
}

/// Request body for Ollama generate endpoint
#[cfg(feature = "llm-online")]
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: GenerateOptions,
}

/// Options for generation
#[cfg(feature = "llm-online")]
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_ctx: usize,
    num_predict: usize,
}

/// Response from Ollama generate endpoint
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
}

/// Response from Ollama tags endpoint (list models)
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama3.2", "mistral")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_seconds: 60,
            max_context_tokens: 8192,
            max_output_tokens: 2000,
            temperature: 0.1,
            json_output: true,
            #[cfg(feature = "llm-online")]
            client: reqwest::Client::new(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the maximum context tokens
    pub fn with_max_context(mut self, tokens: usize) -> Self {
        self.max_context_tokens = tokens;
        self
    }

    /// Set the maximum tokens to generate
    pub fn with_max_output(mut self, tokens: usize) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Set the temperature for sampling
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Enable/disable JSON-constrained output
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(feature = "llm-online")]
    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: self.json_output.then_some("json"),
            options: GenerateOptions {
                temperature: self.temperature,
                num_ctx: self.max_context_tokens,
                num_predict: self.max_output_tokens,
            },
        }
    }

    /// List available models on the Ollama server
    #[cfg(feature = "llm-online")]
    pub async fn list_models(&self) -> LlmResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ServiceError {
                status: response.status().as_u16(),
                message: "failed to list models".to_string(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// List available models (stub for when feature is disabled)
    #[cfg(not(feature = "llm-online"))]
    pub async fn list_models(&self) -> LlmResult<Vec<String>> {
        Err(LlmError::FeatureNotAvailable(
            "Ollama client".to_string(),
            "llm-online".to_string(),
        ))
    }

    /// Check if the configured model is available
    pub async fn model_available(&self) -> LlmResult<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.starts_with(&self.model)))
    }
}

#[cfg(feature = "llm-online")]
#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let url = format!("{}/api/generate", self.base_url);

        tracing::debug!(url = %url, model = %self.model, "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&self.request(prompt))
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    LlmError::ConnectionError(format!(
                        "Failed to connect to Ollama at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    LlmError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited(60));
            }
            let message = response.text().await.unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(LlmError::ModelError(format!(
                    "model '{}' not found: {}",
                    self.model, message
                )));
            }
            return Err(LlmError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if let Some(duration) = gen_response.total_duration {
            tracing::debug!(
                duration_ms = duration / 1_000_000,
                prompt_tokens = gen_response.prompt_eval_count.unwrap_or(0),
                completion_tokens = gen_response.eval_count.unwrap_or(0),
                "Ollama completion finished"
            );
        }

        Ok(gen_response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> usize {
        self.max_context_tokens
    }

    async fn is_ready(&self) -> bool {
        self.list_models().await.is_ok()
    }
}

#[cfg(not(feature = "llm-online"))]
#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, _prompt: &str) -> LlmResult<String> {
        Err(LlmError::FeatureNotAvailable(
            "Ollama client".to_string(),
            "llm-online".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> usize {
        self.max_context_tokens
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_new() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2");
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.2");
        assert_eq!(client.max_tokens(), 8192);
    }

    #[test]
    fn test_ollama_client_builder() {
        let client = OllamaClient::new("http://remote:11434", "mistral")
            .with_timeout(30)
            .with_max_context(4096)
            .with_max_output(500)
            .with_temperature(5.0);

        assert_eq!(client.timeout_seconds, 30);
        assert_eq!(client.max_context_tokens, 4096);
        assert_eq!(client.max_output_tokens, 500);
        assert!((client.temperature - 2.0).abs() < f32::EPSILON);
    }

    #[cfg(feature = "llm-online")]
    #[test]
    fn test_generate_request_serialize() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2");
        let json = serde_json::to_value(client.request("Fill gaps")).unwrap();

        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["prompt"], "Fill gaps");
        assert_eq!(json["format"], "json");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);

        let plain = client.clone().with_json_output(false);
        let json = serde_json::to_value(plain.request("x")).unwrap();
        assert!(json.get("format").is_none());
    }

    #[test]
    fn test_generate_response_deserialize() {
        let json = r#"{
            "response": "{\"rows\": []}",
            "done": true,
            "total_duration": 1500000000,
            "prompt_eval_count": 50,
            "eval_count": 100
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response, "{\"rows\": []}");
        assert!(response.done);
        assert_eq!(response.eval_count, Some(100));
    }
}
