//! LLM client trait and implementations
//!
//! This module defines the `LlmClient` trait for interacting with LLMs.
//! HTTP implementations live in [`super::ollama`] and [`super::anthropic`].

use async_trait::async_trait;

#[cfg(test)]
use super::error::LlmError;
use super::error::LlmResult;

/// Trait for LLM client implementations
///
/// This trait provides a unified interface for different LLM backends so the
/// completion engine and the advisor can work with any of them.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt
    ///
    /// # Arguments
    /// * `prompt` - The input prompt for the LLM
    ///
    /// # Returns
    /// The generated text response
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Get the maximum context size in tokens
    fn max_tokens(&self) -> usize;

    /// Check if the client is ready and connected
    async fn is_ready(&self) -> bool;
}

#[async_trait]
impl<C: LlmClient + ?Sized> LlmClient for Box<C> {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        (**self).complete(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn max_tokens(&self) -> usize {
        (**self).max_tokens()
    }

    async fn is_ready(&self) -> bool {
        (**self).is_ready().await
    }
}

/// A mock LLM client for testing
///
/// Scripted responses are returned in order; once they run out the default
/// response is used. Every prompt is recorded.
#[cfg(test)]
pub struct MockLlmClient {
    response: String,
    model: String,
    max_tokens: usize,
    should_fail: bool,
    script: std::sync::Mutex<std::collections::VecDeque<LlmResult<String>>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockLlmClient {
    /// Create a new mock client that returns the given response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            model: "mock-model".to_string(),
            max_tokens: 4096,
            should_fail: false,
            script: Default::default(),
            prompts: Default::default(),
        }
    }

    /// Create a mock client that fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Create a mock client that plays back a sequence of results
    pub fn scripted(results: Vec<LlmResult<String>>) -> Self {
        let client = Self::new("");
        *client.script.lock().unwrap() = results.into();
        client
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls made
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        if self.should_fail {
            Err(LlmError::ConnectionError("Mock failure".to_string()))
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    async fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_success() {
        let client = MockLlmClient::new("Test response");
        assert!(client.is_ready().await);
        assert_eq!(client.model_name(), "mock-model");
        assert_eq!(client.max_tokens(), 4096);

        let response = client.complete("Test prompt").await.unwrap();
        assert_eq!(response, "Test response");
        assert_eq!(client.prompts(), vec!["Test prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_client_failure() {
        let client = MockLlmClient::failing();
        assert!(!client.is_ready().await);

        let result = client.complete("Test prompt").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_script() {
        let client = MockLlmClient::scripted(vec![
            Err(LlmError::Timeout(5)),
            Ok("second".to_string()),
        ]);

        assert!(matches!(client.complete("a").await, Err(LlmError::Timeout(5))));
        assert_eq!(client.complete("b").await.unwrap(), "second");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_boxed_client() {
        let client: Box<dyn LlmClient> = Box::new(MockLlmClient::new("boxed"));
        assert_eq!(client.complete("x").await.unwrap(), "boxed");
        assert_eq!(client.model_name(), "mock-model");
    }
}
