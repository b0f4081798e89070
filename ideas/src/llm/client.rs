//! The configured provider behind one retrying handle.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::anthropic::AnthropicClient;
use super::config::{LlmConfig, LlmProviderKind, RetryPolicy};
use super::openai::OpenAiClient;
use super::types::{ChatResponse, LlmChat, LlmError, Message};

pub struct LlmClient {
    backend: Box<dyn LlmChat>,
    model: String,
    retry: RetryPolicy,
}

impl LlmClient {
    /// Build from `LLM_*` environment variables (see [`LlmConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the config is incomplete or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let backend: Box<dyn LlmChat> = match config.provider {
            LlmProviderKind::Anthropic => Box::new(AnthropicClient::new(config.api_key, config.model, config.timeouts)?),
            LlmProviderKind::OpenAi => Box::new(OpenAiClient::new(
                config.api_key,
                &config.openai_base_url,
                config.model,
                config.timeouts,
            )?),
        };
        Ok(Self::with_backend(backend, model, config.retry))
    }

    #[must_use]
    pub fn with_backend(backend: Box<dyn LlmChat>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        Self { backend, model: model.into(), retry }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.backend.chat(max_tokens, system, messages).await {
                Ok(response) => return Ok(response),
                Err(e) if e.retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(model = %self.model, attempt, error = %e, "llm: transient failure, retrying");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(e) => {
                    debug!(model = %self.model, attempt, error = %e, "llm: giving up");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
