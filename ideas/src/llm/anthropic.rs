//! Anthropic Messages API (`/v1/messages`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::http;
use super::types::{ChatResponse, LlmChat, LlmError, Message, StopReason, Usage};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, model: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        Ok(Self { http: http::build_client(timeouts)?, api_key, model })
    }
}

#[async_trait]
impl LlmChat for AnthropicClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let system = Some(system).filter(|s| !s.trim().is_empty());
        let body = WireRequest { model: &self.model, max_tokens, system, messages };
        let request = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);
        parse_response(&http::send(request).await?)
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<WireBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Decode a Messages API body. Only text blocks contribute to the answer.
pub(crate) fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let wire: WireResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let text = wire
        .content
        .into_iter()
        .filter_map(|block| match block {
            WireBlock::Text { text } => Some(text),
            WireBlock::Other => None,
        })
        .collect::<String>();
    let stop = match wire.stop_reason.as_deref() {
        Some("max_tokens") => StopReason::Truncated,
        _ => StopReason::Complete,
    };
    Ok(ChatResponse { text, model: wire.model, stop, usage: wire.usage })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
