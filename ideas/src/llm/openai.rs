//! OpenAI-compatible chat completions.
//!
//! Any server exposing `{base_url}/chat/completions` works, including local
//! model runners.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::http;
use super::types::{ChatResponse, LlmChat, LlmError, Message, StopReason, Usage};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: &str, model: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self { http: http::build_client(timeouts)?, api_key, endpoint, model })
    }
}

#[async_trait]
impl LlmChat for OpenAiClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let body = WireRequest { model: &self.model, max_tokens, messages: wire_messages(system, messages) };
        let request = self.http.post(&self.endpoint).bearer_auth(&self.api_key).json(&body);
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
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// The system prompt travels as a leading `system` message. Blank turns are dropped.
fn wire_messages<'a>(system: &'a str, messages: &'a [Message]) -> Vec<WireMessage<'a>> {
    let system = Some(WireMessage { role: "system", content: system }).filter(|m| !m.content.trim().is_empty());
    system
        .into_iter()
        .chain(
            messages
                .iter()
                .filter(|m| !m.content.is_empty())
                .map(|m| WireMessage { role: m.role.as_str(), content: &m.content }),
        )
        .collect()
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Decode a chat completions body, reading only the first choice.
pub(crate) fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let wire: WireResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let choice = wire
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ApiParse("chat completions: no choices".into()))?;
    let stop = match choice.finish_reason.as_deref() {
        Some("length") => StopReason::Truncated,
        _ => StopReason::Complete,
    };
    let usage = wire.usage.map_or_else(Usage::default, |u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });
    Ok(ChatResponse { text: choice.message.content.unwrap_or_default(), model: wire.model, stop, usage })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
