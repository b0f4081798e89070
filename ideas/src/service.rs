//! Idea service: the five text operations the board asks of an AI.
//!
//! DESIGN
//! ======
//! [`IdeaService`] is the narrow async seam between the board and whatever
//! produces text. Every operation is independently fallible; callers decide
//! how to degrade. [`LlmIdeaService`] implements it over any [`LlmChat`]:
//! list operations ask for a JSON array of strings and fall back to reading
//! one item per bullet line when the model ignores the format.
//!
//! The trait is `?Send`: sessions run on a single-threaded executor and hold
//! the service behind an `Rc`.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm::types::{LlmError, Message};
use crate::llm::{LlmChat, LlmClient};

const DEFAULT_IDEAS_MAX_TOKENS: u32 = 1024;
const DEFAULT_IDEAS_COUNT: usize = 5;

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn ideas_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| env_parse("IDEAS_MAX_TOKENS", DEFAULT_IDEAS_MAX_TOKENS))
}

fn ideas_count() -> usize {
    static VALUE: OnceLock<usize> = OnceLock::new();
    *VALUE.get_or_init(|| env_parse("IDEAS_COUNT", DEFAULT_IDEAS_COUNT))
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdeaError {
    #[error("LLM not configured: {0}")]
    NotConfigured(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("empty response")]
    EmptyResponse,
}

/// Text operations backing generation, transform, merge, outline and expansion.
#[async_trait(?Send)]
pub trait IdeaService {
    /// Short ideas about `topic`, one per note.
    async fn generate_ideas(&self, topic: &str) -> Result<Vec<String>, IdeaError>;

    /// Rewrite each of `contents` according to `instruction`.
    async fn transform_notes(&self, contents: &[String], instruction: &str) -> Result<Vec<String>, IdeaError>;

    /// Combine two notes into one.
    async fn merge_notes(&self, content_a: &str, content_b: &str) -> Result<String, IdeaError>;

    /// Restructure a note as an outline.
    async fn format_to_outline(&self, content: &str) -> Result<String, IdeaError>;

    /// Ideas that follow from `context`.
    async fn generate_related_notes(&self, context: &str) -> Result<Vec<String>, IdeaError>;
}

// =============================================================================
// LLM IMPLEMENTATION
// =============================================================================

const LIST_SYSTEM: &str = "You write content for sticky notes on an idea board. \
Each note is one short, self-contained idea of at most a dozen words. \
Reply with a JSON array of strings and nothing else.";

const TEXT_SYSTEM: &str = "You edit content for sticky notes on an idea board. \
Keep the result short. Reply with the note text only, without quotes or commentary.";

/// [`IdeaService`] backed by a chat model.
pub struct LlmIdeaService {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
    count: usize,
}

impl LlmIdeaService {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>) -> Self {
        Self { llm, max_tokens: ideas_max_tokens(), count: ideas_count() }
    }

    /// Build from `LLM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`IdeaError::NotConfigured`] if the LLM client can't be built.
    pub fn from_env() -> Result<Self, IdeaError> {
        let client = LlmClient::from_env().map_err(|e| IdeaError::NotConfigured(e.to_string()))?;
        info!(model = client.model(), "ideas: llm configured");
        Ok(Self::new(Arc::new(client)))
    }

    /// Override how many ideas generation asks for.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    async fn ask(&self, system: &str, prompt: String) -> Result<String, IdeaError> {
        let response = self.llm.chat(self.max_tokens, system, &[Message::user(prompt)]).await?;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop = ?response.stop,
            "ideas: llm response"
        );
        if response.truncated() {
            warn!(max_tokens = self.max_tokens, "ideas: response hit the token limit");
        }
        let text = response.text;
        if text.trim().is_empty() {
            return Err(IdeaError::EmptyResponse);
        }
        Ok(text)
    }

    async fn ask_list(&self, prompt: String) -> Result<Vec<String>, IdeaError> {
        let text = self.ask(LIST_SYSTEM, prompt).await?;
        let items = parse_list(&text);
        if items.is_empty() {
            warn!(len = text.len(), "ideas: response held no list items");
            return Err(IdeaError::EmptyResponse);
        }
        Ok(items)
    }

    async fn ask_text(&self, prompt: String) -> Result<String, IdeaError> {
        let text = self.ask(TEXT_SYSTEM, prompt).await?;
        Ok(strip_code_fence(&text).trim().to_string())
    }
}

#[async_trait(?Send)]
impl IdeaService for LlmIdeaService {
    async fn generate_ideas(&self, topic: &str) -> Result<Vec<String>, IdeaError> {
        info!(topic_len = topic.len(), count = self.count, "ideas: generate");
        self.ask_list(format!(
            "Give {} distinct ideas about the topic below.\n<topic>{topic}</topic>",
            self.count
        ))
        .await
    }

    async fn transform_notes(&self, contents: &[String], instruction: &str) -> Result<Vec<String>, IdeaError> {
        info!(count = contents.len(), "ideas: transform");
        self.ask_list(format!(
            "Apply the instruction to these notes and return the resulting notes.\n\
             <instruction>{instruction}</instruction>\n<notes>{}</notes>",
            numbered(contents)
        ))
        .await
    }

    async fn merge_notes(&self, content_a: &str, content_b: &str) -> Result<String, IdeaError> {
        info!("ideas: merge");
        self.ask_text(format!(
            "Combine these two notes into a single note that keeps the substance of both.\n\
             <note>{content_a}</note>\n<note>{content_b}</note>"
        ))
        .await
    }

    async fn format_to_outline(&self, content: &str) -> Result<String, IdeaError> {
        info!("ideas: outline");
        self.ask_text(format!(
            "Rewrite this note as a short outline: a title line, then one '- ' bullet per point.\n\
             <note>{content}</note>"
        ))
        .await
    }

    async fn generate_related_notes(&self, context: &str) -> Result<Vec<String>, IdeaError> {
        info!("ideas: expand");
        self.ask_list(format!(
            "Suggest {} ideas that build on this note.\n<note>{context}</note>",
            self.count
        ))
        .await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn numbered(contents: &[String]) -> String {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Items of a model reply: the first JSON string array found in it, or one
/// item per non-empty line with bullet or numbering markers removed.
pub(crate) fn parse_list(text: &str) -> Vec<String> {
    let body = strip_code_fence(text);
    if let (Some(start), Some(end)) = (body.find('['), body.rfind(']')) {
        if start < end {
            if let Ok(items) = serde_json::from_str::<Vec<String>>(&body[start..=end]) {
                return clean(items);
            }
        }
    }
    clean(body.lines().map(strip_marker).map(str::to_string).collect())
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest;
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest;
        }
    }
    line
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
