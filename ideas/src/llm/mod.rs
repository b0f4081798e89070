//! Chat model access for the idea service.
//!
//! `LLM_PROVIDER` picks Anthropic or an OpenAI-compatible server; both sit
//! behind [`LlmChat`]. [`LlmClient`] wraps the chosen provider and retries
//! transient failures.

pub mod anthropic;
pub mod client;
pub mod config;
mod http;
pub mod openai;
pub mod types;

pub use client::LlmClient;
pub use types::{ChatResponse, LlmChat, LlmError, Message};
