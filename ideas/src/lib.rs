//! Asynchronous half of the idea board.
//!
//! [`service::IdeaService`] is the contract for the AI text operations and
//! [`service::LlmIdeaService`] its LLM-backed implementation over the
//! provider adapters in [`llm`]. [`session::Session`] wires a service to a
//! [`canvas::engine::Engine`] and runs the generate, transform, expand,
//! outline and merge flows against it.

pub mod llm;
pub mod service;
pub mod session;
