//! Service layer module
//!
//! Contains the LLM client port and the chat service that implements it on top of a completion provider

pub mod chat;
pub mod llm;

pub use chat::{classify_upstream_error, collect_response, ChatService};
pub use llm::{EventStream, LlmClient};
