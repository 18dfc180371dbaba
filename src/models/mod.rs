//! Data models module
//!
//! Defines the client-facing chat models and the upstream completion API wire format

pub mod chat;
pub mod openai;

pub use chat::{ChatRequest, ChatRequestPayload, ChatResponse, StreamEvent, StreamEventType};
