//! LLM client port
//!
//! The handlers only see this trait, never a concrete provider.

use crate::models::chat::{ChatRequest, StreamEvent};
use futures::Stream;
use std::pin::Pin;

/// Lazily produced sequence of stream events for one request
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'static>>;

/// Streams an answer for a chat request
///
/// The returned stream yields `start`, zero or more `delta` events and then
/// exactly one `stop` or `error`. It is consumed once; dropping it cancels the
/// work behind it.
pub trait LlmClient: Send + Sync {
    fn stream_response(&self, request: ChatRequest) -> EventStream;
}
