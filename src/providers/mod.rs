//! Provider module
//!
//! Defines the upstream completion provider trait and its OpenAI-compatible implementation

pub mod openai;

use crate::models::openai::{CompletionChunk, CompletionRequest};
use crate::utils::error::UpstreamError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of upstream chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk, UpstreamError>> + Send + 'static>>;

/// Upstream streaming chat completion API
///
/// Dropping the returned stream must release the underlying connection.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Open a streaming chat completion
    async fn chat_stream(&self, request: CompletionRequest) -> Result<ChunkStream, UpstreamError>;
}

pub use openai::OpenAICompatibleProvider;
