//! OpenAI-compatible provider implementation
//!
//! Talks to any `/chat/completions` endpoint that streams `data:` lines (Groq by default)

use super::{ChunkStream, CompletionProvider};
use crate::config::ProviderConfig;
use crate::models::openai::*;
use crate::utils::error::UpstreamError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{future, stream, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI-compatible provider
pub struct OpenAICompatibleProvider {
    stream_client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAICompatibleProvider {
    /// Create a provider from the upstream configuration
    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self> {
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout))
            .timeout(Duration::from_secs(config.stream_timeout))
            .user_agent(concat!("llm-extension-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create streaming HTTP client")?;

        Ok(Self {
            stream_client,
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
        })
    }

    /// Build the request URL
    fn build_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn chat_stream(&self, request: CompletionRequest) -> Result<ChunkStream, UpstreamError> {
        debug!("Sending streaming chat completion request for model: {}", request.model);

        let response = self
            .stream_client
            .post(self.build_url())
            .bearer_auth(&self.api_key)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&error_text) {
                Ok(error_response) => error_response.error.message,
                Err(_) => error_text,
            };
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // `None` marks the end of the body so a trailing unterminated line is flushed
        let mut decoder = SseDecoder::default();
        let chunks = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(future::ready(None)))
            .map(move |bytes| match bytes {
                Some(Ok(bytes)) => stream::iter(decoder.feed(&bytes)),
                Some(Err(e)) => stream::iter(vec![Err(UpstreamError::from(e))]),
                None => stream::iter(decoder.finish()),
            })
            .flatten()
            .take_while(|item| future::ready(!matches!(item, Ok(SseData::Done))))
            .filter_map(|item| {
                future::ready(match item {
                    Ok(SseData::Chunk(chunk)) => Some(check_chunk(chunk)),
                    Ok(SseData::Done) => None,
                    Err(e) => Some(Err(e)),
                })
            });

        Ok(Box::pin(chunks))
    }
}

/// Errors can arrive as an `error` object inside an otherwise normal `data:` line
fn check_chunk(chunk: CompletionChunk) -> Result<CompletionChunk, UpstreamError> {
    match chunk.error {
        Some(error) => Err(UpstreamError::Stream(error.message)),
        None => Ok(chunk),
    }
}

/// Decoded `data:` payload
#[derive(Debug)]
pub(crate) enum SseData {
    Chunk(CompletionChunk),
    Done,
}

/// Incremental SSE line decoder
///
/// Network chunks do not respect line or UTF-8 boundaries, so bytes are held
/// until a full line is available.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<Result<SseData, UpstreamError>> {
        self.buffer.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            out.extend(decode_line(&line));
        }
        out
    }

    /// Decode whatever is left once the body has ended
    pub(crate) fn finish(&mut self) -> Vec<Result<SseData, UpstreamError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest).into_iter().collect()
    }
}

fn decode_line(line: &[u8]) -> Option<Result<SseData, UpstreamError>> {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line.trim_end_matches(&['\n', '\r'][..]),
        Err(e) => {
            warn!("Dropping stream line that is not UTF-8: {}", e);
            return Some(Err(UpstreamError::Decode("stream line is not UTF-8".to_string())));
        }
    };

    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        debug!("Received streaming response end marker");
        return Some(Ok(SseData::Done));
    }

    // Only the error category goes into the message; classification matches on it
    Some(
        serde_json::from_str::<CompletionChunk>(data)
            .map(SseData::Chunk)
            .map_err(|e| {
                warn!("Failed to parse stream chunk: {}", e);
                UpstreamError::Decode(format!(
                    "{:?} error at line {} column {}",
                    e.classify(),
                    e.line(),
                    e.column()
                ))
            }),
    )
}
