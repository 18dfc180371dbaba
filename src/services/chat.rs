//! Chat service
//!
//! Implements [`LlmClient`] on top of a [`CompletionProvider`]: builds the prompt,
//! relays text deltas and turns upstream failures into a client-safe `error` event.

use crate::config::{ProviderConfig, Settings};
use crate::models::chat::{ChatRequest, ChatResponse, StreamEvent, StreamEventType};
use crate::models::openai::{CompletionMessage, CompletionRequest};
use crate::providers::{CompletionProvider, OpenAICompatibleProvider};
use crate::services::llm::{EventStream, LlmClient};
use crate::utils::error::UpstreamError;
use crate::utils::logging::create_request_log_summary;
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};

/// System prompt sent with every request
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant integrated into a browser extension. \
The user has selected some text on a webpage and wants to ask you about it.

Guidelines:
- Be concise but thorough
- If the selected text is unclear, acknowledge that and provide your best interpretation
- Format your response with markdown when helpful (lists, code blocks, etc.)
- If the question seems unrelated to the text, still try to be helpful";

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit. Please wait a moment and try again.";
pub const INVALID_KEY_MESSAGE: &str = "Invalid API key. Get a free key at https://console.groq.com";

/// Capacity of the per-request event channel
const EVENT_BUFFER: usize = 64;

/// Chat service backed by a streaming completion provider
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ChatService {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &ProviderConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Build the service from settings, `None` when no API key is configured
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(api_key) = settings.api_key() else {
            return Ok(None);
        };

        let provider = OpenAICompatibleProvider::new(&settings.provider, api_key)?;
        info!(
            "Chat service ready: provider={}, model={}, max_tokens={}",
            provider.name(),
            settings.provider.model,
            settings.provider.max_tokens
        );

        Ok(Some(Self::new(Arc::new(provider), &settings.provider)))
    }

    /// Build the user message: optional source URL, fenced selection, then the question
    pub fn build_user_message(request: &ChatRequest) -> String {
        let mut parts = Vec::with_capacity(3);

        if let Some(url) = request.context_url() {
            parts.push(format!("**Source URL:** {}\n", url));
        }
        parts.push(format!("**Selected Text:**\n```\n{}\n```", request.selected_text()));
        parts.push(format!("\n**Question:** {}", request.question()));

        parts.join("\n")
    }

    /// Build the upstream streaming request
    pub fn build_completion_request(&self, request: &ChatRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![
                CompletionMessage::system(SYSTEM_PROMPT),
                CompletionMessage::user(Self::build_user_message(request)),
            ],
            stream: true,
        }
    }
}

impl LlmClient for ChatService {
    fn stream_response(&self, request: ChatRequest) -> EventStream {
        if let Ok(summary_json) = serde_json::to_string(&create_request_log_summary(&request)) {
            debug!("Chat request: {}", summary_json);
        }

        let completion = self.build_completion_request(&request);
        let provider = Arc::clone(&self.provider);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(run_stream(provider, completion, tx));

        Box::pin(ReceiverStream::new(rx))
    }
}

/// How the relay loop ended without an upstream failure
enum RelayEnd {
    Exhausted,
    ClientGone,
}

/// Produce the full event sequence for one request into `tx`
async fn run_stream(
    provider: Arc<dyn CompletionProvider>,
    request: CompletionRequest,
    tx: mpsc::Sender<StreamEvent>,
) {
    if tx.send(StreamEvent::start()).await.is_err() {
        debug!("Client disconnected before the stream started");
        return;
    }

    // Dropping the relay future closes the upstream connection.
    let outcome = tokio::select! {
        _ = tx.closed() => Ok(RelayEnd::ClientGone),
        outcome = relay(provider.as_ref(), request, &tx) => outcome,
    };

    let terminal = match outcome {
        Ok(RelayEnd::Exhausted) => StreamEvent::stop(),
        Ok(RelayEnd::ClientGone) => {
            debug!("Client disconnected, upstream stream released");
            return;
        }
        Err(e) => {
            error!("[{} error] {}", provider.name(), e);
            StreamEvent::error(classify_upstream_error(&e))
        }
    };

    if tx.send(terminal).await.is_err() {
        debug!("Client disconnected before the terminal event");
    }
}

/// Forward upstream text chunks as `delta` events
async fn relay(
    provider: &dyn CompletionProvider,
    request: CompletionRequest,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<RelayEnd, UpstreamError> {
    let mut chunks = provider.chat_stream(request).await?;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let Some(text) = chunk.content() else {
            continue;
        };
        if tx.send(StreamEvent::delta(text)).await.is_err() {
            return Ok(RelayEnd::ClientGone);
        }
    }

    Ok(RelayEnd::Exhausted)
}

/// Map an upstream failure to the message shown to the user
///
/// Case-insensitive substring match on the failure text, first match wins.
pub fn classify_upstream_error(error: &UpstreamError) -> String {
    let message = error.to_string();
    let lower = message.to_lowercase();

    if lower.contains("rate") {
        RATE_LIMIT_MESSAGE.to_string()
    } else if lower.contains("api_key") || lower.contains("invalid") {
        INVALID_KEY_MESSAGE.to_string()
    } else {
        format!("Error: {}", message)
    }
}

/// Drain an event stream into a single response
///
/// Returns the classified error text if the stream ended with `error`, or a
/// generic message if it ended without a terminal event.
pub async fn collect_response(mut events: EventStream) -> Result<ChatResponse, String> {
    let mut response = String::new();

    while let Some(event) = events.next().await {
        match event.event_type {
            StreamEventType::Start => {}
            StreamEventType::Delta => response.push_str(&event.content),
            StreamEventType::Stop => {
                return Ok(ChatResponse {
                    response,
                    tokens_used: 0,
                })
            }
            StreamEventType::Error => {
                return Err(event.error.unwrap_or_else(|| "Unknown error".to_string()))
            }
        }
    }

    Err("Stream ended unexpectedly".to_string())
}
