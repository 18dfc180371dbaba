//! Client-facing chat models
//!
//! Request validation and the normalized stream event protocol sent to the extension

use crate::utils::error::AppError;
use serde::{Deserialize, Serialize};

/// Maximum length of the selected text, in characters
pub const MAX_SELECTED_TEXT_CHARS: usize = 50_000;

/// Maximum length of the question, in characters
pub const MAX_QUESTION_CHARS: usize = 2_000;

/// Raw chat request body as sent by the extension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequestPayload {
    /// The text selected by the user on the webpage
    pub selected_text: String,
    /// The user's question about the selected text
    pub question: String,
    /// URL of the page where the text was selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_url: Option<String>,
}

/// Validated chat request
///
/// Can only be obtained through [`ChatRequest::new`] or `TryFrom<ChatRequestPayload>`,
/// so every instance satisfies the length bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    selected_text: String,
    question: String,
    context_url: Option<String>,
}

impl ChatRequest {
    pub fn new(
        selected_text: impl Into<String>,
        question: impl Into<String>,
        context_url: Option<String>,
    ) -> Result<Self, AppError> {
        let selected_text = selected_text.into();
        let question = question.into();

        check_length("selected_text", &selected_text, MAX_SELECTED_TEXT_CHARS)?;
        check_length("question", &question, MAX_QUESTION_CHARS)?;

        Ok(Self {
            selected_text,
            question,
            context_url,
        })
    }

    pub fn selected_text(&self) -> &str {
        &self.selected_text
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Opaque source URL, never parsed
    pub fn context_url(&self) -> Option<&str> {
        self.context_url.as_deref()
    }
}

impl TryFrom<ChatRequestPayload> for ChatRequest {
    type Error = AppError;

    fn try_from(payload: ChatRequestPayload) -> Result<Self, Self::Error> {
        ChatRequest::new(payload.selected_text, payload.question, payload.context_url)
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters, got {}",
            field, max, len
        )));
    }
    Ok(())
}

/// Kind of a stream event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamEventType {
    Start,
    Delta,
    Stop,
    Error,
}

/// One unit of provider output, independent of the upstream wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event_type: StreamEventType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl StreamEvent {
    pub fn start() -> Self {
        Self {
            event_type: StreamEventType::Start,
            content: String::new(),
            error: None,
        }
    }

    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            event_type: StreamEventType::Delta,
            content: content.into(),
            error: None,
        }
    }

    pub fn stop() -> Self {
        Self {
            event_type: StreamEventType::Stop,
            content: String::new(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            event_type: StreamEventType::Error,
            content: String::new(),
            error: Some(message.into()),
        }
    }

    /// `stop` and `error` end a stream; nothing may follow them
    pub fn is_terminal(&self) -> bool {
        matches!(self.event_type, StreamEventType::Stop | StreamEventType::Error)
    }
}

/// Response body of the non-streaming chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Not tracked yet; always 0
    #[serde(default)]
    pub tokens_used: u32,
}
