//! Chat handlers
//!
//! POST /api/chat/stream streams the answer as SSE, POST /api/chat returns it in one piece

use crate::handlers::sse::sse_response;
use crate::handlers::AppState;
use crate::models::chat::{ChatRequest, ChatRequestPayload, ChatResponse};
use crate::services::collect_response;
use crate::utils::error::{AppError, AppResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;

/// Stream chat response using Server-Sent Events
///
/// POST /api/chat/stream
///
/// Configuration and validation errors are returned before the stream opens;
/// upstream failures arrive as a terminal `error` event inside the stream.
pub async fn stream_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestPayload>, JsonRejection>,
) -> AppResult<Response> {
    let client = state.llm_client()?;
    let request = parse_request(payload)?;

    debug!("Starting streaming response transmission");
    Ok(sse_response(client.stream_response(request)))
}

/// Non-streaming chat completion
///
/// POST /api/chat
pub async fn complete_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestPayload>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let client = state.llm_client()?;
    let request = parse_request(payload)?;

    collect_response(client.stream_response(request))
        .await
        .map(Json)
        .map_err(AppError::ExternalApi)
}

fn parse_request(payload: Result<Json<ChatRequestPayload>, JsonRejection>) -> AppResult<ChatRequest> {
    let Json(payload) = payload?;
    ChatRequest::try_from(payload)
}
