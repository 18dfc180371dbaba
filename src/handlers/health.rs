//! Health check and service information handlers

use crate::handlers::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "llm-extension-api";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
}

/// Root endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    /// Documentation path, or "disabled"
    pub docs: String,
}

/// Health check
///
/// GET /api/chat/health
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Executing health check");

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    let docs = if state.settings.debug { "/docs" } else { "disabled" };

    Json(RootResponse {
        name: "LLM Extension API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: docs.to_string(),
    })
}

/// Endpoint listing, only routed when debug mode is on
///
/// GET /docs
pub async fn docs() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": "LLM Extension API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Streams LLM answers about selected webpage text",
        "endpoints": [
            {
                "method": "POST",
                "path": "/api/chat/stream",
                "description": "Stream an answer as Server-Sent Events",
                "body": {
                    "selected_text": "string, 1-50000 chars",
                    "question": "string, 1-2000 chars",
                    "context_url": "optional string"
                }
            },
            {
                "method": "POST",
                "path": "/api/chat",
                "description": "Return the complete answer as JSON"
            },
            {
                "method": "GET",
                "path": "/api/chat/health",
                "description": "Health check"
            }
        ]
    }))
}
