//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod chat;
pub mod health;
pub mod sse;

use crate::config::Settings;
use crate::middleware::request_logging_middleware;
use crate::services::{ChatService, LlmClient};
use crate::utils::error::{AppError, AppResult};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{request::Parts, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Message returned when no upstream credential is configured
pub const MISSING_KEY_MESSAGE: &str = "Groq API key not configured. Get a FREE key at https://console.groq.com";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// `None` when no upstream credential is configured
    pub llm_client: Option<Arc<dyn LlmClient>>,
}

impl AppState {
    /// The configured LLM client, or a configuration error
    pub fn llm_client(&self) -> AppResult<Arc<dyn LlmClient>> {
        self.llm_client
            .clone()
            .ok_or_else(|| AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))
    }
}

/// Create application router with the upstream client built from settings
pub async fn create_router(settings: Settings) -> Result<Router> {
    let llm_client = ChatService::from_settings(&settings)?.map(|service| Arc::new(service) as Arc<dyn LlmClient>);

    if llm_client.is_none() {
        warn!("GROQ_API_KEY is not set, chat endpoints will answer with 500");
    }

    Ok(create_router_with_client(settings, llm_client))
}

/// Create application router around an existing LLM client
pub fn create_router_with_client(settings: Settings, llm_client: Option<Arc<dyn LlmClient>>) -> Router {
    let cors = cors_layer(&settings.security.allowed_origins);
    let debug = settings.debug;

    let app_state = Arc::new(AppState {
        settings: Arc::new(settings),
        llm_client,
    });

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_logging_middleware));

    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/api/chat", post(chat::complete_chat))
        .route("/api/chat/stream", post(chat::stream_chat))
        .route("/api/chat/health", get(health::health_check));

    if debug {
        router = router.route("/docs", get(health::docs));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
        .layer(middleware_stack)
}

/// Build the CORS layer from the configured origin patterns
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let patterns = origins.to_vec();
    layer.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
        origin
            .to_str()
            .map(|origin| patterns.iter().any(|pattern| origin_matches(pattern, origin)))
            .unwrap_or(false)
    }))
}

/// Match an origin against a pattern; a trailing `*` matches any suffix
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => origin.starts_with(prefix),
        None => pattern == origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_matches() {
        assert!(origin_matches("chrome-extension://*", "chrome-extension://abcdef"));
        assert!(origin_matches("http://localhost:*", "http://localhost:3000"));
        assert!(origin_matches("https://example.com", "https://example.com"));
        assert!(!origin_matches("https://example.com", "https://example.com.evil"));
        assert!(!origin_matches("http://localhost:*", "http://127.0.0.1:3000"));
    }

    #[test]
    fn test_missing_client_is_configuration_error() {
        let state = AppState {
            settings: Arc::new(Settings::default()),
            llm_client: None,
        };
        assert!(matches!(state.llm_client(), Err(AppError::Configuration(_))));
    }
}
