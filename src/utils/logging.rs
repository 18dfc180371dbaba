//! Logging utilities
//!
//! Subscriber setup and helpers that keep request logs short

use crate::config::LoggingConfig;
use crate::models::chat::ChatRequest;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    // RUST_LOG directives take precedence over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars truncated)", head, total - max_chars)
    } else {
        s.to_string()
    }
}

/// Create a filtered summary of a chat request for logging
pub fn create_request_log_summary(request: &ChatRequest) -> serde_json::Value {
    serde_json::json!({
        "selected_text": truncate_content(request.selected_text(), 200),
        "selected_text_chars": request.selected_text().chars().count(),
        "question": truncate_content(request.question(), 200),
        "context_url": request.context_url(),
    })
}
