//! LLM Extension API Library
//!
//! Relays a selected-text question to an LLM completion API and streams the
//! answer back to a browser extension as Server-Sent Events

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{create_router, create_router_with_client, AppState};
pub use models::{ChatRequest, StreamEvent, StreamEventType};
pub use services::{ChatService, EventStream, LlmClient};
pub use utils::error::{AppError, AppResult, UpstreamError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
