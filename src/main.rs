//! LLM Extension API Server
//!
//! HTTP relay that streams LLM answers about selected webpage text to the browser extension

use anyhow::{Context, Result};
use llm_extension_api::{create_router, utils::logging::init_logging, version_info, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load server settings")?;

    init_logging(&settings.logging)?;
    info!("Logging system initialized");

    let addr = settings.bind_address();
    let debug_mode = settings.debug;

    let app = create_router(settings).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 {} started on {}", version_info(), addr);
    info!("📝 Health check: http://{}/api/chat/health", addr);
    info!("🔄 Stream endpoint: http://{}/api/chat/stream", addr);
    info!("Debug mode: {}", debug_mode);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    info!("LLM Extension API shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
