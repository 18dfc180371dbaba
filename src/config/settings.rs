//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default upstream endpoint (Groq's OpenAI-compatible API)
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default upstream model
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default maximum output tokens
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Default browser origins allowed by CORS
pub const DEFAULT_ALLOWED_ORIGINS: &str = "chrome-extension://*,http://localhost:*";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream completion API configuration
    pub provider: ProviderConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Enables the documentation endpoint
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Upstream completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, `None` when not configured
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model identifier sent upstream
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Connect timeout for upstream requests in seconds
    pub timeout: u64,
    /// Timeout for a whole streaming response in seconds
    pub stream_timeout: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let settings = Self {
            server: ServerConfig {
                host: get("HOST", "0.0.0.0"),
                port: get("PORT", "8000")
                    .parse()
                    .context("Invalid port number")?,
            },
            provider: ProviderConfig {
                api_key: lookup("GROQ_API_KEY")
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty()),
                base_url: get("GROQ_BASE_URL", DEFAULT_BASE_URL),
                model: get("GROQ_MODEL", DEFAULT_MODEL),
                max_tokens: get("MAX_TOKENS", &DEFAULT_MAX_TOKENS.to_string())
                    .parse()
                    .context("Invalid max tokens value")?,
                timeout: get("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid request timeout")?,
                stream_timeout: get("STREAM_TIMEOUT", "300")
                    .parse()
                    .context("Invalid stream timeout")?,
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(&get("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL", "info"),
                format: get("LOG_FORMAT", "text"),
            },
            debug: parse_flag(&get("DEBUG", "false"))
                .context("Invalid debug flag")?,
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if !self.provider.base_url.starts_with("http") {
            anyhow::bail!("Invalid upstream base URL format, should start with 'http'");
        }

        if self.provider.max_tokens == 0 {
            anyhow::bail!("Max tokens cannot be 0");
        }

        if self.provider.timeout == 0 || self.provider.stream_timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Upstream API key, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.provider.api_key.as_deref()
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            provider: ProviderConfig {
                api_key: None,
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
                timeout: 30,
                stream_timeout: 300,
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
            debug: false,
        }
    }
}

/// Split a comma-separated origin list
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
