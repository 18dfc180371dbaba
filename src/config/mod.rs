//! Configuration management module
//!
//! Responsible for loading the application configuration from environment variables and `.env` files

pub mod settings;

pub use settings::{LoggingConfig, ProviderConfig, SecurityConfig, ServerConfig, Settings};
