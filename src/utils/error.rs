//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
///
/// These are surfaced synchronously as HTTP responses, before any stream is opened.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Required configuration is missing
    #[error("{0}")]
    Configuration(String),

    /// External API error
    #[error("{0}")]
    ExternalApi(String),

    /// Request body was refused before parsing (size limit, content type)
    #[error("Request validation failed: {message}")]
    Rejected { status: StatusCode, message: String },
}

/// Failure while opening or consuming the upstream completion stream
///
/// The `Display` output is the provider's human-readable message and is what
/// error classification matches against.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The request could not be sent or the connection dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// The provider answered with a non-success status
    #[error("Error code: {status} - {message}")]
    Api { status: u16, message: String },

    /// The provider reported an error inside the stream
    #[error("{0}")]
    Stream(String),

    /// A stream chunk could not be decoded
    #[error("Malformed stream chunk: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UpstreamError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => UpstreamError::Connection(err.to_string()),
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Rejected { .. } => "invalid_request_error",
            AppError::Configuration(_) => "configuration_error",
            AppError::ExternalApi(_) => "api_error",
        }
    }

    /// Convert to the JSON error body
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            response_type: "error".to_string(),
            error: ErrorDetail {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
            },
        }
    }
}

/// Malformed JSON and missing fields are plain validation failures; other
/// rejections keep the status axum assigned them (413, 415, ...)
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                AppError::Validation(rejection.body_text())
            }
            _ => AppError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            },
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self, status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
