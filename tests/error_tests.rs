//! Error handling module unit tests

use axum::http::StatusCode;
use axum::response::IntoResponse;
use llm_extension_api::services::classify_upstream_error;
use llm_extension_api::utils::error::*;

#[test]
fn test_app_error_status_codes() {
    let test_cases = vec![
        (AppError::Validation("test".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Configuration("test".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::ExternalApi("test".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::Rejected {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                message: "test".to_string(),
            },
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ),
    ];

    for (error, expected_status) in test_cases {
        assert_eq!(error.status_code(), expected_status);
    }
}

#[test]
fn test_app_error_types() {
    assert_eq!(AppError::Validation("test".to_string()).error_type(), "invalid_request_error");
    assert_eq!(AppError::Configuration("test".to_string()).error_type(), "configuration_error");
    assert_eq!(AppError::ExternalApi("test".to_string()).error_type(), "api_error");
}

#[test]
fn test_error_response_body() {
    let error = AppError::Validation("question cannot be empty".to_string());
    let body = error.to_error_response();

    assert_eq!(body.response_type, "error");
    assert_eq!(body.error.error_type, "invalid_request_error");
    assert_eq!(body.error.message, "Request validation failed: question cannot be empty");

    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_into_response() {
    let response = AppError::Configuration("no key".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["message"], "no key");
}

#[test]
fn test_classification_of_each_upstream_variant() {
    let rate = UpstreamError::Api {
        status: 429,
        message: "Rate limit reached for model".to_string(),
    };
    assert_eq!(classify_upstream_error(&rate), "Rate limit. Please wait a moment and try again.");

    let key = UpstreamError::Api {
        status: 401,
        message: "Invalid API Key".to_string(),
    };
    assert_eq!(
        classify_upstream_error(&key),
        "Invalid API key. Get a free key at https://console.groq.com"
    );

    let connection = UpstreamError::Connection("dns lookup failed".to_string());
    assert_eq!(
        classify_upstream_error(&connection),
        "Error: Connection error: dns lookup failed"
    );

    let decode = UpstreamError::Decode("expected value".to_string());
    assert_eq!(
        classify_upstream_error(&decode),
        "Error: Malformed stream chunk: expected value"
    );
}
