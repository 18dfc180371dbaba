//! Integration tests
//!
//! Drive the full router with a scripted LLM client

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use futures::stream;
use llm_extension_api::{
    create_router, create_router_with_client, ChatRequest, EventStream, LlmClient, Settings, StreamEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// LLM client replaying a fixed event sequence
struct ScriptedClient {
    events: Vec<StreamEvent>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedClient {
    fn new(events: Vec<StreamEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }
}

impl LlmClient for ScriptedClient {
    fn stream_response(&self, request: ChatRequest) -> EventStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        Box::pin(stream::iter(self.events.clone()))
    }
}

fn app_with(client: Arc<ScriptedClient>, settings: Settings) -> Router {
    create_router_with_client(settings, Some(client as Arc<dyn LlmClient>))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Split an SSE body into the JSON payloads of its `data:` frames
fn parse_frames(body: &str) -> Vec<StreamEvent> {
    body.split("\n\n")
        .filter(|frame| !frame.is_empty())
        .map(|frame| {
            let data = frame.strip_prefix("data: ").expect("every frame is a data frame");
            serde_json::from_str(data).unwrap()
        })
        .collect()
}

const VALID_BODY: &str = r#"{"selected_text": "Ferris is a crab", "question": "Who is Ferris?", "context_url": "https://example.com"}"#;

#[tokio::test]
async fn test_stream_endpoint_emits_sse_frames() {
    let events = vec![
        StreamEvent::start(),
        StreamEvent::delta("Ferris is "),
        StreamEvent::delta("the Rust mascot."),
        StreamEvent::stop(),
    ];
    let client = ScriptedClient::new(events.clone());
    let app = app_with(client.clone(), Settings::default());

    let response = app.oneshot(post_json("/api/chat/stream", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(parse_frames(&body), events);

    let request = client.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.context_url(), Some("https://example.com"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_endpoint_forwards_error_event() {
    let events = vec![StreamEvent::start(), StreamEvent::error("Rate limit. Please wait a moment and try again.")];
    let app = app_with(ScriptedClient::new(events.clone()), Settings::default());

    let response = app.oneshot(post_json("/api/chat/stream", VALID_BODY)).await.unwrap();

    // the status line is already committed when the upstream fails
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(parse_frames(std::str::from_utf8(&body).unwrap()), events);
}

#[tokio::test]
async fn test_validation_failures_do_not_reach_the_client() {
    let client = ScriptedClient::new(vec![StreamEvent::start(), StreamEvent::stop()]);
    let too_long_question = serde_json::json!({
        "selected_text": "text",
        "question": "q".repeat(2001),
    })
    .to_string();

    let bodies = vec![
        r#"{"selected_text": "", "question": "why?"}"#.to_string(),
        r#"{"selected_text": "text", "question": ""}"#.to_string(),
        r#"{"selected_text": "text"}"#.to_string(),
        "not json".to_string(),
        too_long_question,
    ];

    for body in bodies {
        let app = app_with(client.clone(), Settings::default());
        let response = app.oneshot(post_json("/api/chat/stream", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {} should be rejected", body);
        let json = body_json(response).await;
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"]["type"], "invalid_request_error");
    }

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_bodies_keep_their_status() {
    let client = ScriptedClient::new(vec![StreamEvent::start(), StreamEvent::stop()]);

    let oversized = serde_json::json!({
        "selected_text": "a".repeat(2 * 1024 * 1024),
        "question": "why?",
    })
    .to_string();
    let response = app_with(client.clone(), Settings::default())
        .oneshot(post_json("/api/chat/stream", &oversized))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_request_error");

    let plain_text = Request::builder()
        .method("POST")
        .uri("/api/chat/stream")
        .header("content-type", "text/plain")
        .body(Body::from(VALID_BODY))
        .unwrap();
    let response = app_with(client.clone(), Settings::default())
        .oneshot(plain_text)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_request_error");

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_api_key_returns_500() {
    let app = create_router(Settings::default()).await.expect("Failed to create router");

    let response = app.oneshot(post_json("/api/chat/stream", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_ne!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"text/event-stream"[..])
    );
    let json = body_json(response).await;
    assert_eq!(json["error"]["type"], "configuration_error");
    assert!(json["error"]["message"].as_str().unwrap().contains("console.groq.com"));
}

#[tokio::test]
async fn test_complete_endpoint_collects_deltas() {
    let events = vec![
        StreamEvent::start(),
        StreamEvent::delta("Hello"),
        StreamEvent::delta(" world"),
        StreamEvent::stop(),
    ];
    let app = app_with(ScriptedClient::new(events), Settings::default());

    let response = app.oneshot(post_json("/api/chat", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"response": "Hello world", "tokens_used": 0}));
}

#[tokio::test]
async fn test_complete_endpoint_maps_error_event() {
    let events = vec![StreamEvent::start(), StreamEvent::error("Error: upstream exploded")];
    let app = app_with(ScriptedClient::new(events), Settings::default());

    let response = app.oneshot(post_json("/api/chat", VALID_BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Error: upstream exploded");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(Settings::default()).await.expect("Failed to create router");

    let request = Request::builder()
        .uri("/api/chat/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"status": "healthy", "service": "llm-extension-api"})
    );
}

#[tokio::test]
async fn test_docs_only_in_debug_mode() {
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let app = create_router(Settings::default()).await.unwrap();
    let response = app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let root = body_json(app.oneshot(get("/")).await.unwrap()).await;
    assert_eq!(root["docs"], "disabled");
    assert_eq!(root["name"], "LLM Extension API");

    let mut settings = Settings::default();
    settings.debug = true;
    let app = create_router(settings).await.unwrap();
    let response = app.clone().oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let root = body_json(app.oneshot(get("/")).await.unwrap()).await;
    assert_eq!(root["docs"], "/docs");
}

#[tokio::test]
async fn test_cors_preflight_for_extension_origin() {
    let app = create_router(Settings::default()).await.unwrap();

    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/chat/stream")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("chrome-extension://abcdefghijklmnop"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "chrome-extension://abcdefghijklmnop"
    );

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
