//! SSE transcoder
//!
//! Writes each stream event as a `data: <json>\n\n` frame as soon as it is produced.

use crate::services::EventStream;
use axum::{
    http::{header, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;

/// Turn an event stream into a streaming `text/event-stream` response
///
/// Events are forwarded as-is. Dropping the response body drops `events`.
pub fn sse_response(events: EventStream) -> Response {
    let frames = events.map(|event| Event::default().json_data(&event));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(frames),
    )
        .into_response()
}
