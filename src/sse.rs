use std::convert::Infallible;
use uuid::Uuid;
use warp::sse::Event;

use crate::models::{ContentChunk, DoneEvent, ErrorEvent};
use crate::relay::RelayEvent;

/// Create a content SSE event carrying one delta
pub fn create_content_event(content: String) -> Result<Event, Infallible> {
    Ok(json_event(&ContentChunk { content }))
}

/// Create the done SSE event for a committed reply
pub fn create_done_event(message_id: Uuid) -> Result<Event, Infallible> {
    Ok(json_event(&DoneEvent {
        done: true,
        message_id,
    }))
}

/// Create the error SSE event that ends a failed stream
pub fn create_error_event(error: String) -> Result<Event, Infallible> {
    Ok(json_event(&ErrorEvent { error }))
}

/// Map a relay event onto the wire grammar
pub fn to_sse_event(event: RelayEvent) -> Result<Event, Infallible> {
    match event {
        RelayEvent::Content(content) => create_content_event(content),
        RelayEvent::Done { message_id } => create_done_event(message_id),
        RelayEvent::Error(error) => create_error_event(error),
    }
}

fn json_event<T: serde::Serialize>(payload: &T) -> Event {
    // Plain structs of strings and ids always serialize
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Event::default().data(data)
}
