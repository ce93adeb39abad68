// GET /conversations/{id}/stream handler

use futures_util::stream::StreamExt;
use uuid::Uuid;

use super::error::reject;
use crate::models::StreamQuery;
use crate::relay::spawn_forwarder;
use crate::sse::to_sse_event;
use crate::state::AppState;

/// Stream the assistant reply for a conversation as Server-Sent Events
///
/// Admission failures (unknown conversation, empty history, missing
/// credentials, concurrent stream) are plain JSON errors. Once the event
/// stream has started, every failure is a single `error` event.
pub async fn stream_handler(
    conversation_id: Uuid,
    query: StreamQuery,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let relay = state
        .relay
        .start(conversation_id, query.model)
        .await
        .map_err(reject)?;
    let events = spawn_forwarder(relay).map(to_sse_event);

    let reply = warp::sse::reply(warp::sse::keep_alive().stream(events));
    let reply = warp::reply::with_header(reply, "Cache-Control", "no-cache");
    Ok(warp::reply::with_header(reply, "X-Accel-Buffering", "no"))
}
