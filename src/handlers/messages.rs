// Message handlers

use uuid::Uuid;
use warp::http::StatusCode;

use super::error::{reject, ApiError};
use crate::models::{MessagesResponse, SendMessageRequest};
use crate::state::AppState;

/// POST /conversations/{id}/messages
///
/// Stores the user message only; the reply is produced by the stream endpoint.
pub async fn send_message_handler(
    conversation_id: Uuid,
    request: SendMessageRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    if request.message.is_empty() {
        return Err(reject(ApiError::BadRequest(
            "message must not be empty".to_string(),
        )));
    }

    let message = state
        .store
        .append_user_message(conversation_id, request.message, request.model)
        .await
        .map_err(reject)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&message),
        StatusCode::CREATED,
    ))
}

/// GET /conversations/{id}/messages
pub async fn list_messages_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversation = state.store.get(conversation_id).await.map_err(reject)?;

    Ok(warp::reply::json(&MessagesResponse {
        conversation_id,
        messages: conversation.messages,
    }))
}
