// Conversation CRUD handlers

use uuid::Uuid;
use warp::http::StatusCode;

use super::error::reject;
use crate::conversation::ConversationSummary;
use crate::models::{
    ConversationListResponse, CreateConversationRequest, DeleteResponse,
    UpdateConversationRequest,
};
use crate::state::AppState;

/// POST /conversations
pub async fn create_conversation_handler(
    request: CreateConversationRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversation = state.store.create(request.default_model).await;

    Ok(warp::reply::with_status(
        warp::reply::json(&ConversationSummary::from(&conversation)),
        StatusCode::CREATED,
    ))
}

/// GET /conversations
pub async fn list_conversations_handler(
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversations = state.store.list().await;
    Ok(warp::reply::json(&ConversationListResponse { conversations }))
}

/// GET /conversations/{id}
pub async fn get_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversation = state.store.get(conversation_id).await.map_err(reject)?;
    Ok(warp::reply::json(&ConversationSummary::from(&conversation)))
}

/// PATCH /conversations/{id}
pub async fn update_conversation_handler(
    conversation_id: Uuid,
    request: UpdateConversationRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversation = state
        .store
        .update_default_model(conversation_id, request.default_model)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&ConversationSummary::from(&conversation)))
}

/// DELETE /conversations/{id}
///
/// A stream in flight for the conversation keeps running; its final commit
/// then fails and the client receives an error event.
pub async fn delete_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    state.store.delete(conversation_id).await.map_err(reject)?;

    Ok(warp::reply::json(&DeleteResponse {
        status: "deleted".to_string(),
        conversation_id,
    }))
}
