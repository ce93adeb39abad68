// Route definitions and handlers

use std::convert::Infallible;
use uuid::Uuid;
use warp::Filter;

use crate::handlers;
use crate::models::StreamQuery;
use crate::state::AppState;

/// Every route, with JSON error rendering and CORS applied
///
/// Only CORS can still reject: a request from a disallowed origin.
pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let cors = warp::cors()
        .allow_origins(state.config.cors_origins.iter().map(String::as_str))
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"]);

    api_routes(state)
        .recover(handlers::handle_rejection)
        .with(cors)
}

/// Routes without error recovery, for composing or testing
pub fn api_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));
    let conversations = api.and(warp::path("conversations"));

    // GET /
    let status = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::status_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::health_handler);

    // GET /api/v1/models
    let models = api
        .and(warp::path("models"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_models_handler);

    // POST /api/v1/conversations
    let create_conversation = conversations
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::create_conversation_handler);

    // GET /api/v1/conversations
    let list_conversations = conversations
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_conversations_handler);

    // GET /api/v1/conversations/{id}
    let get_conversation = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_conversation_handler);

    // PATCH /api/v1/conversations/{id}
    let update_conversation = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end())
        .and(warp::patch())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::update_conversation_handler);

    // DELETE /api/v1/conversations/{id}
    let delete_conversation = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(handlers::delete_conversation_handler);

    // POST /api/v1/conversations/{id}/messages
    let send_message = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path("messages"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::send_message_handler);

    // GET /api/v1/conversations/{id}/messages
    let list_messages = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path("messages"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_messages_handler);

    // GET /api/v1/conversations/{id}/stream?model=
    let stream = conversations
        .and(warp::path::param::<Uuid>())
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<StreamQuery>())
        .and(with_state(state))
        .and_then(handlers::stream_handler);

    // Combine routes
    status
        .or(health)
        .or(models)
        .or(create_conversation)
        .or(list_conversations)
        .or(get_conversation)
        .or(update_conversation)
        .or(delete_conversation)
        .or(send_message)
        .or(list_messages)
        .or(stream)
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(64 * 1024).and(warp::body::json())
}
