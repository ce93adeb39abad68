// Service status handlers

use chrono::Utc;
use std::convert::Infallible;

use crate::models::{HealthResponse, StatusResponse};
use crate::state::AppState;

/// GET /
pub async fn status_handler(state: AppState) -> Result<impl warp::Reply, Infallible> {
    let conversations = state.store.list().await;
    let total_messages = conversations.iter().map(|c| c.message_count).sum();

    Ok(warp::reply::json(&StatusResponse {
        status: "online".to_string(),
        service: state.config.upstream.app_title.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        conversations: conversations.len(),
        total_messages,
        active_streams: state.relay.active_streams().len(),
    }))
}

/// GET /health
pub async fn health_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    }))
}
