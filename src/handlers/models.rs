// GET /models handler

use super::error::reject;
use crate::models::ModelsResponse;
use crate::state::AppState;

/// List upstream models, served from the fixed-TTL cache when fresh
pub async fn list_models_handler(state: AppState) -> Result<impl warp::Reply, warp::Rejection> {
    let result = state
        .models
        .get_or_fetch(state.provider.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error fetching models");
            reject(e)
        })?;

    Ok(warp::reply::json(&ModelsResponse {
        models: result.models.as_ref().clone(),
        cached: result.cached,
    }))
}
