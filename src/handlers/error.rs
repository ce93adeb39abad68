// Error responses for the HTTP API

use std::convert::Infallible;
use thiserror::Error;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::conversation::ConversationError;
use crate::llm::UpstreamError;
use crate::models::ErrorResponse;
use crate::relay::RelayError;

/// Failures reported as a plain JSON error response
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Conversation not found")]
    NotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Failed to fetch models from upstream: {0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Configuration(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::NotFound(id) => ApiError::NotFound(id),
            ConversationError::InvalidModel(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::NotFound(id) => ApiError::NotFound(id),
            RelayError::BadRequest(msg) => ApiError::BadRequest(msg),
            RelayError::Conflict(_) => ApiError::Conflict(err.to_string()),
            RelayError::Configuration(_) => ApiError::Configuration(err.to_string()),
            RelayError::Upstream(_) | RelayError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Configuration(msg) => ApiError::Configuration(msg),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

/// Turn an `ApiError` into a warp rejection
pub fn reject(err: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(err.into())
}

/// Render every rejection as `{"error": "..."}`
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status_code(), api_error.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        tracing::error!(rejection = ?err, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    ))
}
