use uuid::Uuid;

use crate::conversation::ConversationError;
use crate::llm::UpstreamError;

/// Errors that can occur while relaying a stream
///
/// `NotFound`, `BadRequest`, `Configuration` and `Conflict` are raised before
/// any upstream connection is opened. The rest only ever reach the client as
/// a terminal `error` event.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Conversation not found: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Another stream is already active for this conversation
    #[error("A response is already streaming for conversation {0}")]
    Conflict(Uuid),

    #[error("Error streaming from upstream: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl From<ConversationError> for RelayError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::NotFound(id) => RelayError::NotFound(id),
            ConversationError::InvalidModel(_) => RelayError::BadRequest(err.to_string()),
        }
    }
}
