//! Error types for the conversation store

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when using a conversation store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// No conversation with this id exists (never created, or deleted)
    #[error("Conversation not found: {0}")]
    NotFound(Uuid),

    /// A default model must be a non-empty identifier
    #[error("Invalid model: {0:?}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, ConversationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let id = Uuid::nil();
        let err = ConversationError::NotFound(id);
        assert!(err.to_string().contains("Conversation not found"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_invalid_model_display() {
        let err = ConversationError::InvalidModel("  ".to_string());
        assert_eq!(err.to_string(), r#"Invalid model: "  ""#);
    }
}
