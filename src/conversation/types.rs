//! Conversation and message records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input
    User,
    /// Model output
    Assistant,
}

/// A single entry in a conversation's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// For user messages: one-off model override. For assistant messages: the model that produced it.
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>, model_override: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            model: model_override,
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message produced by `model`
    pub fn assistant(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            model: Some(model.into()),
            timestamp: Utc::now(),
        }
    }
}

/// A conversation with its full, append-only message history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub default_model: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(default_model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            default_model: default_model.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Model a stream should use when the caller gives no explicit override.
    ///
    /// The latest user message's override wins over the conversation default.
    pub fn effective_model(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.model.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str())
    }
}

/// Conversation metadata without the message bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub default_model: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conv: &Conversation) -> Self {
        Self {
            id: conv.id,
            default_model: conv.default_model.clone(),
            message_count: conv.messages.len(),
            created_at: conv.created_at,
            updated_at: conv.updated_at,
        }
    }
}
