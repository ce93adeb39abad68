//! Storage interface for conversations

use async_trait::async_trait;
use uuid::Uuid;

use super::error::Result;
use super::types::{Conversation, ConversationSummary, Message};

/// Owner of every conversation's message sequence
///
/// Message sequences are append-only: the only way to remove a message is to
/// delete its whole conversation.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Allocate a new, empty conversation.
    ///
    /// A missing or empty `default_model` falls back to the store's
    /// process-wide default.
    async fn create(&self, default_model: Option<String>) -> Conversation;

    /// Fetch a conversation with its full history
    async fn get(&self, id: Uuid) -> Result<Conversation>;

    /// Summaries of every conversation, most recently updated first
    async fn list(&self) -> Vec<ConversationSummary>;

    /// Append a user message. Never contacts the upstream.
    async fn append_user_message(
        &self,
        id: Uuid,
        content: String,
        model_override: Option<String>,
    ) -> Result<Message>;

    /// Append the assistant reply of a completed stream.
    ///
    /// Fails with `NotFound` when the conversation was deleted mid-stream.
    async fn append_assistant_message(
        &self,
        id: Uuid,
        content: String,
        model_used: String,
    ) -> Result<Message>;

    /// Change the conversation's default model
    ///
    /// Fails with `InvalidModel` when `model` is blank.
    async fn update_default_model(&self, id: Uuid, model: String) -> Result<Conversation>;

    /// Remove a conversation and all of its messages
    async fn delete(&self, id: Uuid) -> Result<()>;
}
