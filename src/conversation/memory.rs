//! In-memory conversation store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{ConversationError, Result};
use super::store::ConversationStore;
use super::types::{Conversation, ConversationSummary, Message};

/// Conversation store backed by a map behind a single-writer lock
pub struct InMemoryStore {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    default_model: String,
}

impl InMemoryStore {
    /// Create an empty store. `default_model` is used for conversations
    /// created without an explicit model.
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            default_model: default_model.into(),
        }
    }

    async fn append(&self, id: Uuid, message: Message) -> Result<Message> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(&id)
            .ok_or(ConversationError::NotFound(id))?;

        conversation.updated_at = Utc::now();
        conversation.messages.push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create(&self, default_model: Option<String>) -> Conversation {
        let model = default_model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());
        let conversation = Conversation::new(model);

        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation.clone());

        tracing::info!(
            conversation_id = %conversation.id,
            model = %conversation.default_model,
            "Created conversation"
        );
        conversation
    }

    async fn get(&self, id: Uuid) -> Result<Conversation> {
        self.conversations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ConversationError::NotFound(id))
    }

    async fn list(&self) -> Vec<ConversationSummary> {
        let mut summaries: Vec<ConversationSummary> = self
            .conversations
            .read()
            .await
            .values()
            .map(ConversationSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    async fn append_user_message(
        &self,
        id: Uuid,
        content: String,
        model_override: Option<String>,
    ) -> Result<Message> {
        let model_override = model_override.filter(|m| !m.trim().is_empty());
        let message = self.append(id, Message::user(content, model_override)).await?;
        tracing::info!(conversation_id = %id, message_id = %message.id, "Added user message");
        Ok(message)
    }

    async fn append_assistant_message(
        &self,
        id: Uuid,
        content: String,
        model_used: String,
    ) -> Result<Message> {
        let message = self.append(id, Message::assistant(content, model_used)).await?;
        tracing::debug!(conversation_id = %id, message_id = %message.id, "Stored assistant message");
        Ok(message)
    }

    async fn update_default_model(&self, id: Uuid, model: String) -> Result<Conversation> {
        let trimmed = model.trim();
        if trimmed.is_empty() {
            return Err(ConversationError::InvalidModel(model));
        }

        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(&id)
            .ok_or(ConversationError::NotFound(id))?;

        conversation.default_model = trimmed.to_string();
        conversation.updated_at = Utc::now();

        tracing::info!(
            conversation_id = %id,
            model = %conversation.default_model,
            "Updated conversation model"
        );
        Ok(conversation.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.conversations
            .write()
            .await
            .remove(&id)
            .ok_or(ConversationError::NotFound(id))?;

        tracing::info!(conversation_id = %id, "Deleted conversation");
        Ok(())
    }
}
