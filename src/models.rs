// Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::{ConversationSummary, Message};
use crate::llm::ModelInfo;

// Request Types
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConversationRequest {
    pub default_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Query string of the stream endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub model: Option<String>,
}

// Response Types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub conversation_id: Uuid,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub conversations: usize,
    pub total_messages: usize,
    pub active_streams: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// SSE Event Types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentChunk {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoneEvent {
    pub done: bool,
    pub message_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEvent {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_model_is_optional() {
        let request: CreateConversationRequest = serde_json::from_str("{}").unwrap();
        assert!(request.default_model.is_none());

        let request: CreateConversationRequest =
            serde_json::from_str(r#"{"default_model":"m1"}"#).unwrap();
        assert_eq!(request.default_model.as_deref(), Some("m1"));
    }

    #[test]
    fn test_send_message_request_deserialization() {
        let json = r#"{"message":"Hello, world!"}"#;
        let request: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.message, "Hello, world!");
        assert!(request.model.is_none());

        let json = r#"{"message":"Hi","model":"m2"}"#;
        let request: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.model.as_deref(), Some("m2"));
    }

    #[test]
    fn test_update_request_requires_model() {
        assert!(serde_json::from_str::<UpdateConversationRequest>("{}").is_err());
    }

    #[test]
    fn test_content_chunk_serialization() {
        let chunk = ContentChunk {
            content: "Hel".to_string(),
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value, serde_json::json!({"content": "Hel"}));
    }

    #[test]
    fn test_done_event_serialization() {
        let event = DoneEvent {
            done: true,
            message_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["done"], true);
        assert_eq!(value["message_id"], Uuid::nil().to_string());
    }

    #[test]
    fn test_error_event_serialization() {
        let event = ErrorEvent {
            error: "boom".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, serde_json::json!({"error": "boom"}));
    }
}
