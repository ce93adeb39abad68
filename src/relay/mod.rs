//! Streaming relay engine
//!
//! One [`RelayEngine::start`] call drives one stream through
//! `Idle -> Streaming -> {Completed, Failed}`:
//!
//! - Admission checks (conversation exists, history non-empty, credentials
//!   present, no other stream on the conversation) fail synchronously and
//!   never touch the upstream.
//! - Every content delta is forwarded as its own event and appended to the
//!   session buffer.
//! - On the terminal frame the buffer is committed as exactly one assistant
//!   message, then `Done` is emitted.
//! - Any failure emits a single `Error` event and commits nothing. Dropping
//!   the stream (client disconnect) closes the upstream and commits nothing.
//!
//! HTTP clients get the events through [`spawn_forwarder`], which runs the
//! stream on its own task and stops it when the client goes away.

mod error;
mod guard;
mod session;

pub use error::RelayError;
pub use guard::{ActiveStreams, StreamGuard};
pub use session::{SessionState, StreamSession};

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::conversation::{ConversationError, ConversationStore};
use crate::llm::{decode_line, ChatMessage, CompletionProvider, Frame};

/// Events produced for the client, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One upstream content delta, verbatim
    Content(String),
    /// The reply was committed under this message id. Terminal.
    Done { message_id: Uuid },
    /// The stream failed and nothing was committed. Terminal.
    Error(String),
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Content(_))
    }
}

pub type RelayStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send>>;

/// Events buffered between a relay task and a slow client
pub const CLIENT_BUFFER: usize = 32;

/// Behavior switches for the relay engine
#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    /// Treat an upstream close without `[DONE]` as a completed stream
    pub complete_on_unterminated_close: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            complete_on_unterminated_close: true,
        }
    }
}

/// Orchestrates upstream streaming and conversation commits
pub struct RelayEngine {
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    active: ActiveStreams,
    options: RelayOptions,
}

impl RelayEngine {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        options: RelayOptions,
    ) -> Self {
        Self {
            store,
            provider,
            active: ActiveStreams::new(),
            options,
        }
    }

    /// Conversations that currently have a stream in flight
    pub fn active_streams(&self) -> &ActiveStreams {
        &self.active
    }

    /// Admit a stream for a conversation and return its event stream
    ///
    /// `model_override` wins over the latest user message's override, which
    /// wins over the conversation default.
    ///
    /// # Errors
    ///
    /// `NotFound`, `BadRequest`, `Configuration` or `Conflict`; in all cases no
    /// upstream request has been made.
    pub async fn start(
        &self,
        conversation_id: Uuid,
        model_override: Option<String>,
    ) -> Result<RelayStream, RelayError> {
        let conversation = self.store.get(conversation_id).await?;

        if conversation.messages.is_empty() {
            return Err(RelayError::BadRequest(
                "No messages in conversation".to_string(),
            ));
        }

        if !self.provider.is_configured() {
            return Err(RelayError::Configuration(
                "OPENROUTER_API_KEY not configured".to_string(),
            ));
        }

        let guard = self
            .active
            .try_claim(conversation_id)
            .ok_or(RelayError::Conflict(conversation_id))?;

        let model = model_override
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| conversation.effective_model().to_string());
        let history: Vec<ChatMessage> = conversation.messages.iter().map(ChatMessage::from).collect();

        tracing::info!(
            conversation_id = %conversation_id,
            model = %model,
            history = history.len(),
            "Streaming response"
        );

        Ok(Box::pin(relay(
            self.store.clone(),
            self.provider.clone(),
            self.options,
            StreamSession::new(conversation_id, model),
            history,
            guard,
        )))
    }
}

/// Drive a relay stream on its own task, handing events out through a channel
///
/// The task stops once the receiving side is dropped. Dropping the relay
/// stream closes the upstream connection and commits nothing.
pub fn spawn_forwarder(mut events: RelayStream) -> ReceiverStream<RelayEvent> {
    let (tx, rx) = mpsc::channel(CLIENT_BUFFER);

    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                _ = tx.closed() => break,
                next = events.next() => next,
            };
            let Some(event) = next else {
                break;
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}

fn relay(
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    options: RelayOptions,
    mut session: StreamSession,
    history: Vec<ChatMessage>,
    guard: StreamGuard,
) -> impl Stream<Item = RelayEvent> + Send + 'static {
    stream! {
        let terminal = 'relay: {
            let opened = provider.open_stream(&history, session.model()).await;
            let mut lines = match opened {
                Ok(lines) => lines,
                Err(e) => break 'relay fail(&mut session, e.into()),
            };

            let mut terminated = false;
            while let Some(line) = lines.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => break 'relay fail(&mut session, e.into()),
                };

                match decode_line(&line) {
                    Frame::ContentDelta(text) => {
                        session.push_delta(&text);
                        yield RelayEvent::Content(text);
                    }
                    Frame::Terminal => {
                        terminated = true;
                        break;
                    }
                    Frame::Skip => {}
                    Frame::Malformed(excerpt) => {
                        tracing::warn!(
                            conversation_id = %session.conversation_id(),
                            payload = %excerpt,
                            "Failed to parse upstream chunk"
                        );
                    }
                }
            }
            // Close the upstream connection before committing
            drop(lines);

            if !terminated {
                if !options.complete_on_unterminated_close {
                    break 'relay fail(
                        &mut session,
                        RelayError::Internal(
                            "Upstream closed the stream before completion".to_string(),
                        ),
                    );
                }
                tracing::warn!(
                    conversation_id = %session.conversation_id(),
                    "Upstream closed without terminal frame, keeping buffered response"
                );
            }

            let conversation_id = session.conversation_id();
            let model = session.model().to_string();
            let content = session.buffer().to_string();

            match store.append_assistant_message(conversation_id, content, model).await {
                Ok(message) => {
                    session.complete();
                    tracing::info!(
                        conversation_id = %conversation_id,
                        message_id = %message.id,
                        chunks = session.chunk_count(),
                        "Completed streaming"
                    );
                    RelayEvent::Done { message_id: message.id }
                }
                Err(ConversationError::NotFound(_)) => fail(
                    &mut session,
                    RelayError::Internal("Conversation was deleted while streaming".to_string()),
                ),
                Err(e) => fail(&mut session, RelayError::Internal(e.to_string())),
            }
        };

        // Free the slot before the client can observe the terminal event
        drop(guard);
        yield terminal;
    }
}

fn fail(session: &mut StreamSession, err: RelayError) -> RelayEvent {
    session.fail();
    tracing::error!(
        conversation_id = %session.conversation_id(),
        error = %err,
        "Stream failed"
    );
    RelayEvent::Error(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(!RelayEvent::Content("x".to_string()).is_terminal());
        assert!(RelayEvent::Done {
            message_id: Uuid::nil()
        }
        .is_terminal());
        assert!(RelayEvent::Error("boom".to_string()).is_terminal());
    }

    #[test]
    fn test_default_options_complete_unterminated_streams() {
        assert!(RelayOptions::default().complete_on_unterminated_close);
    }
}
