use uuid::Uuid;

/// Lifecycle of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
    Failed,
}

/// Ephemeral state of one relayed stream. Never persisted.
#[derive(Debug)]
pub struct StreamSession {
    conversation_id: Uuid,
    model: String,
    buffer: String,
    chunk_count: usize,
    state: SessionState,
}

impl StreamSession {
    pub fn new(conversation_id: Uuid, model: impl Into<String>) -> Self {
        Self {
            conversation_id,
            model: model.into(),
            buffer: String::new(),
            chunk_count: 0,
            state: SessionState::Active,
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record a forwarded delta
    pub fn push_delta(&mut self, delta: &str) {
        debug_assert_eq!(self.state, SessionState::Active);
        self.buffer.push_str(delta);
        self.chunk_count += 1;
        tracing::debug!(
            conversation_id = %self.conversation_id,
            chunk = self.chunk_count,
            chars = delta.len(),
            "Forwarding chunk"
        );
    }

    /// Finish successfully once the buffered reply has been committed
    pub fn complete(&mut self) {
        self.state = SessionState::Completed;
    }

    /// Finish unsuccessfully, discarding the accumulated text
    pub fn fail(&mut self) {
        self.state = SessionState::Failed;
        self.buffer.clear();
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            tracing::info!(
                conversation_id = %self.conversation_id,
                chunks = self.chunk_count,
                "Client disconnected mid-stream, discarding partial response"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_deltas_in_order() {
        let mut session = StreamSession::new(Uuid::new_v4(), "m1");
        session.push_delta("Hel");
        session.push_delta("lo!");

        assert_eq!(session.buffer(), "Hello!");
        assert_eq!(session.chunk_count(), 2);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_complete_keeps_buffer() {
        let mut session = StreamSession::new(Uuid::new_v4(), "m1");
        session.push_delta("Hello!");
        session.complete();

        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.buffer(), "Hello!");
    }

    #[test]
    fn test_fail_discards_buffer() {
        let mut session = StreamSession::new(Uuid::new_v4(), "m1");
        session.push_delta("partial");
        session.fail();

        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.buffer(), "");
        assert_eq!(session.model(), "m1");
    }
}
