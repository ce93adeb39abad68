//! Per-conversation exclusivity for streams

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Set of conversations that currently have a stream in flight
#[derive(Debug, Clone, Default)]
pub struct ActiveStreams {
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

impl ActiveStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the stream slot for a conversation
    ///
    /// Returns `None` if another stream already holds it. The slot is released
    /// when the returned guard is dropped.
    pub fn try_claim(&self, conversation_id: Uuid) -> Option<StreamGuard> {
        if !self.lock().insert(conversation_id) {
            return None;
        }
        Some(StreamGuard {
            conversation_id,
            active: self.clone(),
        })
    }

    pub fn is_active(&self, conversation_id: Uuid) -> bool {
        self.lock().contains(&conversation_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        // The set stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive claim on a conversation's stream slot
#[derive(Debug)]
pub struct StreamGuard {
    conversation_id: Uuid,
    active: ActiveStreams,
}

impl StreamGuard {
    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.conversation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_conflicts() {
        let active = ActiveStreams::new();
        let id = Uuid::new_v4();

        let guard = active.try_claim(id);
        assert!(guard.is_some());
        assert!(active.try_claim(id).is_none());
        assert!(active.is_active(id));
    }

    #[test]
    fn test_drop_releases_slot() {
        let active = ActiveStreams::new();
        let id = Uuid::new_v4();

        let guard = active.try_claim(id).unwrap();
        assert_eq!(guard.conversation_id(), id);
        drop(guard);

        assert!(!active.is_active(id));
        assert!(active.try_claim(id).is_some());
    }

    #[test]
    fn test_conversations_are_independent() {
        let active = ActiveStreams::new();
        let _a = active.try_claim(Uuid::new_v4()).unwrap();
        let _b = active.try_claim(Uuid::new_v4()).unwrap();
        assert_eq!(active.len(), 2);
    }
}
