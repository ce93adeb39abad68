//! Conversation state
//!
//! Conversations own an append-only sequence of messages. The relay engine
//! reads the history through [`ConversationStore`] and appends exactly one
//! assistant message per completed stream.

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::ConversationError;
pub use memory::InMemoryStore;
pub use store::ConversationStore;
pub use types::{Conversation, ConversationSummary, Message, Role};
