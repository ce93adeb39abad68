//! Upstream layer
//!
//! Talks to an OpenRouter-compatible aggregator: opens streaming chat
//! completions, splits the response into lines and decodes each line into a
//! [`Frame`].

pub mod cache;
pub mod client;
pub mod error;
pub mod frame;
pub mod lines;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use cache::{CachedModels, ModelCache};
pub use client::OpenRouterClient;
pub use error::UpstreamError;
pub use frame::{decode_line, Frame};
pub use provider::{CompletionProvider, LineStream};
pub use types::{ChatMessage, ModelInfo};
