//! Provider trait for upstream implementations

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::{
    error::UpstreamError,
    types::{ChatMessage, ModelInfo},
};

/// Raw event-stream lines of one upstream completion, in arrival order
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// Interface the relay engine uses to reach the completion upstream
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Whether credentials are present. Checked before a stream is admitted.
    fn is_configured(&self) -> bool;

    /// Open a streaming completion over the full conversation history
    ///
    /// Returns once the upstream has accepted the request with a 2xx status.
    /// The returned stream yields raw lines; dropping it closes the upstream
    /// connection.
    async fn open_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LineStream, UpstreamError>;

    /// Fetch the upstream model catalogue
    async fn list_models(&self) -> Result<Vec<ModelInfo>, UpstreamError>;
}
