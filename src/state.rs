// Process-scoped services shared by all request handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::conversation::{ConversationStore, InMemoryStore};
use crate::llm::{CompletionProvider, ModelCache, OpenRouterClient, UpstreamError};
use crate::relay::{RelayEngine, RelayOptions};

/// Created once at startup and cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ConversationStore>,
    pub provider: Arc<dyn CompletionProvider>,
    pub relay: Arc<RelayEngine>,
    pub models: Arc<ModelCache>,
}

impl AppState {
    /// Wire the services around an existing store and provider
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let relay = RelayEngine::new(
            store.clone(),
            provider.clone(),
            RelayOptions {
                complete_on_unterminated_close: config.complete_on_unterminated_close,
            },
        );
        let models = ModelCache::new(config.models_cache_ttl);

        Self {
            config: Arc::new(config),
            store,
            provider,
            relay: Arc::new(relay),
            models: Arc::new(models),
        }
    }

    /// In-memory store plus the OpenRouter client described by `config`
    pub fn from_config(config: AppConfig) -> Result<Self, UpstreamError> {
        let store = Arc::new(InMemoryStore::new(config.default_model.clone()));
        let provider = Arc::new(OpenRouterClient::new(config.upstream.clone())?);
        Ok(Self::new(config, store, provider))
    }
}
