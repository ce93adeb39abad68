//! Fixed-TTL cache for the upstream model list

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{error::UpstreamError, provider::CompletionProvider, types::ModelInfo};

/// Result of a cache lookup
#[derive(Debug, Clone)]
pub struct CachedModels {
    pub models: Arc<Vec<ModelInfo>>,
    /// Whether the list was served without contacting the upstream
    pub cached: bool,
}

struct Entry {
    fetched_at: Instant,
    models: Arc<Vec<ModelInfo>>,
}

/// Model list cache with a fixed freshness window
///
/// A failed refresh leaves the previous entry in place.
pub struct ModelCache {
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl ModelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Return the cached list if still fresh, otherwise fetch through `provider`
    pub async fn get_or_fetch(
        &self,
        provider: &dyn CompletionProvider,
    ) -> Result<CachedModels, UpstreamError> {
        // Held across the fetch so concurrent misses share one upstream call
        let mut entry = self.entry.lock().await;

        if let Some(current) = entry.as_ref() {
            let age = current.fetched_at.elapsed();
            if age < self.ttl {
                tracing::info!(age_secs = age.as_secs(), "Returning cached models");
                return Ok(CachedModels {
                    models: current.models.clone(),
                    cached: true,
                });
            }
        }

        let models = Arc::new(provider.list_models().await?);
        *entry = Some(Entry {
            fetched_at: Instant::now(),
            models: models.clone(),
        });

        Ok(CachedModels {
            models,
            cached: false,
        })
    }
}
