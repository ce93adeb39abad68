//! Process configuration
//!
//! Everything is read once at startup from the environment (optionally
//! seeded from a `.env` file). Values that are set but empty count as unset.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_APP_TITLE: &str = "Open Chat API";
pub const DEFAULT_APP_URL: &str = "http://localhost:8001";
pub const DEFAULT_PORT: u16 = 8001;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Settings for the upstream chat-completions aggregator
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Bearer credential; requests fail with a configuration error while unset
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` and `/models` are appended
    pub base_url: String,
    /// Sent as `X-Title`
    pub app_title: String,
    /// Sent as `HTTP-Referer`
    pub app_url: String,
    /// Connect timeout, and the longest wait for the next chunk of a stream
    pub stream_timeout: Duration,
    /// Overall timeout for the model list request
    pub models_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            stream_timeout: Duration::from_secs(60),
            models_timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamSettings,
    /// Model for conversations created without one
    pub default_model: String,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Freshness window of the cached model list
    pub models_cache_ttl: Duration,
    /// Commit the buffered reply when the upstream closes without `[DONE]`
    pub complete_on_unterminated_close: bool,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamSettings::default(),
            default_model: DEFAULT_MODEL.to_string(),
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            models_cache_ttl: Duration::from_secs(3600),
            complete_on_unterminated_close: true,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host: IpAddr = parse_or(&get, "HOST", defaults.listen_addr.ip())?;
        let port: u16 = parse_or(&get, "PORT", DEFAULT_PORT)?;

        let upstream = UpstreamSettings {
            api_key: get("OPENROUTER_API_KEY"),
            base_url: get("OPENROUTER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream.base_url),
            app_title: get("APP_TITLE").unwrap_or(defaults.upstream.app_title),
            app_url: get("APP_URL").unwrap_or(defaults.upstream.app_url),
            stream_timeout: Duration::from_secs(parse_or(&get, "UPSTREAM_TIMEOUT_SECS", 60)?),
            models_timeout: Duration::from_secs(parse_or(&get, "MODELS_TIMEOUT_SECS", 10)?),
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|origin| {
                    if origin.starts_with("http://") || origin.starts_with("https://") {
                        Ok(origin.to_string())
                    } else {
                        Err(ConfigError::Invalid {
                            key: "CORS_ORIGINS".to_string(),
                            value: origin.to_string(),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            upstream,
            default_model: get("MODEL_NAME").unwrap_or(defaults.default_model),
            listen_addr: SocketAddr::new(host, port),
            models_cache_ttl: Duration::from_secs(parse_or(&get, "MODELS_CACHE_TTL_SECS", 3600)?),
            complete_on_unterminated_close: parse_or(
                &get,
                "COMPLETE_ON_UNTERMINATED_CLOSE",
                defaults.complete_on_unterminated_close,
            )?,
            cors_origins,
        })
    }

    /// Set the upstream API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.upstream.api_key = Some(api_key.into());
        self
    }

    /// Set the upstream base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.upstream.base_url = base_url.into();
        self
    }

    /// Set the process-wide default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}
