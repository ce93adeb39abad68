//! OpenRouter client implementation

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use crate::config::UpstreamSettings;

use super::{
    error::UpstreamError,
    lines::LineBuffer,
    provider::{CompletionProvider, LineStream},
    types::{ChatCompletionRequest, ChatMessage, ModelInfo, ModelListResponse},
};

/// Client for an OpenRouter-compatible chat completions API
pub struct OpenRouterClient {
    /// HTTP client for making requests
    http_client: Client,
    settings: UpstreamSettings,
}

impl OpenRouterClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built. A missing API key
    /// is not an error here; it is reported per request.
    pub fn new(settings: UpstreamSettings) -> Result<Self, UpstreamError> {
        let http_client = Client::builder()
            .connect_timeout(settings.stream_timeout)
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    /// Build the URL for an API path
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.settings.api_key.as_deref().ok_or_else(|| {
            tracing::error!("OPENROUTER_API_KEY not configured");
            UpstreamError::Configuration(
                "OPENROUTER_API_KEY not configured. Please check your .env file.".to_string(),
            )
        })
    }

    /// Attach credentials and attribution headers
    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.app_url)
            .header("X-Title", &self.settings.app_title)
    }

    /// Turn a non-2xx response into an error carrying its body
    async fn check_status(response: Response, limit: Duration) -> Result<Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = tokio::time::timeout(limit, response.text())
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "HTTP error from upstream");
        Err(UpstreamError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn open_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LineStream, UpstreamError> {
        let api_key = self.api_key()?;
        let timeout = self.settings.stream_timeout;

        tracing::info!(model, message_count = messages.len(), "Starting upstream stream");

        let body = ChatCompletionRequest {
            model,
            messages,
            stream: true,
        };
        let request = self
            .authorize(self.http_client.post(self.endpoint("chat/completions")), api_key)
            .json(&body);

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| UpstreamError::Timeout(timeout))?
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;
        let response = Self::check_status(response, timeout).await?;

        tracing::debug!("Upstream stream established");

        let mut byte_stream = Box::pin(response.bytes_stream());
        let lines = stream! {
            let mut buffer = LineBuffer::new();
            loop {
                let next = match tokio::time::timeout(timeout, byte_stream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        yield Err(UpstreamError::Timeout(timeout));
                        return;
                    }
                };

                match next {
                    Some(Ok(chunk)) => {
                        for line in buffer.push(&chunk) {
                            yield Ok(line);
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(UpstreamError::from_reqwest(e, timeout));
                        return;
                    }
                    None => {
                        if let Some(line) = buffer.finish() {
                            yield Ok(line);
                        }
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(lines))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, UpstreamError> {
        let api_key = self.api_key()?;
        let timeout = self.settings.models_timeout;

        tracing::info!("Fetching available models from upstream");

        let response = self
            .authorize(self.http_client.get(self.endpoint("models")), api_key)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;
        let response = Self::check_status(response, timeout).await?;

        let body: ModelListResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        tracing::info!(count = body.data.len(), "Retrieved models from upstream");
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> UpstreamSettings {
        UpstreamSettings {
            api_key: api_key.map(String::from),
            base_url: "http://127.0.0.1:9/api/v1/".to_string(),
            ..UpstreamSettings::default()
        }
    }

    #[test]
    fn test_endpoint_url_format() {
        let client = OpenRouterClient::new(settings(Some("sk-test"))).unwrap();
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://127.0.0.1:9/api/v1/chat/completions"
        );
        assert_eq!(client.endpoint("models"), "http://127.0.0.1:9/api/v1/models");
    }

    #[test]
    fn test_is_configured() {
        assert!(OpenRouterClient::new(settings(Some("sk-test")))
            .unwrap()
            .is_configured());
        assert!(!OpenRouterClient::new(settings(None)).unwrap().is_configured());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = OpenRouterClient::new(settings(None)).unwrap();
        let messages = vec![ChatMessage {
            role: crate::conversation::Role::User,
            content: "Hi".to_string(),
        }];

        let result = client.open_stream(&messages, "m1").await;
        assert!(matches!(result, Err(UpstreamError::Configuration(_))));

        let result = client.list_models().await;
        assert!(matches!(result, Err(UpstreamError::Configuration(_))));
    }
}
