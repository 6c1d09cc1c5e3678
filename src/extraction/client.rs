//! Chat-completion client for an OpenAI-compatible text-extraction service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::error::{ExtractionServiceError, Result};
use super::types::{ChatRequest, ChatResponseRaw};
use crate::config::ScrapeConfig;

/// The single contract the pipeline needs from a text-extraction provider.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `request` and return the completion text.
    ///
    /// Rate limiting and timeouts must be reported as
    /// [`ExtractionServiceError::RateLimited`] and
    /// [`ExtractionServiceError::Timeout`] respectively.
    async fn chat_completion(&self, request: ChatRequest) -> Result<String>;
}

/// reqwest-backed client for `POST {base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiChatClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::utils::DEFAULT_API_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(config.api_key()).with_base_url(config.api_base_url())
    }

    /// Set a custom base URL (for proxies, compatible providers, test servers).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn timeout_secs(request: &ChatRequest) -> u64 {
    request.timeout.map(|t| t.as_secs()).unwrap_or_default()
}

fn map_transport_error(e: &reqwest::Error, request: &ChatRequest) -> ExtractionServiceError {
    if e.is_timeout() {
        ExtractionServiceError::Timeout {
            secs: timeout_secs(request),
        }
    } else {
        ExtractionServiceError::Network(e.to_string())
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn chat_completion(&self, request: ChatRequest) -> Result<String> {
        let start = std::time::Instant::now();

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, model = %request.model, "Extraction request failed");
            map_transport_error(&e, &request)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Extraction service error");
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ExtractionServiceError::RateLimited(error_text),
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    ExtractionServiceError::Timeout {
                        secs: timeout_secs(&request),
                    }
                }
                _ => ExtractionServiceError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let raw: ChatResponseRaw = response.json().await.map_err(|e| {
            if e.is_timeout() {
                map_transport_error(&e, &request)
            } else {
                ExtractionServiceError::Parse(e.to_string())
            }
        })?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExtractionServiceError::EmptyResponse)?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            chars = content.len(),
            "Chat completion"
        );

        Ok(content)
    }
}
