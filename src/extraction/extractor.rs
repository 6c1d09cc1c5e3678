//! Policy extraction over a [`ChatClient`] with retry and model fallback.
//!
//! Every call site gets an [`ExtractionOutcome`]; service failures are turned
//! into [`ExtractionOutcome::Failed`] so one document never aborts its siblings.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::ChatClient;
use super::error::ExtractionServiceError;
use super::prompts::{
    NO_COOKIE_POLICY_SENTINEL, NO_INFORMATION_SENTINEL, NOT_FOUND_SENTINEL,
    combined_system_prompt, cookie_from_privacy_system_prompt, is_sentinel_reply,
    single_system_prompt, user_prompt,
};
use super::retry::RetryPolicy;
use super::splitter::split_combined;
use super::types::{ChatRequest, Message};
use crate::config::{ModelStrategy, ScrapeConfig};
use crate::content::truncate_content;
use crate::discovery::DocumentKind;
use crate::utils::{
    DEFAULT_FALLBACK_MODEL, DEFAULT_LLM_FALLBACK_TIMEOUT_SECS, DEFAULT_LLM_TIMEOUT_SECS,
    DEFAULT_MAX_TOKENS, DEFAULT_PRIMARY_MODEL, MAX_CONTENT_CHARS,
};

/// What an extraction call is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Single(DocumentKind),
    /// Privacy and cookie sections from one shared page
    Combined,
    /// Cookie sections carved out of privacy text
    CookieFromPrivacy,
}

impl ExtractionKind {
    fn system_prompt(self) -> String {
        match self {
            Self::Single(kind) => single_system_prompt(kind),
            Self::Combined => combined_system_prompt(),
            Self::CookieFromPrivacy => cookie_from_privacy_system_prompt(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Single(kind) => kind.label(),
            Self::Combined => "privacy and cookie policy",
            Self::CookieFromPrivacy => "cookie section of the privacy policy",
        }
    }
}

/// One extraction call: kind, size-capped source text and its retry budget.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub kind: ExtractionKind,
    pub source_text: String,
    pub retry: RetryPolicy,
}

impl ExtractionRequest {
    pub fn new(kind: ExtractionKind, source_text: &str) -> Self {
        Self {
            kind,
            source_text: truncate_content(source_text, MAX_CONTENT_CHARS),
            retry: RetryPolicy::for_kind(kind),
        }
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum ExtractionOutcome {
    /// Document text, trimmed
    Found(String),
    /// The service reported the document absent
    NotFound,
    /// Navigation or extraction failed; carries a readable reason
    Failed(String),
}

impl ExtractionOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            _ => None,
        }
    }

    /// Interpret a raw reply: trimmed, and `NotFound` when it is a sentinel.
    fn from_reply(reply: &str, sentinels: &[&str]) -> Self {
        if is_sentinel_reply(reply, sentinels) {
            Self::NotFound
        } else {
            Self::Found(reply.trim().to_string())
        }
    }

    /// Plain-string form for API consumers.
    #[must_use]
    pub fn render(&self, kind: DocumentKind) -> String {
        match self {
            Self::Found(text) => text.clone(),
            Self::NotFound => format!("No {} found on the page.", kind.label()),
            Self::Failed(reason) => format!("Failed to extract {}: {}", kind.label(), reason),
        }
    }
}

/// Privacy and cookie outcomes from a combined page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedOutcome {
    pub privacy: ExtractionOutcome,
    pub cookie: ExtractionOutcome,
    /// The cookie text came from a cookie-from-privacy call
    pub cookie_derived: bool,
}

/// Extraction settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub models: ModelStrategy,
    pub max_tokens: u32,
    pub primary_timeout: Duration,
    pub fallback_timeout: Duration,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            models: ModelStrategy::new(DEFAULT_PRIMARY_MODEL, DEFAULT_FALLBACK_MODEL),
            max_tokens: DEFAULT_MAX_TOKENS,
            primary_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            fallback_timeout: Duration::from_secs(DEFAULT_LLM_FALLBACK_TIMEOUT_SECS),
        }
    }
}

impl From<&ScrapeConfig> for ExtractorSettings {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            models: config.models().clone(),
            max_tokens: config.max_tokens(),
            primary_timeout: config.llm_timeout(false),
            fallback_timeout: config.llm_timeout(true),
        }
    }
}

/// Turns cleaned page text into compliance documents.
pub struct PolicyExtractor<C> {
    client: C,
    settings: ExtractorSettings,
}

impl<C: ChatClient> PolicyExtractor<C> {
    pub fn new(client: C, settings: ExtractorSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_config(client: C, config: &ScrapeConfig) -> Self {
        Self::new(client, ExtractorSettings::from(config))
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn build_request(&self, request: &ExtractionRequest, use_fallback: bool) -> ChatRequest {
        let timeout = if use_fallback {
            self.settings.fallback_timeout
        } else {
            self.settings.primary_timeout
        };
        ChatRequest::new(self.settings.models.select(use_fallback))
            .message(Message::system(request.kind.system_prompt()))
            .message(Message::user(user_prompt(&request.source_text)))
            .temperature(0.0)
            .max_tokens(self.settings.max_tokens)
            .timeout(timeout)
    }

    /// Send `request` under its retry budget.
    ///
    /// Rate limits and timeouts are retried after [`super::backoff_delay`]. A
    /// timeout also moves later attempts to the fallback model and timeout.
    /// Any other error stops immediately.
    pub async fn complete(
        &self,
        request: &ExtractionRequest,
    ) -> Result<String, ExtractionServiceError> {
        let mut use_fallback = false;
        let mut last_error = ExtractionServiceError::EmptyResponse;

        for attempt in 0..request.retry.max_attempts {
            if let Some(delay) = request.retry.delay_before(attempt) {
                debug!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    "Backing off before extraction retry"
                );
                tokio::time::sleep(delay).await;
            }

            let chat = self.build_request(request, use_fallback);
            let model = chat.model.clone();
            match self.client.chat_completion(chat).await {
                Ok(reply) => {
                    debug!(kind = request.kind.label(), %model, attempt, "Extraction succeeded");
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        kind = request.kind.label(),
                        %model,
                        attempt,
                        error = %e,
                        "Retryable extraction failure"
                    );
                    if e.is_timeout() && !use_fallback {
                        info!(
                            fallback = %self.settings.models.fallback,
                            "Switching to fallback model after timeout"
                        );
                        use_fallback = true;
                    }
                    last_error = e;
                }
                Err(e) => {
                    warn!(kind = request.kind.label(), %model, error = %e, "Extraction failed");
                    return Err(e);
                }
            }
        }

        Err(last_error)
    }

    fn failure_detail(request: &ExtractionRequest, error: &ExtractionServiceError) -> String {
        if error.is_retryable() {
            format!("{error} (after {} attempts)", request.retry.max_attempts)
        } else {
            error.to_string()
        }
    }

    /// Extract one document of `kind` from cleaned page text.
    pub async fn extract(&self, kind: DocumentKind, text: &str) -> ExtractionOutcome {
        let request = ExtractionRequest::new(ExtractionKind::Single(kind), text);
        match self.complete(&request).await {
            Ok(reply) => ExtractionOutcome::from_reply(&reply, &[NOT_FOUND_SENTINEL]),
            Err(e) => ExtractionOutcome::Failed(Self::failure_detail(&request, &e)),
        }
    }

    /// Carve cookie sections out of privacy text.
    pub async fn derive_cookie_from_privacy(&self, privacy_text: &str) -> ExtractionOutcome {
        let request = ExtractionRequest::new(ExtractionKind::CookieFromPrivacy, privacy_text);
        match self.complete(&request).await {
            Ok(reply) => ExtractionOutcome::from_reply(
                &reply,
                &[NO_INFORMATION_SENTINEL, NOT_FOUND_SENTINEL],
            ),
            Err(e) => ExtractionOutcome::Failed(Self::failure_detail(&request, &e)),
        }
    }

    /// Extract privacy and cookie documents from one shared page with a single call.
    ///
    /// When the cookie section is missing or says there is no dedicated cookie
    /// policy, a cookie-from-privacy call runs on the privacy text and its
    /// result replaces the cookie section if it found anything.
    pub async fn extract_combined(&self, text: &str) -> CombinedOutcome {
        let request = ExtractionRequest::new(ExtractionKind::Combined, text);
        let reply = match self.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                let detail = Self::failure_detail(&request, &e);
                return CombinedOutcome {
                    privacy: ExtractionOutcome::Failed(detail.clone()),
                    cookie: ExtractionOutcome::Failed(detail),
                    cookie_derived: false,
                };
            }
        };

        if is_sentinel_reply(&reply, &[NOT_FOUND_SENTINEL]) {
            return CombinedOutcome {
                privacy: ExtractionOutcome::NotFound,
                cookie: ExtractionOutcome::NotFound,
                cookie_derived: false,
            };
        }

        let split = split_combined(&reply);
        let privacy = split
            .privacy
            .as_deref()
            .map_or(ExtractionOutcome::NotFound, |p| {
                ExtractionOutcome::from_reply(p, &[NOT_FOUND_SENTINEL])
            });
        let cookie_missing = split
            .cookie
            .as_deref()
            .is_none_or(|c| c.contains(NO_COOKIE_POLICY_SENTINEL) || c.contains(NOT_FOUND_SENTINEL));

        if !cookie_missing {
            let cookie = split
                .cookie
                .map_or(ExtractionOutcome::NotFound, ExtractionOutcome::Found);
            return CombinedOutcome {
                privacy,
                cookie,
                cookie_derived: false,
            };
        }

        let Some(privacy_text) = privacy.text() else {
            return CombinedOutcome {
                privacy,
                cookie: ExtractionOutcome::NotFound,
                cookie_derived: false,
            };
        };

        debug!("Combined reply has no cookie section, deriving from privacy text");
        match self.derive_cookie_from_privacy(privacy_text).await {
            derived @ ExtractionOutcome::Found(_) => CombinedOutcome {
                privacy,
                cookie: derived,
                cookie_derived: true,
            },
            ExtractionOutcome::NotFound => CombinedOutcome {
                privacy,
                cookie: ExtractionOutcome::NotFound,
                cookie_derived: false,
            },
            failed @ ExtractionOutcome::Failed(_) => {
                warn!("Cookie derivation from combined privacy text failed");
                CombinedOutcome {
                    privacy,
                    cookie: failed,
                    cookie_derived: false,
                }
            }
        }
    }
}
