//! Core configuration types for a scraping run
//!
//! `ScrapeConfig` selects the navigation policy and model strategy that
//! parameterize the single pipeline, plus the timeouts bounding every
//! browser and extraction-service call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::navigator::NavigationPolicy;

/// Which models the extraction client uses.
///
/// The fallback model takes over once the primary model timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStrategy {
    pub primary: String,
    pub fallback: String,
}

impl ModelStrategy {
    pub fn new(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Model to use given whether the fallback has been triggered.
    #[must_use]
    pub fn select(&self, use_fallback: bool) -> &str {
        if use_fallback { &self.fallback } else { &self.primary }
    }
}

/// Main configuration struct for compliance scraping
#[derive(Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Bearer token for the extraction service. Never serialized.
    #[serde(skip)]
    pub(crate) api_key: String,
    pub(crate) api_base_url: String,
    pub(crate) models: ModelStrategy,

    /// Policy used for primary navigations (root page and resolved links).
    ///
    /// On failure the other policy is tried once.
    pub(crate) navigation_policy: NavigationPolicy,

    /// Timeout for the fast policy. Default: 15 seconds
    pub(crate) fast_timeout_secs: u64,

    /// Timeout for the patient policy. Default: 60 seconds
    pub(crate) patient_timeout_secs: u64,

    /// Bound on consent-banner dismissal. Default: 1500 ms
    pub(crate) consent_timeout_ms: u64,

    /// Request timeout for the primary model. Default: 60 seconds
    pub(crate) llm_timeout_secs: u64,

    /// Request timeout once the fallback model is in use. Default: 120 seconds
    pub(crate) llm_fallback_timeout_secs: u64,

    pub(crate) max_tokens: u32,
    pub(crate) max_secondary_pages: usize,
    pub(crate) headless: bool,

    /// Explicit Chrome/Chromium executable; discovered when unset.
    pub(crate) chrome_executable: Option<PathBuf>,

    /// Address the HTTP endpoint binds to.
    pub(crate) bind_addr: String,
}

impl std::fmt::Debug for ScrapeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("models", &self.models)
            .field("navigation_policy", &self.navigation_policy)
            .field("fast_timeout_secs", &self.fast_timeout_secs)
            .field("patient_timeout_secs", &self.patient_timeout_secs)
            .field("consent_timeout_ms", &self.consent_timeout_ms)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_fallback_timeout_secs", &self.llm_fallback_timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("max_secondary_pages", &self.max_secondary_pages)
            .field("headless", &self.headless)
            .field("chrome_executable", &self.chrome_executable)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl ScrapeConfig {
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn models(&self) -> &ModelStrategy {
        &self.models
    }

    #[must_use]
    pub fn navigation_policy(&self) -> NavigationPolicy {
        self.navigation_policy
    }

    #[must_use]
    pub fn navigation_timeout(&self, policy: NavigationPolicy) -> Duration {
        match policy {
            NavigationPolicy::Fast => Duration::from_secs(self.fast_timeout_secs),
            NavigationPolicy::Patient => Duration::from_secs(self.patient_timeout_secs),
        }
    }

    #[must_use]
    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }

    /// Extraction request timeout for the primary or the fallback model.
    #[must_use]
    pub fn llm_timeout(&self, use_fallback: bool) -> Duration {
        if use_fallback {
            Duration::from_secs(self.llm_fallback_timeout_secs)
        } else {
            Duration::from_secs(self.llm_timeout_secs)
        }
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    #[must_use]
    pub fn max_secondary_pages(&self) -> usize {
        self.max_secondary_pages
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&Path> {
        self.chrome_executable.as_deref()
    }

    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
}
