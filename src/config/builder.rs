//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! The extraction service cannot be reached without a key, so `build()` only
//! exists once `api_key()` has been called.

use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{ModelStrategy, ScrapeConfig};
use crate::navigator::NavigationPolicy;
use crate::utils::{
    DEFAULT_API_BASE_URL, DEFAULT_BIND_ADDR, DEFAULT_CONSENT_TIMEOUT_MS, DEFAULT_FALLBACK_MODEL,
    DEFAULT_FAST_TIMEOUT_SECS, DEFAULT_LLM_FALLBACK_TIMEOUT_SECS, DEFAULT_LLM_TIMEOUT_SECS,
    DEFAULT_MAX_TOKENS, DEFAULT_PATIENT_TIMEOUT_SECS, DEFAULT_PRIMARY_MODEL, MAX_SECONDARY_PAGES,
};

// Type states for the builder
pub struct WithApiKey;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) api_key: Option<String>,
    pub(crate) api_base_url: String,
    pub(crate) primary_model: String,
    pub(crate) fallback_model: String,
    pub(crate) navigation_policy: NavigationPolicy,
    pub(crate) fast_timeout_secs: u64,
    pub(crate) patient_timeout_secs: u64,
    pub(crate) consent_timeout_ms: u64,
    pub(crate) llm_timeout_secs: u64,
    pub(crate) llm_fallback_timeout_secs: u64,
    pub(crate) max_tokens: u32,
    pub(crate) max_secondary_pages: usize,
    pub(crate) headless: bool,
    pub(crate) chrome_executable: Option<PathBuf>,
    pub(crate) bind_addr: String,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            navigation_policy: NavigationPolicy::Fast,
            fast_timeout_secs: DEFAULT_FAST_TIMEOUT_SECS,
            patient_timeout_secs: DEFAULT_PATIENT_TIMEOUT_SECS,
            consent_timeout_ms: DEFAULT_CONSENT_TIMEOUT_MS,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            llm_fallback_timeout_secs: DEFAULT_LLM_FALLBACK_TIMEOUT_SECS,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_secondary_pages: MAX_SECONDARY_PAGES,
            headless: true,
            chrome_executable: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl<State> ScrapeConfigBuilder<State> {
    fn transition<Next>(self) -> ScrapeConfigBuilder<Next> {
        ScrapeConfigBuilder {
            api_key: self.api_key,
            api_base_url: self.api_base_url,
            primary_model: self.primary_model,
            fallback_model: self.fallback_model,
            navigation_policy: self.navigation_policy,
            fast_timeout_secs: self.fast_timeout_secs,
            patient_timeout_secs: self.patient_timeout_secs,
            consent_timeout_ms: self.consent_timeout_ms,
            llm_timeout_secs: self.llm_timeout_secs,
            llm_fallback_timeout_secs: self.llm_fallback_timeout_secs,
            max_tokens: self.max_tokens,
            max_secondary_pages: self.max_secondary_pages,
            headless: self.headless,
            chrome_executable: self.chrome_executable,
            bind_addr: self.bind_addr,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn primary_model(mut self, model: impl Into<String>) -> Self {
        self.primary_model = model.into();
        self
    }

    #[must_use]
    pub fn fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    #[must_use]
    pub fn navigation_policy(mut self, policy: NavigationPolicy) -> Self {
        self.navigation_policy = policy;
        self
    }

    #[must_use]
    pub fn fast_timeout_secs(mut self, secs: u64) -> Self {
        self.fast_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn patient_timeout_secs(mut self, secs: u64) -> Self {
        self.patient_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn consent_timeout_ms(mut self, ms: u64) -> Self {
        self.consent_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn llm_timeout_secs(mut self, secs: u64) -> Self {
        self.llm_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn llm_fallback_timeout_secs(mut self, secs: u64) -> Self {
        self.llm_fallback_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn max_secondary_pages(mut self, pages: usize) -> Self {
        self.max_secondary_pages = pages;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

impl ScrapeConfigBuilder<()> {
    /// Set the extraction-service key. Required before `build()`.
    pub fn api_key(mut self, key: impl Into<String>) -> ScrapeConfigBuilder<WithApiKey> {
        self.api_key = Some(key.into());
        self.transition()
    }
}

impl ScrapeConfigBuilder<WithApiKey> {
    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank, the base URL is not http(s),
    /// a model name is empty, or a timeout / page budget is zero.
    pub fn build(self) -> Result<ScrapeConfig> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("API key must not be empty"))?;

        if !crate::utils::is_valid_url(&self.api_base_url) {
            bail!("Invalid API base URL: {}", self.api_base_url);
        }
        if self.primary_model.trim().is_empty() || self.fallback_model.trim().is_empty() {
            bail!("Model names must not be empty");
        }
        if self.fast_timeout_secs == 0 || self.patient_timeout_secs == 0 {
            bail!("Navigation timeouts must be greater than zero");
        }
        if self.llm_timeout_secs == 0 || self.llm_fallback_timeout_secs == 0 {
            bail!("Extraction timeouts must be greater than zero");
        }
        if self.max_secondary_pages == 0 {
            bail!("max_secondary_pages must be at least 1");
        }
        if self.max_tokens == 0 {
            bail!("max_tokens must be greater than zero");
        }

        Ok(ScrapeConfig {
            api_key,
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            models: ModelStrategy::new(self.primary_model, self.fallback_model),
            navigation_policy: self.navigation_policy,
            fast_timeout_secs: self.fast_timeout_secs,
            patient_timeout_secs: self.patient_timeout_secs,
            consent_timeout_ms: self.consent_timeout_ms,
            llm_timeout_secs: self.llm_timeout_secs,
            llm_fallback_timeout_secs: self.llm_fallback_timeout_secs,
            max_tokens: self.max_tokens,
            max_secondary_pages: self.max_secondary_pages,
            headless: self.headless,
            chrome_executable: self.chrome_executable,
            bind_addr: self.bind_addr,
        })
    }
}

impl ScrapeConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }

    /// Build a configuration from process environment variables.
    ///
    /// `OPENAI_API_KEY` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY").ok_or_else(|| anyhow!("OPENAI_API_KEY not set"))?;

        let mut builder = Self::builder();
        if let Some(url) = lookup("POLICYSCRAPE_API_BASE") {
            builder = builder.api_base_url(url);
        }
        if let Some(model) = lookup("POLICYSCRAPE_PRIMARY_MODEL") {
            builder = builder.primary_model(model);
        }
        if let Some(model) = lookup("POLICYSCRAPE_FALLBACK_MODEL") {
            builder = builder.fallback_model(model);
        }
        if let Some(policy) = lookup("POLICYSCRAPE_NAVIGATION") {
            builder = builder.navigation_policy(policy.parse().map_err(|e: String| anyhow!(e))?);
        }
        if let Some(headless) = lookup("POLICYSCRAPE_HEADLESS") {
            builder = builder.headless(!matches!(
                headless.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no"
            ));
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            builder = builder.chrome_executable(path);
        }
        if let Some(addr) = lookup("POLICYSCRAPE_BIND") {
            builder = builder.bind_addr(addr);
        }

        builder.api_key(api_key).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = ScrapeConfig::builder().api_key("sk-test").build()?;
        assert_eq!(config.api_key(), "sk-test");
        assert_eq!(config.navigation_policy(), NavigationPolicy::Fast);
        assert_eq!(config.navigation_timeout(NavigationPolicy::Fast), Duration::from_secs(15));
        assert_eq!(config.navigation_timeout(NavigationPolicy::Patient), Duration::from_secs(60));
        assert_eq!(config.models().select(false), DEFAULT_PRIMARY_MODEL);
        assert_eq!(config.models().select(true), DEFAULT_FALLBACK_MODEL);
        assert_eq!(config.max_secondary_pages(), 3);
        Ok(())
    }

    #[test]
    fn test_rejects_blank_key_and_bad_url() {
        assert!(ScrapeConfig::builder().api_key("  ").build().is_err());
        assert!(
            ScrapeConfig::builder()
                .api_base_url("not a url")
                .api_key("sk")
                .build()
                .is_err()
        );
        assert!(
            ScrapeConfig::builder()
                .fast_timeout_secs(0)
                .api_key("sk")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_from_lookup() -> Result<()> {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("POLICYSCRAPE_NAVIGATION", "patient"),
            ("POLICYSCRAPE_PRIMARY_MODEL", "gpt-4.1"),
            ("POLICYSCRAPE_HEADLESS", "false"),
            ("POLICYSCRAPE_API_BASE", "http://localhost:9000/v1/"),
        ]);
        let config = ScrapeConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()))?;
        assert_eq!(config.navigation_policy(), NavigationPolicy::Patient);
        assert_eq!(config.models().primary, "gpt-4.1");
        assert!(!config.headless());
        assert_eq!(config.api_base_url(), "http://localhost:9000/v1");
        Ok(())
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let err = ScrapeConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_key() -> Result<()> {
        let config = ScrapeConfig::builder().api_key("sk-secret").build()?;
        assert!(!format!("{config:?}").contains("sk-secret"));
        Ok(())
    }
}
