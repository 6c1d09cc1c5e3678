//! Process-wide wiring of the production pipeline.

use std::sync::Arc;
use tracing::{info, warn};

use super::error::ScrapeError;
use super::scraper::ComplianceScraper;
use crate::browser::{BrowserManager, ChromiumSession, resolve_browser_executable};
use crate::config::ScrapeConfig;
use crate::extraction::OpenAiChatClient;

/// Production pipeline: chromiumoxide session + OpenAI-compatible client.
pub type ProductionScraper = ComplianceScraper<ChromiumSession, OpenAiChatClient>;

/// One-time environment checks and the shared browser.
///
/// The browser executable is located once here instead of on every request;
/// the browser itself still launches lazily on the first page.
#[derive(Clone)]
pub struct ScraperRuntime {
    scraper: Arc<ProductionScraper>,
    manager: BrowserManager,
}

impl ScraperRuntime {
    /// Locate the browser and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] when no Chrome/Chromium can be found or downloaded.
    pub async fn initialize(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let executable = resolve_browser_executable(config.chrome_executable())
            .await
            .map_err(|e| ScrapeError::Browser(format!("{e:#}")))?;
        info!(executable = %executable.display(), headless = config.headless(), "Browser located");

        let manager = BrowserManager::new(executable, config.headless());
        let session = ChromiumSession::new(manager.clone(), config);
        let client = OpenAiChatClient::from_config(config);
        let scraper = ComplianceScraper::from_config(session, client, config);

        Ok(Self {
            scraper: Arc::new(scraper),
            manager,
        })
    }

    #[must_use]
    pub fn scraper(&self) -> Arc<ProductionScraper> {
        Arc::clone(&self.scraper)
    }

    /// Close the shared browser.
    pub async fn shutdown(&self) {
        if let Err(e) = self.manager.shutdown().await {
            warn!("Browser shutdown failed: {e:#}");
        }
    }
}
