//! chromiumoxide implementation of the navigation traits.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::js_scripts::{
    CONSENT_SCRIPT, READINESS_SCRIPT, list_anchors_script, list_anchors_within_script,
};
use super::manager::BrowserManager;
use super::page_guard::PageGuard;
use super::page_timeout::{Bounded, with_page_timeout};
use crate::config::ScrapeConfig;
use crate::discovery::Link;
use crate::navigator::{BrowserSession, LoadedPage, NavigationError, NavigationPolicy};

/// Upper bound for a single DOM query on an already loaded page.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for network quiescence.
const QUIET_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Consecutive polls with an unchanged resource count that count as "quiet".
const QUIET_POLLS_REQUIRED: u32 = 2;

/// Pause after a consent click so the overlay can go away.
const CONSENT_SETTLE: Duration = Duration::from_millis(400);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Readiness {
    ready_state: String,
    body_exists: bool,
    resource_count: u64,
}

/// Browser session backed by the shared [`BrowserManager`].
#[derive(Clone)]
pub struct ChromiumSession {
    manager: BrowserManager,
    fast_timeout: Duration,
    patient_timeout: Duration,
    consent_timeout: Duration,
}

impl ChromiumSession {
    #[must_use]
    pub fn new(manager: BrowserManager, config: &ScrapeConfig) -> Self {
        Self {
            manager,
            fast_timeout: config.navigation_timeout(NavigationPolicy::Fast),
            patient_timeout: config.navigation_timeout(NavigationPolicy::Patient),
            consent_timeout: config.consent_timeout(),
        }
    }

    #[must_use]
    pub fn manager(&self) -> &BrowserManager {
        &self.manager
    }

    fn timeout_for(&self, policy: NavigationPolicy) -> Duration {
        match policy {
            NavigationPolicy::Fast => self.fast_timeout,
            NavigationPolicy::Patient => self.patient_timeout,
        }
    }
}

/// Wait until `readyState == complete` and the resource count stops growing.
///
/// Runs inside the navigation timeout, so it has no bound of its own.
async fn wait_for_network_quiet(page: &PageGuard) {
    let mut last_count: Option<u64> = None;
    let mut stable_polls = 0;

    loop {
        match page.evaluate(READINESS_SCRIPT).await {
            Ok(result) => match result.into_value::<Readiness>() {
                Ok(state) if state.ready_state == "complete" && state.body_exists => {
                    if last_count == Some(state.resource_count) {
                        stable_polls += 1;
                        if stable_polls >= QUIET_POLLS_REQUIRED {
                            debug!(resources = state.resource_count, "Network quiet");
                            return;
                        }
                    } else {
                        stable_polls = 0;
                    }
                    last_count = Some(state.resource_count);
                }
                Ok(_) => stable_polls = 0,
                Err(e) => debug!("Failed to parse readiness state: {}", e),
            },
            Err(e) => debug!("Failed to check readiness: {}, retrying", e),
        }

        tokio::time::sleep(QUIET_POLL_INTERVAL).await;
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn load(
        &self,
        url: &str,
        policy: NavigationPolicy,
    ) -> Result<ChromiumPage, NavigationError> {
        let timeout = self.timeout_for(policy);

        let page = self
            .manager
            .new_page()
            .await
            .map_err(|e| NavigationError::failed(url, policy, format!("{e:#}")))?;
        let guard = PageGuard::new(page, format!("{policy}:{url}"));

        info!(%url, %policy, "Navigating");
        let navigation = async {
            guard.goto(url).await.map_err(|e| e.to_string())?;
            if policy == NavigationPolicy::Patient {
                wait_for_network_quiet(&guard).await;
            }
            Ok::<(), String>(())
        };

        match with_page_timeout(navigation, timeout).await {
            Bounded::Done(Ok(())) => {}
            Bounded::Done(Err(reason)) => {
                warn!(%url, %policy, "Navigation failed: {}", reason);
                guard.close().await;
                return Err(NavigationError::failed(url, policy, reason));
            }
            Bounded::TimedOut => {
                warn!(%url, %policy, "Navigation timed out after {}s", timeout.as_secs());
                guard.close().await;
                return Err(NavigationError::timeout(url, policy, timeout.as_secs()));
            }
        }

        let final_url = match guard.url().await {
            Ok(Some(final_url)) => final_url,
            _ => url.to_string(),
        };

        Ok(ChromiumPage {
            guard,
            url: final_url,
            policy,
            consent_timeout: self.consent_timeout,
        })
    }
}

/// A loaded chromiumoxide tab.
pub struct ChromiumPage {
    guard: PageGuard,
    url: String,
    policy: NavigationPolicy,
    consent_timeout: Duration,
}

impl ChromiumPage {
    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T, NavigationError> {
        let evaluation = async {
            self.guard
                .evaluate(script)
                .await
                .map_err(|e| e.to_string())?
                .into_value::<T>()
                .map_err(|e| format!("unexpected script result: {e}"))
        };

        match with_page_timeout(evaluation, QUERY_TIMEOUT).await {
            Bounded::Done(result) => {
                result.map_err(|reason| NavigationError::failed(&self.url, self.policy, reason))
            }
            Bounded::TimedOut => Err(NavigationError::timeout(
                &self.url,
                self.policy,
                QUERY_TIMEOUT.as_secs(),
            )),
        }
    }
}

#[async_trait]
impl LoadedPage for ChromiumPage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn list_anchors(&self) -> Result<Vec<Link>, NavigationError> {
        self.evaluate(list_anchors_script()).await
    }

    async fn list_anchors_within(&self, selectors: &[&str]) -> Result<Vec<Link>, NavigationError> {
        self.evaluate(list_anchors_within_script(selectors)).await
    }

    async fn document_html(&self) -> Result<String, NavigationError> {
        match with_page_timeout(self.guard.content(), QUERY_TIMEOUT).await {
            Bounded::Done(Ok(html)) => Ok(html),
            Bounded::Done(Err(e)) => Err(NavigationError::failed(&self.url, self.policy, e)),
            Bounded::TimedOut => Err(NavigationError::timeout(
                &self.url,
                self.policy,
                QUERY_TIMEOUT.as_secs(),
            )),
        }
    }

    async fn dismiss_consent_if_present(&self) -> bool {
        let click = async {
            self.guard
                .evaluate(CONSENT_SCRIPT)
                .await
                .ok()
                .and_then(|result| result.into_value::<Option<String>>().ok())
                .flatten()
        };

        match with_page_timeout(click, self.consent_timeout).await {
            Bounded::Done(Some(label)) => {
                debug!(url = %self.url, label = %label, "Dismissed consent banner");
                tokio::time::sleep(CONSENT_SETTLE).await;
                true
            }
            Bounded::Done(None) => false,
            Bounded::TimedOut => {
                debug!(url = %self.url, "Consent dismissal timed out");
                false
            }
        }
    }

    async fn close(self) {
        self.guard.close().await;
    }
}
