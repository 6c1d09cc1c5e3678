//! The discovery and extraction pipeline for one URL.

use tracing::{debug, info, warn};

use super::error::ScrapeError;
use super::report::ScrapeReport;
use crate::config::ScrapeConfig;
use crate::discovery::{ComplianceLinkSet, DocumentKind, Link, LinkCascade};
use crate::extraction::{ChatClient, ExtractionOutcome, PolicyExtractor};
use crate::navigator::{BrowserSession, LoadedPage, NavigationError, NavigationPolicy};
use crate::utils::{MAX_SECONDARY_PAGES, parse_http_url, same_document};

/// Privacy and cookie results plus how they were obtained.
struct PrivacyAndCookie {
    privacy: Option<ExtractionOutcome>,
    cookie: Option<ExtractionOutcome>,
    combined: bool,
    cookie_derived: bool,
}

/// Locates and extracts the compliance documents of a website.
///
/// Generic over the browser and the chat client so the same pipeline runs
/// against chromiumoxide + OpenAI in production and in-memory fakes in tests.
pub struct ComplianceScraper<S, C> {
    session: S,
    extractor: PolicyExtractor<C>,
    navigation_policy: NavigationPolicy,
    max_secondary_pages: usize,
}

impl<S, C> ComplianceScraper<S, C>
where
    S: BrowserSession,
    C: ChatClient,
{
    pub fn new(session: S, extractor: PolicyExtractor<C>) -> Self {
        Self {
            session,
            extractor,
            navigation_policy: NavigationPolicy::default(),
            max_secondary_pages: MAX_SECONDARY_PAGES,
        }
    }

    pub fn from_config(session: S, client: C, config: &ScrapeConfig) -> Self {
        Self::new(session, PolicyExtractor::from_config(client, config))
            .navigation_policy(config.navigation_policy())
            .max_secondary_pages(config.max_secondary_pages())
    }

    #[must_use]
    pub fn navigation_policy(mut self, policy: NavigationPolicy) -> Self {
        self.navigation_policy = policy;
        self
    }

    #[must_use]
    pub fn max_secondary_pages(mut self, pages: usize) -> Self {
        self.max_secondary_pages = pages;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn extractor(&self) -> &PolicyExtractor<C> {
        &self.extractor
    }

    /// Load under the configured policy, then once more under the other one.
    async fn load_with_fallback(&self, url: &str) -> Result<S::Page, NavigationError> {
        match self.session.load(url, self.navigation_policy).await {
            Ok(page) => Ok(page),
            Err(first) => {
                let retry_policy = self.navigation_policy.alternate();
                warn!(%url, error = %first, %retry_policy, "Retrying navigation with other policy");
                self.session.load(url, retry_policy).await
            }
        }
    }

    /// Load a document page and return its cleaned text. The page is always closed.
    async fn fetch_document_text(&self, link: &Link) -> Result<String, NavigationError> {
        let page = self.load_with_fallback(&link.address).await?;
        page.dismiss_consent_if_present().await;
        let text = page.extract_visible_text().await;
        page.close().await;
        text
    }

    /// Extract one document from its resolved link, or `None` without a link.
    async fn extract_document(
        &self,
        kind: DocumentKind,
        link: Option<&Link>,
    ) -> Option<ExtractionOutcome> {
        let link = link?;
        debug!(%kind, address = %link.address, "Extracting document");

        let outcome = match self.fetch_document_text(link).await {
            Err(e) => ExtractionOutcome::Failed(e.to_string()),
            Ok(text) if text.trim().is_empty() => ExtractionOutcome::NotFound,
            Ok(text) => self.extractor.extract(kind, &text).await,
        };
        Some(outcome)
    }

    /// Cookie document carved out of privacy text.
    ///
    /// `None` when the privacy text has no cookie information; a failed call
    /// is reported as such.
    async fn derive_cookie(&self, privacy: Option<&ExtractionOutcome>) -> Option<ExtractionOutcome> {
        let privacy_text = privacy?.text()?;
        debug!("No cookie link, deriving cookie document from privacy policy");
        match self.extractor.derive_cookie_from_privacy(privacy_text).await {
            ExtractionOutcome::NotFound => None,
            ExtractionOutcome::Failed(reason) => {
                warn!(error = %reason, "Cookie derivation from privacy policy failed");
                Some(ExtractionOutcome::Failed(reason))
            }
            found @ ExtractionOutcome::Found(_) => Some(found),
        }
    }

    async fn extract_privacy_and_cookie(&self, links: &ComplianceLinkSet) -> PrivacyAndCookie {
        match (&links.privacy_link, &links.cookie_link) {
            (Some(privacy), Some(cookie)) if same_document(&privacy.address, &cookie.address) => {
                info!(address = %privacy.address, "Privacy and cookie share a page, using combined extraction");
                let outcome = match self.fetch_document_text(privacy).await {
                    Err(e) => {
                        let failed = ExtractionOutcome::Failed(e.to_string());
                        return PrivacyAndCookie {
                            privacy: Some(failed.clone()),
                            cookie: Some(failed),
                            combined: true,
                            cookie_derived: false,
                        };
                    }
                    Ok(text) => self.extractor.extract_combined(&text).await,
                };
                PrivacyAndCookie {
                    privacy: Some(outcome.privacy),
                    cookie: Some(outcome.cookie),
                    combined: true,
                    cookie_derived: outcome.cookie_derived,
                }
            }
            (privacy_link, Some(cookie_link)) => {
                let (privacy, cookie) = tokio::join!(
                    self.extract_document(DocumentKind::Privacy, privacy_link.as_ref()),
                    self.extract_document(DocumentKind::Cookie, Some(cookie_link)),
                );
                PrivacyAndCookie {
                    privacy,
                    cookie,
                    combined: false,
                    cookie_derived: false,
                }
            }
            (privacy_link, None) => {
                let privacy = self
                    .extract_document(DocumentKind::Privacy, privacy_link.as_ref())
                    .await;
                let cookie = self.derive_cookie(privacy.as_ref()).await;
                let cookie_derived = cookie.as_ref().is_some_and(ExtractionOutcome::is_found);
                PrivacyAndCookie {
                    privacy,
                    cookie,
                    combined: false,
                    cookie_derived,
                }
            }
        }
    }

    /// Run the full pipeline for `url`.
    ///
    /// # Errors
    ///
    /// Fails only when `url` is not an absolute http(s) URL or the root page
    /// cannot be loaded. Every later failure is reported per document.
    pub async fn discover_and_extract(&self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        let root_url = parse_http_url(url)
            .ok_or_else(|| ScrapeError::InvalidUrl(url.to_string()))?
            .to_string();
        info!(url = %root_url, policy = %self.navigation_policy, "Starting compliance scrape");

        let root = self.load_with_fallback(&root_url).await?;
        root.dismiss_consent_if_present().await;

        let discovery = LinkCascade::new(&self.session)
            .max_secondary_pages(self.max_secondary_pages)
            .run(&root)
            .await;
        root.close().await;

        let links = discovery.links;
        let (terms, privacy_and_cookie) = tokio::join!(
            self.extract_document(DocumentKind::Terms, links.terms_link.as_ref()),
            self.extract_privacy_and_cookie(&links),
        );

        info!(
            url = %root_url,
            terms = terms.as_ref().is_some_and(ExtractionOutcome::is_found),
            privacy = privacy_and_cookie.privacy.as_ref().is_some_and(ExtractionOutcome::is_found),
            cookie = privacy_and_cookie.cookie.as_ref().is_some_and(ExtractionOutcome::is_found),
            "Compliance scrape finished"
        );

        Ok(ScrapeReport {
            url: root_url,
            terms,
            privacy: privacy_and_cookie.privacy,
            cookie: privacy_and_cookie.cookie,
            links,
            passes: discovery.passes,
            combined: privacy_and_cookie.combined,
            cookie_derived: privacy_and_cookie.cookie_derived,
        })
    }
}
