//! Three-pass link discovery.
//!
//! `MainPage → FooterPass → MenuPass → Resolved`. Each pass only runs when a
//! category is still unresolved after the previous one, and later passes only
//! fill empty slots.

use std::fmt;
use tracing::{debug, info, warn};

use super::classifier::{classify, is_secondary_page_link};
use super::link::{ComplianceLinkSet, Link};
use crate::navigator::{BrowserSession, FOOTER_SELECTORS, LoadedPage, NavigationPolicy};
use crate::utils::{MAX_SECONDARY_PAGES, same_document};

/// Cascade states. `Resolved` is terminal.
///
/// Displayed in kebab case (`footer-pass`) in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    MainPage,
    FooterPass,
    MenuPass,
    Resolved,
}

impl fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MainPage => "main-page",
            Self::FooterPass => "footer-pass",
            Self::MenuPass => "menu-pass",
            Self::Resolved => "resolved",
        })
    }
}

/// What the cascade found and how much work it took.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub links: ComplianceLinkSet,
    /// Passes that actually ran, in order
    pub passes: Vec<CascadeStage>,
    /// Secondary pages the menu pass tried to load
    pub secondary_visits: usize,
}

/// Runs the discovery passes against one loaded root page.
pub struct LinkCascade<'a, S> {
    session: &'a S,
    max_secondary_pages: usize,
}

impl<'a, S: BrowserSession> LinkCascade<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            max_secondary_pages: MAX_SECONDARY_PAGES,
        }
    }

    #[must_use]
    pub fn max_secondary_pages(mut self, pages: usize) -> Self {
        self.max_secondary_pages = pages;
        self
    }

    fn advance(links: &ComplianceLinkSet, next: CascadeStage) -> CascadeStage {
        if links.is_complete() {
            CascadeStage::Resolved
        } else {
            next
        }
    }

    /// Drive the state machine to `Resolved`.
    pub async fn run(&self, root: &S::Page) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::default();
        let mut main_anchors: Vec<Link> = Vec::new();
        let mut stage = CascadeStage::MainPage;

        while stage != CascadeStage::Resolved {
            debug!(%stage, "Entering discovery pass");
            outcome.passes.push(stage);
            stage = match stage {
                CascadeStage::MainPage => {
                    main_anchors = root.list_anchors().await.unwrap_or_else(|e| {
                        warn!(error = %e, "Could not list anchors on root page");
                        Vec::new()
                    });
                    outcome.links = classify(&main_anchors);
                    debug!(
                        anchors = main_anchors.len(),
                        missing = ?outcome.links.missing(),
                        "Main page classified"
                    );
                    Self::advance(&outcome.links, CascadeStage::FooterPass)
                }
                CascadeStage::FooterPass => {
                    let footer = root
                        .list_anchors_within(FOOTER_SELECTORS)
                        .await
                        .unwrap_or_else(|e| {
                            warn!(error = %e, "Could not list footer anchors");
                            Vec::new()
                        });
                    outcome.links.merge_missing(classify(&footer));
                    debug!(
                        anchors = footer.len(),
                        missing = ?outcome.links.missing(),
                        "Footer pass classified"
                    );
                    Self::advance(&outcome.links, CascadeStage::MenuPass)
                }
                CascadeStage::MenuPass => {
                    outcome.secondary_visits = self
                        .menu_pass(root.url(), &main_anchors, &mut outcome.links)
                        .await;
                    CascadeStage::Resolved
                }
                CascadeStage::Resolved => CascadeStage::Resolved,
            };
        }

        let passes: Vec<String> = outcome.passes.iter().map(ToString::to_string).collect();
        info!(
            passes = %passes.join(" -> "),
            secondary_visits = outcome.secondary_visits,
            missing = ?outcome.links.missing(),
            "Link discovery finished"
        );
        outcome
    }

    /// About/legal/help pages worth visiting, in DOM order.
    ///
    /// Skips addresses already resolved, the root itself, and duplicates.
    fn menu_candidates<'l>(
        &self,
        root_url: &str,
        anchors: &'l [Link],
        links: &ComplianceLinkSet,
    ) -> Vec<&'l Link> {
        let mut candidates: Vec<&'l Link> = Vec::new();
        for link in anchors.iter().filter(|link| is_secondary_page_link(link)) {
            if candidates.len() >= self.max_secondary_pages {
                break;
            }
            if same_document(&link.address, root_url)
                || links.contains_address(&link.address)
                || candidates
                    .iter()
                    .any(|c| same_document(&c.address, &link.address))
            {
                continue;
            }
            candidates.push(link);
        }
        candidates
    }

    /// Visit secondary pages until every category resolves. Returns the visit count.
    ///
    /// Navigation failures are logged and skipped.
    async fn menu_pass(
        &self,
        root_url: &str,
        main_anchors: &[Link],
        links: &mut ComplianceLinkSet,
    ) -> usize {
        let candidates = self.menu_candidates(root_url, main_anchors, links);
        debug!(candidates = candidates.len(), "Menu pass candidates");

        let mut visits = 0;
        for candidate in candidates {
            if links.is_complete() {
                break;
            }
            visits += 1;

            let page = match self
                .session
                .load(&candidate.address, NavigationPolicy::Fast)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(address = %candidate.address, error = %e, "Skipping secondary page");
                    continue;
                }
            };

            let anchors = page.list_anchors().await;
            page.close().await;

            match anchors {
                Ok(anchors) => {
                    links.merge_missing(classify(&anchors));
                    debug!(
                        address = %candidate.address,
                        missing = ?links.missing(),
                        "Secondary page classified"
                    );
                }
                Err(e) => warn!(address = %candidate.address, error = %e, "Could not list anchors"),
            }
        }
        visits
    }
}
