//! Page navigation abstraction.
//!
//! The pipeline only needs three things from a browser engine: navigate with a
//! timeout, run one of a small closed set of DOM queries, and close the page.
//! [`BrowserSession`] and [`LoadedPage`] capture exactly that, so the cascade
//! and the pipeline can run against chromiumoxide in production and against
//! in-memory pages in tests.

mod error;
mod policy;

pub use error::{NavigationError, NavigationErrorKind};
pub use policy::NavigationPolicy;

use async_trait::async_trait;

use crate::discovery::Link;

/// Footer-like containers used by the footer pass.
pub const FOOTER_SELECTORS: &[&str] = &[
    "footer",
    ".footer",
    "#footer",
    "[role=\"contentinfo\"]",
    ".site-footer",
    "#site-footer",
    ".page-footer",
];

/// A browser session able to open pages.
///
/// The session (and its cookie/consent state) is shared by every page loaded
/// during one pipeline run. Each page handle belongs to the step that opened
/// it and must be closed by that step.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: LoadedPage;

    /// Open a new page and navigate it to `url` under `policy`.
    ///
    /// On failure no page is left open.
    async fn load(&self, url: &str, policy: NavigationPolicy)
    -> Result<Self::Page, NavigationError>;
}

/// A page that finished loading.
#[async_trait]
pub trait LoadedPage: Send + Sync {
    /// Address the page ended up on after redirects.
    fn url(&self) -> &str;

    /// Every anchor in the document, in DOM order.
    async fn list_anchors(&self) -> Result<Vec<Link>, NavigationError>;

    /// Anchors inside any element matching one of `selectors`, in DOM order, deduplicated.
    async fn list_anchors_within(&self, selectors: &[&str]) -> Result<Vec<Link>, NavigationError>;

    /// Serialized HTML of the current document.
    async fn document_html(&self) -> Result<String, NavigationError>;

    /// Click the first accept/agree/continue control, if any. Idempotent.
    ///
    /// Returns whether something was clicked. Never fails: a missing banner or
    /// a slow page simply yields `false`.
    async fn dismiss_consent_if_present(&self) -> bool;

    /// Cleaned, size-capped policy text for the current document.
    async fn extract_visible_text(&self) -> Result<String, NavigationError> {
        let html = self.document_html().await?;
        Ok(crate::content::extract_policy_text(&html))
    }

    /// Close the page. Implementations also close on drop as a fallback.
    async fn close(self)
    where
        Self: Sized;
}
