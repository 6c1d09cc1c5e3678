//! Errors that fail a whole scrape request.

use thiserror::Error;

use crate::navigator::NavigationError;

/// Only these abort a request; per-document failures become
/// [`crate::extraction::ExtractionOutcome::Failed`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The root page could not be loaded under either policy
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The browser could not be located or launched
    #[error("Browser unavailable: {0}")]
    Browser(String),
}

impl ScrapeError {
    #[must_use]
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl(_))
    }
}
