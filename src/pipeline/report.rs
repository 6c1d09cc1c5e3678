//! Pipeline output, typed and wire forms.

use serde::{Deserialize, Serialize};

use crate::discovery::{CascadeStage, ComplianceLinkSet, DocumentKind};
use crate::extraction::ExtractionOutcome;

/// Typed result of one pipeline run.
///
/// A `None` document means no link was found for it (or, for the cookie
/// document, that nothing could be derived from the privacy policy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub url: String,
    pub terms: Option<ExtractionOutcome>,
    pub privacy: Option<ExtractionOutcome>,
    pub cookie: Option<ExtractionOutcome>,
    pub links: ComplianceLinkSet,
    pub passes: Vec<CascadeStage>,
    /// Privacy and cookie came from one combined call
    pub combined: bool,
    /// The cookie document was carved out of the privacy policy
    pub cookie_derived: bool,
}

impl ScrapeReport {
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> Option<&ExtractionOutcome> {
        match kind {
            DocumentKind::Terms => self.terms.as_ref(),
            DocumentKind::Privacy => self.privacy.as_ref(),
            DocumentKind::Cookie => self.cookie.as_ref(),
        }
    }

    /// Wire form with outcomes rendered as plain strings.
    #[must_use]
    pub fn into_result(self) -> ScrapingResult {
        ScrapingResult {
            terms_of_service: self.terms.map(|o| o.render(DocumentKind::Terms)),
            privacy_policy: self.privacy.map(|o| o.render(DocumentKind::Privacy)),
            cookie_policy: self.cookie.map(|o| o.render(DocumentKind::Cookie)),
        }
    }
}

/// Three optional documents, as returned to API callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingResult {
    pub terms_of_service: Option<String>,
    pub privacy_policy: Option<String>,
    pub cookie_policy: Option<String>,
}
