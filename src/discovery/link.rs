//! Link and link-set types shared by the classifier and the cascade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compliance document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Terms,
    Privacy,
    Cookie,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Terms, Self::Privacy, Self::Cookie];

    /// Human-readable document name used in prompts and diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Terms => "terms of service",
            Self::Privacy => "privacy policy",
            Self::Cookie => "cookie policy",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An anchor as seen on a loaded page.
///
/// `text` is lowercased and trimmed; `address` is absolute because the
/// browser resolves `href` before it reaches us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub text: String,
    pub address: String,
    #[serde(default)]
    pub in_footer: bool,
    #[serde(default)]
    pub in_header: bool,
}

impl Link {
    /// Build a link, normalizing the visible text the same way the DOM scripts do.
    pub fn new(text: impl AsRef<str>, address: impl Into<String>) -> Self {
        Self {
            text: text.as_ref().trim().to_lowercase(),
            address: address.into(),
            in_footer: false,
            in_header: false,
        }
    }

    #[must_use]
    pub fn in_footer(mut self) -> Self {
        self.in_footer = true;
        self
    }
}

/// At most one resolved link per compliance category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceLinkSet {
    pub terms_link: Option<Link>,
    pub privacy_link: Option<Link>,
    pub cookie_link: Option<Link>,
}

impl ComplianceLinkSet {
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> Option<&Link> {
        match kind {
            DocumentKind::Terms => self.terms_link.as_ref(),
            DocumentKind::Privacy => self.privacy_link.as_ref(),
            DocumentKind::Cookie => self.cookie_link.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: DocumentKind) -> &mut Option<Link> {
        match kind {
            DocumentKind::Terms => &mut self.terms_link,
            DocumentKind::Privacy => &mut self.privacy_link,
            DocumentKind::Cookie => &mut self.cookie_link,
        }
    }

    /// Fill an empty slot. Returns `false` if the slot was already taken.
    pub fn set_if_empty(&mut self, kind: DocumentKind, link: Link) -> bool {
        let slot = self.slot_mut(kind);
        if slot.is_some() {
            return false;
        }
        *slot = Some(link);
        true
    }

    /// Merge a later pass into this one. Slots already set are never overwritten.
    pub fn merge_missing(&mut self, later: ComplianceLinkSet) {
        let ComplianceLinkSet {
            terms_link,
            privacy_link,
            cookie_link,
        } = later;
        for (kind, link) in [
            (DocumentKind::Terms, terms_link),
            (DocumentKind::Privacy, privacy_link),
            (DocumentKind::Cookie, cookie_link),
        ] {
            if let Some(link) = link {
                self.set_if_empty(kind, link);
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.terms_link.is_some() && self.privacy_link.is_some() && self.cookie_link.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms_link.is_none() && self.privacy_link.is_none() && self.cookie_link.is_none()
    }

    /// Categories that are still unresolved, in canonical order.
    #[must_use]
    pub fn missing(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_none())
            .collect()
    }

    /// Whether any resolved slot already points at `address`.
    #[must_use]
    pub fn contains_address(&self, address: &str) -> bool {
        DocumentKind::ALL.into_iter().any(|kind| {
            self.get(kind)
                .is_some_and(|link| crate::utils::same_document(&link.address, address))
        })
    }
}
