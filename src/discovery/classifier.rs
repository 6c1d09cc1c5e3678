//! Keyword classifier for compliance links.
//!
//! Pure substring matching over English and French keyword sets. A link
//! matches a category when its visible text or its address contains any of
//! the category's keywords. Per category, the first match in DOM order wins.

use super::link::{ComplianceLinkSet, DocumentKind, Link};

/// Keywords identifying terms of service / legal notice links.
pub const TERMS_KEYWORDS: &[&str] = &[
    "terms",
    "conditions",
    "tos",
    "mentions légales",
    "mentions legales",
    "mentions-legales",
    "cgu",
    "cgv",
    "legal",
    "conditions générales",
    "conditions d'utilisation",
];

/// Keywords identifying privacy policy links.
pub const PRIVACY_KEYWORDS: &[&str] = &[
    "privacy",
    "confidentialité",
    "confidentialite",
    "données personnelles",
    "donnees personnelles",
    "donnees-personnelles",
    "rgpd",
    "gdpr",
    "vie privée",
];

/// Keywords identifying cookie policy links.
pub const COOKIE_KEYWORDS: &[&str] = &["cookie", "traceurs"];

/// Keywords identifying secondary pages worth visiting in the menu pass.
pub const SECONDARY_PAGE_KEYWORDS: &[&str] = &[
    "about",
    "à propos",
    "a propos",
    "legal",
    "légal",
    "help",
    "aide",
    "informations",
];

#[must_use]
pub const fn keywords_for(kind: DocumentKind) -> &'static [&'static str] {
    match kind {
        DocumentKind::Terms => TERMS_KEYWORDS,
        DocumentKind::Privacy => PRIVACY_KEYWORDS,
        DocumentKind::Cookie => COOKIE_KEYWORDS,
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

/// Whether `link` plausibly points at a document of `kind`.
#[must_use]
pub fn matches_kind(link: &Link, kind: DocumentKind) -> bool {
    let keywords = keywords_for(kind);
    contains_any(&link.text.to_lowercase(), keywords)
        || contains_any(&link.address.to_lowercase(), keywords)
}

/// Whether `link` leads to an about/legal/help page. Only the visible text is considered.
#[must_use]
pub fn is_secondary_page_link(link: &Link) -> bool {
    contains_any(&link.text.to_lowercase(), SECONDARY_PAGE_KEYWORDS)
}

/// Classify links from one page, keeping the first DOM-order match per category.
///
/// A single link may fill more than one slot (e.g. a "privacy & cookies" page).
#[must_use]
pub fn classify(links: &[Link]) -> ComplianceLinkSet {
    let mut set = ComplianceLinkSet::default();

    for link in links {
        for kind in DocumentKind::ALL {
            if set.get(kind).is_none() && matches_kind(link, kind) {
                set.set_if_empty(kind, link.clone());
            }
        }
        if set.is_complete() {
            break;
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(text: &str, address: &str) -> Link {
        Link::new(text, address)
    }

    #[test]
    fn test_english_links() {
        let links = vec![
            link("Home", "https://shop.com/"),
            link("Terms of Service", "https://shop.com/tos"),
            link("Privacy", "https://shop.com/p"),
            link("Cookie settings", "https://shop.com/c"),
        ];
        let set = classify(&links);
        assert_eq!(set.terms_link.unwrap().address, "https://shop.com/tos");
        assert_eq!(set.privacy_link.unwrap().address, "https://shop.com/p");
        assert_eq!(set.cookie_link.unwrap().address, "https://shop.com/c");
    }

    #[test]
    fn test_french_links() {
        let links = vec![
            link("Mentions légales", "https://boutique.fr/ml"),
            link("Politique de confidentialité", "https://boutique.fr/pc"),
            link("Gestion des traceurs", "https://boutique.fr/gt"),
        ];
        let set = classify(&links);
        assert_eq!(set.terms_link.unwrap().address, "https://boutique.fr/ml");
        assert_eq!(set.privacy_link.unwrap().address, "https://boutique.fr/pc");
        assert_eq!(set.cookie_link.unwrap().address, "https://boutique.fr/gt");
    }

    #[test]
    fn test_address_match_when_text_is_generic() {
        let links = vec![link("en savoir plus", "https://site.fr/rgpd")];
        let set = classify(&links);
        assert!(set.privacy_link.is_some());
        assert!(set.terms_link.is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let links = vec![
            link("CGU", "https://site.fr/cgu"),
            link("Terms", "https://site.fr/terms"),
        ];
        let set = classify(&links);
        assert_eq!(set.terms_link.unwrap().address, "https://site.fr/cgu");
    }

    #[test]
    fn test_combined_link_fills_two_slots() {
        let links = vec![link("Privacy & Cookies", "https://site.com/privacy")];
        let set = classify(&links);
        assert_eq!(set.privacy_link.as_ref().unwrap().address, "https://site.com/privacy");
        assert_eq!(set.cookie_link.as_ref().unwrap().address, "https://site.com/privacy");
        assert!(set.terms_link.is_none());
    }

    #[test]
    fn test_no_match() {
        let links = vec![link("Blog", "https://site.com/blog"), link("Shop", "https://site.com/shop")];
        assert!(classify(&links).is_empty());
    }

    #[test]
    fn test_secondary_page_detection() {
        assert!(is_secondary_page_link(&link("About us", "https://a.com/x")));
        assert!(is_secondary_page_link(&link("À propos", "https://a.fr/x")));
        assert!(is_secondary_page_link(&link("Centre d'aide", "https://a.fr/x")));
        assert!(!is_secondary_page_link(&link("Products", "https://a.com/about")));
    }
}
