//! Content extraction: isolate policy text from page noise.
//!
//! The browser hands over serialized HTML; everything here runs on a detached
//! `scraper` document so the live page is never touched.

pub mod extractor;

pub use extractor::{NOISE_SELECTORS, POLICY_CONTAINER_SELECTORS, select_policy_text};

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

use crate::utils::{MAX_CONTENT_CHARS, TRUNCATION_MARKER};

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BUG: hardcoded regex is invalid"));

/// Cleaned, size-capped policy text for an HTML document.
#[must_use]
pub fn extract_policy_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let (selector, raw) = select_policy_text(&document);
    let cleaned = collapse_newlines(&raw);
    log::info!(
        "Extracted {} chars of policy text from '{}'",
        cleaned.chars().count(),
        selector
    );
    truncate_content(&cleaned, MAX_CONTENT_CHARS)
}

/// Collapse runs of three or more newlines to exactly two and trim.
#[must_use]
pub fn collapse_newlines(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    EXCESS_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}

/// Cap `text` at `max_chars` characters, appending [`TRUNCATION_MARKER`] when cut.
#[must_use]
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            log::warn!("Policy text exceeds {} chars, truncating", max_chars);
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\n\n\n\nb\n\nc\n"), "a\n\nb\n\nc");
        assert_eq!(collapse_newlines("  \n\nx\r\n\r\n\r\ny  "), "x\n\ny");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_appends_marker() {
        let out = truncate_content("données personnelles", 7);
        assert_eq!(out, format!("données{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_extract_policy_text_end_to_end() {
        let html = "<html><body><nav>Skip</nav><main><h1>Cookie Policy</h1>\n\n\n\
                    <p>We use cookies.</p></main></body></html>";
        assert_eq!(extract_policy_text(html), "Cookie Policy\n\nWe use cookies.");
    }

    proptest! {
        #[test]
        fn truncation_never_exceeds_cap(text in "\\PC{0,300}", cap in 1usize..200) {
            let out = truncate_content(&text, cap);
            let len = text.chars().count();
            if len <= cap {
                prop_assert_eq!(out, text);
            } else {
                prop_assert!(out.ends_with(TRUNCATION_MARKER));
                prop_assert_eq!(
                    out.chars().count(),
                    cap + TRUNCATION_MARKER.chars().count()
                );
            }
        }

        #[test]
        fn collapsed_text_has_no_triple_newline(text in "[a-z\\n]{0,80}") {
            prop_assert!(!collapse_newlines(&text).contains("\n\n\n"));
        }
    }
}
