//! Prompt construction and the fixed sentinels the service is asked to use.

use crate::discovery::DocumentKind;

/// Reply meaning "the requested document is not in this text".
pub const NOT_FOUND_SENTINEL: &str = "NO_DOCUMENT_FOUND";

/// Reply inside a combined response meaning the page has no separate cookie section.
pub const NO_COOKIE_POLICY_SENTINEL: &str = "NO_DEDICATED_COOKIE_POLICY";

/// Reply to a cookie-from-privacy request meaning nothing cookie-related was found.
pub const NO_INFORMATION_SENTINEL: &str = "NO_COOKIE_INFORMATION_FOUND";

/// Section marker heading the privacy part of a combined response.
pub const PRIVACY_MARKER: &str = "PRIVACY POLICY:";

/// Section marker heading the cookie part of a combined response.
pub const COOKIE_MARKER: &str = "COOKIE POLICY:";

const EXTRACTION_RULES: &str = "\
Rules:
- Copy the document text as it appears. Do not summarize, translate or comment.
- Keep headings and paragraph breaks.
- Leave out navigation, banners, unrelated page content and any preamble of your own.";

fn document_description(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Terms => {
            "terms of service (also called terms and conditions, terms of use, \
             conditions générales, CGU/CGV or mentions légales)"
        }
        DocumentKind::Privacy => {
            "privacy policy (also called privacy notice, politique de confidentialité, \
             données personnelles or RGPD notice)"
        }
        DocumentKind::Cookie => {
            "cookie policy (also called cookie notice, politique de cookies or traceurs)"
        }
    }
}

/// System prompt for a single-document extraction.
#[must_use]
pub fn single_system_prompt(kind: DocumentKind) -> String {
    format!(
        "You extract legal compliance documents from cleaned web page text.\n\
         Return only the full text of the website's {}.\n\
         {EXTRACTION_RULES}\n\
         If the text does not contain this document, reply with exactly {NOT_FOUND_SENTINEL} \
         and nothing else.",
        document_description(kind)
    )
}

/// System prompt for a page that serves both privacy and cookie content.
#[must_use]
pub fn combined_system_prompt() -> String {
    format!(
        "You extract legal compliance documents from cleaned web page text.\n\
         The page combines a privacy policy and a cookie policy. Return two sections, \
         each starting on its own line with a marker:\n\
         {PRIVACY_MARKER}\n<privacy policy text>\n\
         {COOKIE_MARKER}\n<cookie policy text>\n\
         {EXTRACTION_RULES}\n\
         Put every cookie, tracker or similar-technology section under {COOKIE_MARKER}. \
         If the page has no cookie-specific content, write {NO_COOKIE_POLICY_SENTINEL} \
         under {COOKIE_MARKER}. If the page has no privacy policy at all, reply with \
         exactly {NOT_FOUND_SENTINEL}."
    )
}

/// System prompt for deriving a cookie document from privacy text.
#[must_use]
pub fn cookie_from_privacy_system_prompt() -> String {
    format!(
        "You extract cookie information from a privacy policy.\n\
         Return only the sections about cookies, trackers, local storage or similar \
         technologies (traceurs), including consent and opt-out instructions.\n\
         {EXTRACTION_RULES}\n\
         If the text says nothing about cookies or trackers, reply with exactly \
         {NO_INFORMATION_SENTINEL} and nothing else."
    )
}

/// User prompt wrapping the page text.
#[must_use]
pub fn user_prompt(source_text: &str) -> String {
    format!("Page text:\n\n{source_text}")
}

/// Whether a trimmed reply is (or opens with) one of `sentinels`.
#[must_use]
pub fn is_sentinel_reply(reply: &str, sentinels: &[&str]) -> bool {
    let reply = reply.trim();
    reply.is_empty() || sentinels.iter().any(|s| reply.starts_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prompt_names_document_and_sentinel() {
        let prompt = single_system_prompt(DocumentKind::Cookie);
        assert!(prompt.contains("cookie policy"));
        assert!(prompt.contains(NOT_FOUND_SENTINEL));
    }

    #[test]
    fn test_combined_prompt_lists_markers_in_order() {
        let prompt = combined_system_prompt();
        let privacy = prompt.find(PRIVACY_MARKER).unwrap_or(usize::MAX);
        let cookie = prompt.find(COOKIE_MARKER).unwrap_or(0);
        assert!(privacy < cookie);
        assert!(prompt.contains(NO_COOKIE_POLICY_SENTINEL));
    }

    #[test]
    fn test_sentinel_reply() {
        assert!(is_sentinel_reply("  NO_DOCUMENT_FOUND\n", &[NOT_FOUND_SENTINEL]));
        assert!(is_sentinel_reply("NO_DOCUMENT_FOUND.", &[NOT_FOUND_SENTINEL]));
        assert!(is_sentinel_reply("", &[NOT_FOUND_SENTINEL]));
        assert!(!is_sentinel_reply("Privacy text", &[NOT_FOUND_SENTINEL]));
    }
}
