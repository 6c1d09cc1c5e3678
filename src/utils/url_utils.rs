//! URL validation and comparison helpers.

use url::Url;

/// Check if a URL is a well-formed absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    parse_http_url(url).is_some()
}

/// Parse an absolute http(s) URL, rejecting every other scheme.
#[must_use]
pub fn parse_http_url(url: &str) -> Option<Url> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return None;
    }

    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Some(parsed)
        }
        _ => None,
    }
}

/// Compare two addresses ignoring the fragment and a trailing slash.
///
/// `https://a.com/privacy#cookies` and `https://a.com/privacy/` name the
/// same document.
#[must_use]
pub fn same_document(a: &str, b: &str) -> bool {
    document_key(a) == document_key(b)
}

fn document_key(address: &str) -> String {
    match Url::parse(address) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => address
            .split('#')
            .next()
            .unwrap_or(address)
            .trim_end_matches('/')
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/legal?lang=fr"));
        assert!(is_valid_url("  https://example.com/  "));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("/privacy"));
        assert!(!is_valid_url("javascript:void(0)"));
        assert!(!is_valid_url("mailto:dpo@example.com"));
        assert!(!is_valid_url("ftp://example.com/file"));
    }

    #[test]
    fn test_same_document_ignores_fragment_and_slash() {
        assert!(same_document(
            "https://example.com/privacy#cookies",
            "https://example.com/privacy/"
        ));
        assert!(!same_document(
            "https://example.com/privacy",
            "https://example.com/cookies"
        ));
    }
}
