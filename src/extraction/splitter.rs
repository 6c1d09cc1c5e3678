//! Splitting a combined privacy + cookie response into its two documents.
//!
//! Marker order does not matter, marker identity does: each section is the
//! text between its marker and the next marker (or the end), attributed to the
//! marker that heads it.

use super::prompts::{COOKIE_MARKER, PRIVACY_MARKER};

/// The two sections of a combined response. `None` means the section was absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedSplit {
    pub privacy: Option<String>,
    pub cookie: Option<String>,
}

/// Whether `text[..idx]` on the current line holds only whitespace or markdown decoration.
fn at_line_start(text: &str, idx: usize) -> bool {
    let line_start = text[..idx].rfind('\n').map_or(0, |p| p + 1);
    text[line_start..idx]
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '#' | '*' | '-' | '>' | '_'))
}

/// First occurrence of `marker` at a line start, else its first occurrence anywhere.
fn find_marker(text: &str, marker: &str) -> Option<usize> {
    text.match_indices(marker)
        .map(|(idx, _)| idx)
        .find(|&idx| at_line_start(text, idx))
        .or_else(|| text.find(marker))
}

fn clean_section(section: &str) -> Option<String> {
    let trimmed = section.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '_'));
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split a combined response on [`PRIVACY_MARKER`] and [`COOKIE_MARKER`].
///
/// - both markers, privacy first: slice normally
/// - one marker: the other section is `None`
/// - both markers reversed: slice by position, each section keeps its own marker's identity
/// - no marker: the whole reply is taken as the privacy section
#[must_use]
pub fn split_combined(text: &str) -> CombinedSplit {
    let privacy_at = find_marker(text, PRIVACY_MARKER);
    let cookie_at = find_marker(text, COOKIE_MARKER);

    let section = |start: usize, marker: &str, next: Option<usize>| {
        let from = start + marker.len();
        let to = next.filter(|&n| n >= from).unwrap_or(text.len());
        clean_section(&text[from..to])
    };

    match (privacy_at, cookie_at) {
        (None, None) => CombinedSplit {
            privacy: clean_section(text),
            cookie: None,
        },
        (Some(p), None) => CombinedSplit {
            privacy: section(p, PRIVACY_MARKER, None),
            cookie: None,
        },
        (None, Some(c)) => CombinedSplit {
            privacy: None,
            cookie: section(c, COOKIE_MARKER, None),
        },
        (Some(p), Some(c)) if p < c => CombinedSplit {
            privacy: section(p, PRIVACY_MARKER, Some(c)),
            cookie: section(c, COOKIE_MARKER, None),
        },
        (Some(p), Some(c)) => CombinedSplit {
            cookie: section(c, COOKIE_MARKER, Some(p)),
            privacy: section(p, PRIVACY_MARKER, None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_in_order() {
        let split = split_combined("PRIVACY POLICY:\nP\nCOOKIE POLICY:\nC");
        assert_eq!(split.privacy.as_deref(), Some("P"));
        assert_eq!(split.cookie.as_deref(), Some("C"));
    }

    #[test]
    fn test_only_privacy_marker() {
        let split = split_combined("PRIVACY POLICY:\nP");
        assert_eq!(split.privacy.as_deref(), Some("P"));
        assert_eq!(split.cookie, None);
    }

    #[test]
    fn test_only_cookie_marker() {
        let split = split_combined("Intro\nCOOKIE POLICY:\nWe use cookies.");
        assert_eq!(split.privacy, None);
        assert_eq!(split.cookie.as_deref(), Some("We use cookies."));
    }

    #[test]
    fn test_reversed_markers_keep_identity() {
        let split = split_combined("COOKIE POLICY:\nC text\n\nPRIVACY POLICY:\nP text");
        assert_eq!(split.privacy.as_deref(), Some("P text"));
        assert_eq!(split.cookie.as_deref(), Some("C text"));
    }

    #[test]
    fn test_preamble_before_first_marker_dropped() {
        let split = split_combined("Here you go:\nPRIVACY POLICY:\nP\nCOOKIE POLICY:\nC");
        assert_eq!(split.privacy.as_deref(), Some("P"));
        assert_eq!(split.cookie.as_deref(), Some("C"));
    }

    #[test]
    fn test_quoted_marker_inside_section_prefers_line_start() {
        let text = "PRIVACY POLICY:\nSee the section titled \"COOKIE POLICY: details\" below.\n\
                    COOKIE POLICY:\nC";
        let split = split_combined(text);
        assert_eq!(
            split.privacy.as_deref(),
            Some("See the section titled \"COOKIE POLICY: details\" below.")
        );
        assert_eq!(split.cookie.as_deref(), Some("C"));
    }

    #[test]
    fn test_inline_markers_fall_back_to_any_occurrence() {
        let split = split_combined("Result - PRIVACY POLICY: P. And COOKIE POLICY: C.");
        assert_eq!(split.privacy.as_deref(), Some("P. And"));
        assert_eq!(split.cookie.as_deref(), Some("C."));
    }

    #[test]
    fn test_first_occurrence_wins_on_repeated_markers() {
        let split = split_combined("PRIVACY POLICY:\nA\nPRIVACY POLICY:\nB\nCOOKIE POLICY:\nC");
        assert_eq!(split.privacy.as_deref(), Some("A\nPRIVACY POLICY:\nB"));
        assert_eq!(split.cookie.as_deref(), Some("C"));
    }

    #[test]
    fn test_markdown_decorated_markers() {
        let split = split_combined("**PRIVACY POLICY:**\nP\n\n## COOKIE POLICY:\nC");
        assert_eq!(split.privacy.as_deref(), Some("P"));
        assert_eq!(split.cookie.as_deref(), Some("C"));
    }

    #[test]
    fn test_empty_section_is_none() {
        let split = split_combined("PRIVACY POLICY:\nP\nCOOKIE POLICY:\n   ");
        assert_eq!(split.cookie, None);
    }

    #[test]
    fn test_no_markers_is_privacy() {
        let split = split_combined("  Just a privacy policy.  ");
        assert_eq!(split.privacy.as_deref(), Some("Just a privacy policy."));
        assert_eq!(split.cookie, None);
    }
}
