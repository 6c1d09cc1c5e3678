//! Policy-container selection and text serialization.
//!
//! Works on a detached copy of the page DOM:
//! 1. Noise containers (headers, navigation, footers, banners, ads, sidebars)
//!    are collected into a removal set once
//! 2. Ordered policy selectors are tried until one element carries more than
//!    [`MIN_CONTAINER_TEXT_CHARS`] characters of text
//! 3. The document body is used when nothing qualifies

use ego_tree::NodeId;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::utils::MIN_CONTAINER_TEXT_CHARS;

/// Candidate policy containers, most specific first.
pub const POLICY_CONTAINER_SELECTORS: &[&str] = &[
    ".privacy-policy",
    "#privacy-policy",
    ".cookie-policy",
    "#cookie-policy",
    ".terms",
    "#terms",
    ".legal",
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    "#content",
    ".main-content",
];

/// Containers that never hold policy text.
pub const NOISE_SELECTORS: &[&str] = &[
    "header",
    "nav",
    "footer",
    "aside",
    "[role=\"banner\"]",
    "[role=\"navigation\"]",
    ".cookie-banner",
    "#cookie-banner",
    ".cookie-consent",
    ".cookie-notice",
    "#onetrust-banner-sdk",
    "#onetrust-consent-sdk",
    ".advertisement",
    ".ads",
    ".ad",
    ".sidebar",
    "#sidebar",
];

/// Elements whose text is never part of the document.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

// Parsed once at first access. Hardcoded selectors failing to parse is a bug.

static CONTAINER_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    POLICY_CONTAINER_SELECTORS
        .iter()
        .map(|&s| {
            let selector = Selector::parse(s)
                .unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{s}' is invalid: {e}"));
            (s, selector)
        })
        .collect()
});

static NOISE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&NOISE_SELECTORS.join(", "))
        .expect("BUG: hardcoded noise selector list is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// Collect every noise container in the document.
fn noise_nodes(document: &Html) -> HashSet<NodeId> {
    document.select(&NOISE_SELECTOR).map(|el| el.id()).collect()
}

fn is_inside_noise(element: &ElementRef, noise: &HashSet<NodeId>) -> bool {
    noise.contains(&element.id()) || element.ancestors().any(|a| noise.contains(&a.id()))
}

/// Elements that end a paragraph: a blank line separates them from what follows.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article", "main", "ul", "ol", "dl",
    "table", "blockquote", "pre", "figure", "form",
];

/// Elements that end a line but not a paragraph.
const LINE_TAGS: &[&str] = &[
    "div", "li", "dt", "dd", "tr", "br", "hr", "caption", "figcaption", "address",
];

enum Step<'a> {
    Visit(ego_tree::NodeRef<'a, Node>),
    Close(Break),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Break {
    Line,
    Paragraph,
}

fn break_after(tag: &str) -> Option<Break> {
    if PARAGRAPH_TAGS.contains(&tag) {
        Some(Break::Paragraph)
    } else if LINE_TAGS.contains(&tag) {
        Some(Break::Line)
    } else {
        None
    }
}

/// Accumulates inline text into lines.
#[derive(Default)]
struct TextLines {
    lines: Vec<String>,
    current: String,
}

impl TextLines {
    /// Append inline text, folding every whitespace run into one space.
    fn push_inline(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(c);
            }
        }
    }

    fn end(&mut self, kind: Break) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        self.current.clear();
        if kind == Break::Paragraph && self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> String {
        self.end(Break::Line);
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

/// Serialize the text below `root`, skipping noise and non-content tags.
///
/// Inline text flows into one line; block elements end the line and
/// paragraph-level blocks leave a blank line behind. Uses an explicit stack so
/// deeply nested markup cannot exhaust the call stack.
pub fn serialize_text(root: &ElementRef, noise: &HashSet<NodeId>) -> String {
    let mut out = TextLines::default();
    let mut stack = vec![Step::Visit(**root)];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::Close(kind) => {
                out.end(kind);
                continue;
            }
        };
        match node.value() {
            Node::Text(text) => out.push_inline(text),
            Node::Element(element) => {
                let name = element.name();
                if noise.contains(&node.id()) || SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if let Some(kind) = break_after(name) {
                    out.end(Break::Line);
                    stack.push(Step::Close(kind));
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev().map(Step::Visit));
            }
            _ => {}
        }
    }

    out.finish()
}

/// Pick the policy container and return its raw serialized text.
///
/// Returns the selector that matched (or `"body"`) alongside the text.
pub fn select_policy_text(document: &Html) -> (&'static str, String) {
    let noise = noise_nodes(document);

    for (name, selector) in CONTAINER_SELECTORS.iter() {
        for element in document.select(selector) {
            if is_inside_noise(&element, &noise) {
                continue;
            }
            let text = serialize_text(&element, &noise);
            if text.chars().count() > MIN_CONTAINER_TEXT_CHARS {
                log::debug!("Policy container matched '{}' ({} chars)", name, text.len());
                return (name, text);
            }
        }
    }

    log::debug!("No policy container qualified, falling back to <body>");
    let text = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| serialize_text(&body, &noise))
        .unwrap_or_else(|| serialize_text(&document.root_element(), &noise));
    ("body", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(word: &str) -> String {
        std::iter::repeat_n(word, 60).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_prefers_policy_container() {
        let html = format!(
            r#"<html><body>
                <header><a href="/">Home</a></header>
                <div class="privacy-policy"><h1>Privacy</h1><p>{}</p></div>
                <main><p>{}</p></main>
            </body></html>"#,
            long_text("data"),
            long_text("other")
        );
        let document = Html::parse_document(&html);
        let (selector, text) = select_policy_text(&document);
        assert_eq!(selector, ".privacy-policy");
        assert!(text.starts_with("Privacy\n\ndata data"));
        assert!(!text.contains("other"));
    }

    #[test]
    fn test_short_container_is_skipped() {
        let html = format!(
            r#"<html><body>
                <article>Too short</article>
                <main><p>{}</p></main>
            </body></html>"#,
            long_text("cookies")
        );
        let document = Html::parse_document(&html);
        let (selector, _) = select_policy_text(&document);
        assert_eq!(selector, "main");
    }

    #[test]
    fn test_falls_back_to_body_without_noise() {
        let html = r#"<html><body>
            <nav>Menu</nav>
            <p>We collect data.</p>
            <script>var tracking = 1;</script>
            <style>p { color: red }</style>
            <footer>Copyright</footer>
        </body></html>"#;
        let document = Html::parse_document(html);
        let (selector, text) = select_policy_text(&document);
        assert_eq!(selector, "body");
        assert_eq!(text, "We collect data.");
    }

    #[test]
    fn test_container_inside_footer_is_ignored() {
        let html = format!(
            r#"<html><body>
                <footer><div class="legal">{}</div></footer>
                <p>Body text</p>
            </body></html>"#,
            long_text("footer")
        );
        let document = Html::parse_document(&html);
        let (selector, text) = select_policy_text(&document);
        assert_eq!(selector, "body");
        assert_eq!(text, "Body text");
    }

    #[test]
    fn test_nested_noise_removed_inside_container() {
        let html = format!(
            r#"<html><body><article>
                <aside class="sidebar">Related links</aside>
                <div class="cookie-banner">Accept all</div>
                <p>{}</p>
            </article></body></html>"#,
            long_text("terms")
        );
        let document = Html::parse_document(&html);
        let (selector, text) = select_policy_text(&document);
        assert_eq!(selector, "article");
        assert!(!text.contains("Related links"));
        assert!(!text.contains("Accept all"));
    }

    #[test]
    fn test_inline_markup_stays_on_one_line() {
        let html = r#"<html><body><main>
            <p>We use <a href="/c">cookies</a> for <b>ads</b>, and
               analytics.</p>
            <ul><li>Essential</li><li>Marketing <em>only</em></li></ul>
        </main></body></html>"#;
        let document = Html::parse_document(html);
        let (_, text) = select_policy_text(&document);
        assert_eq!(
            text,
            "We use cookies for ads, and analytics.\n\nEssential\nMarketing only"
        );
    }
}
