//! JavaScript evaluation scripts
//!
//! The closed set of DOM queries the pipeline runs inside the browser. Each
//! returns JSON that deserializes into a Rust type on the other side.

use crate::navigator::FOOTER_SELECTORS;

/// Shared anchor serializer; expects `anchors` (array of elements) in scope.
const ANCHOR_MAPPER: &str = r#"
        const footerSelector = __FOOTER__;
        const headerSelector = 'header, nav, [role="banner"], [role="navigation"]';
        const out = [];
        for (const a of anchors) {
            let address;
            try {
                address = new URL(a.getAttribute('href'), window.location.href);
            } catch (e) {
                continue;
            }
            if (!['http:', 'https:'].includes(address.protocol)) {
                continue;
            }
            const label = (a.innerText || a.textContent || a.getAttribute('aria-label') || a.getAttribute('title') || '')
                .replace(/\s+/g, ' ')
                .trim()
                .toLowerCase();
            out.push({
                text: label,
                address: address.href,
                inFooter: a.closest(footerSelector) !== null,
                inHeader: a.closest(headerSelector) !== null
            });
        }
        return out;
"#;

fn with_mapper(collect: &str) -> String {
    let footer = serde_json::to_string(&FOOTER_SELECTORS.join(", "))
        .unwrap_or_else(|_| "'footer'".to_string());
    format!(
        "(() => {{\n{collect}\n{}\n}})()",
        ANCHOR_MAPPER.replace("__FOOTER__", &footer)
    )
}

/// Script listing every `a[href]` in DOM order.
#[must_use]
pub fn list_anchors_script() -> String {
    with_mapper("        const anchors = Array.from(document.querySelectorAll('a[href]'));")
}

/// Script listing `a[href]` inside any container matching `selectors`.
///
/// Anchors reachable through several containers are reported once, in DOM order.
#[must_use]
pub fn list_anchors_within_script(selectors: &[&str]) -> String {
    let selectors = serde_json::to_string(selectors).unwrap_or_else(|_| "[]".to_string());
    let collect = format!(
        r#"        const containers = [];
        for (const sel of {selectors}) {{
            try {{
                document.querySelectorAll(sel).forEach(el => containers.push(el));
            }} catch (e) {{}}
        }}
        const anchors = Array.from(document.querySelectorAll('a[href]'))
            .filter(a => containers.some(c => c.contains(a)));"#
    );
    with_mapper(&collect)
}

/// Clicks the first visible accept/agree/continue control. Returns the clicked label or null.
pub const CONSENT_SCRIPT: &str = r#"
    (() => {
        const patterns = [
            'accept all', 'accept', 'agree', 'i agree', 'allow all', 'continue', 'got it', 'ok',
            'tout accepter', 'accepter', "j'accepte", 'accepter et continuer', "d'accord",
            'continuer', 'autoriser'
        ];
        const candidates = document.querySelectorAll(
            'button, [role="button"], a, input[type="button"], input[type="submit"]'
        );
        for (const el of candidates) {
            const label = (el.innerText || el.value || el.getAttribute('aria-label') || '')
                .replace(/\s+/g, ' ')
                .trim()
                .toLowerCase();
            if (!label || label.length > 40) {
                continue;
            }
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) {
                continue;
            }
            if (patterns.some(p => label === p || label.startsWith(p + ' '))) {
                el.click();
                return label;
            }
        }
        return null;
    })()
"#;

/// Reports document readiness and the number of resource entries seen so far.
pub const READINESS_SCRIPT: &str = r"
    (() => ({
        readyState: document.readyState,
        bodyExists: document.body !== null,
        resourceCount: performance.getEntriesByType('resource').length
    }))()
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_script_embeds_selectors_as_json() {
        let script = list_anchors_within_script(&["footer", "[role=\"contentinfo\"]"]);
        assert!(script.contains(r#"["footer","[role=\"contentinfo\"]"]"#));
        assert!(script.contains("containers.some"));
    }

    #[test]
    fn test_mapper_placeholder_is_replaced() {
        let script = list_anchors_script();
        assert!(!script.contains("__FOOTER__"));
        assert!(script.contains("#footer"));
        assert!(script.trim_start().starts_with("(() => {"));
    }
}
