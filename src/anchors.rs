//! Pattern-based anchor discovery over raw HTML.
//!
//! Nothing in this crate builds a DOM. Links, paragraphs and containers are
//! found with non-greedy, case-insensitive regular expressions applied to the
//! page text, which keeps extraction behaviour stable on malformed markup.
//! The helpers here are shared by the locator, the ranker and the extractor.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<a ... href="..." ...>inner</a>`, attribute order agnostic.
static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a[^>]+href=["']([^"']+)["'][^>]*>([\s\S]*?)</a>"#).unwrap()
});

/// Opening anchor tag only, for container scans that just want the href.
static ANCHOR_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a[^>]+href=["']([^"']+)["'][^>]*>"#).unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// An anchor found in raw HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The raw `href` attribute value, unresolved.
    pub href: String,
    /// Anchor inner content with nested tags stripped and whitespace collapsed.
    pub text: String,
}

/// Find every `<a href=...>...</a>` pair in `html`.
///
/// Nested tags inside the anchor body (`<span>`, `<img>`, `<strong>`) are
/// tolerated and stripped from the text. Malformed or unclosed anchors are
/// matched on a best-effort basis only.
pub fn find_anchors(html: &str) -> Vec<Anchor> {
    ANCHOR
        .captures_iter(html)
        .map(|caps| Anchor {
            href: caps[1].to_string(),
            text: clean_text(&caps[2]),
        })
        .collect()
}

/// Hrefs of every opening `<a>` tag in `html`, in document order.
pub fn find_hrefs(html: &str) -> Vec<String> {
    ANCHOR_OPEN
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Href of the first opening `<a>` tag in `html`.
pub fn first_href(html: &str) -> Option<String> {
    ANCHOR_OPEN.captures(html).map(|caps| caps[1].to_string())
}

/// Remove every tag from a fragment, leaving its text runs in place.
pub fn strip_tags(fragment: &str) -> String {
    TAG.replace_all(fragment, "").into_owned()
}

/// Collapse any whitespace run (newlines and tabs included) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Strip tags then collapse whitespace.
pub fn clean_text(fragment: &str) -> String {
    collapse_whitespace(&strip_tags(fragment))
}

/// Length in characters, which is what every threshold in the crate counts.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_anchor() {
        let html = r#"
            <ul>
              <li><a href="/a">First</a></li>
              <li><a class="x" href="https://example.com/b" title="t">Second</a></li>
              <li><A HREF='/c'>Third</A></li>
            </ul>"#;
        let anchors = find_anchors(html);
        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[0].href, "/a");
        assert_eq!(anchors[1].href, "https://example.com/b");
        assert_eq!(anchors[2].href, "/c");
        assert_eq!(anchors[2].text, "Third");
    }

    #[test]
    fn test_nested_tags_stripped_and_whitespace_collapsed() {
        let html = "<a href=\"/n\">\n\t<span class=\"kicker\">Breaking</span>\n   <strong>Big</strong>\tnews\n</a>";
        let anchors = find_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].text, "Breaking Big news");
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let html = r#"<a name="top">Top</a><a href="/x">X</a>"#;
        let anchors = find_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "/x");
    }

    #[test]
    fn test_find_hrefs_and_first_href() {
        let html = r#"<h3><a href="/one">1</a></h3><a data-x="1" href="/two">"#;
        assert_eq!(find_hrefs(html), vec!["/one", "/two"]);
        assert_eq!(first_href(html).as_deref(), Some("/one"));
        assert_eq!(first_href("<p>no links</p>"), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  <b>Hola</b>\n\n mundo  "), "Hola mundo");
        assert_eq!(char_len("más"), 3);
    }
}
