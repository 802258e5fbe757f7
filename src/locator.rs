//! Narrow a raw page down to the regions that hold links or body text.
//!
//! Two paths exist. A source may configure a simple selector (`.class`,
//! `#id` or a bare token) that is turned into a `<div>` pattern, or the
//! source's domain may have a hand-written scan in the [`sites`] registry.
//!
//! Container capture is deliberately non-recursive: a match runs from the
//! opening `<div>` to the *next* `</div>`, so a container with nested divs is
//! cut short at the first inner close tag. Real-site selectors were tuned
//! against that behaviour.
//!
//! [`sites`]: crate::sites

use crate::anchors::{find_hrefs, first_href};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use url::Url;

/// A simple selector as configured on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// `.name`: a div whose `class` attribute contains `name`.
    Class(&'a str),
    /// `#name`: a div whose `id` is exactly `name`.
    Id(&'a str),
    /// Anything else: a div whose `id` or `class` is exactly the token.
    Token(&'a str),
}

impl<'a> Selector<'a> {
    /// Parse a configured selector. Blank selectors yield `None`.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        let selector = if let Some(name) = raw.strip_prefix('.') {
            Selector::Class(name)
        } else if let Some(name) = raw.strip_prefix('#') {
            Selector::Id(name)
        } else {
            Selector::Token(raw)
        };
        match selector {
            Selector::Class(n) | Selector::Id(n) | Selector::Token(n) if n.is_empty() => None,
            s => Some(s),
        }
    }

    /// Pattern for the div this selector names. Group 1 is the div body.
    fn pattern(&self) -> Option<Regex> {
        let source = match self {
            Selector::Class(name) => format!(
                r#"(?i)<div[^>]*class=["'][^"']*{}[^"']*["'][^>]*>([\s\S]*?)</div>"#,
                regex::escape(name)
            ),
            Selector::Id(name) => format!(
                r#"(?i)<div[^>]*id=["']{}["'][^>]*>([\s\S]*?)</div>"#,
                regex::escape(name)
            ),
            Selector::Token(name) => format!(
                r#"(?i)<div[^>]*(?:id|class)=["']{}["'][^>]*>([\s\S]*?)</div>"#,
                regex::escape(name)
            ),
        };
        match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(selector = ?self, error = %e, "Unusable selector pattern");
                None
            }
        }
    }
}

/// Bodies of every div matching `selector`, in document order.
pub fn find_containers<'h>(html: &'h str, selector: Selector<'_>) -> Vec<&'h str> {
    let Some(pattern) = selector.pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// The first div matching `selector`, opening tag included.
pub fn find_container<'h>(html: &'h str, selector: Selector<'_>) -> Option<&'h str> {
    selector.pattern()?.find(html).map(|m| m.as_str())
}

/// Scheme, host and port of `base`, e.g. `https://example.com:8080`.
pub fn origin(base: &Url) -> Option<String> {
    let origin = base.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Resolve a site-root-relative href against `base`; other hrefs pass through.
pub fn absolutize(href: &str, base: Option<&Url>) -> String {
    if href.starts_with('/') {
        if let Some(origin) = base.and_then(origin) {
            return format!("{origin}{href}");
        }
    }
    href.to_string()
}

/// Every link inside the containers named by a configured list selector.
pub fn selector_link_urls(html: &str, selector: Selector<'_>, base: Option<&Url>) -> Vec<String> {
    find_containers(html, selector)
        .into_iter()
        .flat_map(find_hrefs)
        .map(|href| absolutize(&href, base))
        .collect()
}

static SOYCHILE_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<div[^>]*class=["'][^"']*destacadas-wrapper[^"']*["'][^>]*>([\s\S]*?)</div>"#,
    )
    .unwrap()
});

static SOYCHILE_MEDIA_DESC_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)class=["'][^"']*media-desc[^"']*["'][\s\S]*?<a[^>]+href=["']([^"']+)["']"#)
        .unwrap()
});

static EMOL_HEADLINE_BOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<div[^>]*id=["'](?:ucHomePage_cuNoticiasCentral_contTitular|ucHomePage_cuNoticiasCentral_repNoticiasCetral_cajaSec_\d+)[^"']*["'][^>]*>([\s\S]*?)</div>"#,
    )
    .unwrap()
});

/// SoyChile highlights: the `media-desc` link inside each `destacadas-wrapper`.
pub fn soychile_highlight_urls(html: &str, base: Option<&Url>) -> Vec<String> {
    SOYCHILE_WRAPPER
        .captures_iter(html)
        .filter_map(|wrapper| {
            SOYCHILE_MEDIA_DESC_LINK
                .captures(&wrapper[1])
                .map(|caps| absolutize(&caps[1], base))
        })
        .collect()
}

/// Emol front page: the first link of the main headline box and of every
/// numbered secondary box.
pub fn emol_headline_urls(html: &str, base: Option<&Url>) -> Vec<String> {
    EMOL_HEADLINE_BOX
        .captures_iter(html)
        .filter_map(|caps| first_href(&caps[1]))
        .map(|href| absolutize(&href, base))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.example.cl/portada/").unwrap()
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse(".news-list"), Some(Selector::Class("news-list")));
        assert_eq!(Selector::parse("#main"), Some(Selector::Id("main")));
        assert_eq!(Selector::parse("portada"), Some(Selector::Token("portada")));
        assert_eq!(Selector::parse("."), None);
        assert_eq!(Selector::parse("  "), None);
    }

    #[test]
    fn test_class_selector_matches_within_class_list() {
        let html = r#"<div class="col news-list big"><a href="/a">A</a></div>"#;
        let found = find_containers(html, Selector::Class("news-list"));
        assert_eq!(found, vec![r#"<a href="/a">A</a>"#]);
    }

    #[test]
    fn test_id_selector_is_exact() {
        let html = r#"<div id="main-2">x</div><div id="main">y</div>"#;
        assert_eq!(find_containers(html, Selector::Id("main")), vec!["y"]);
    }

    #[test]
    fn test_container_capture_stops_at_first_close_tag() {
        let html = r#"<div class="box"><div>inner</div><a href="/lost">lost</a></div>"#;
        let found = find_containers(html, Selector::Class("box"));
        assert_eq!(found, vec!["<div>inner"]);
    }

    #[test]
    fn test_find_container_includes_opening_tag() {
        let html = r#"<p>x</p><div id="cuerpo"><p>body</p></div>"#;
        assert_eq!(
            find_container(html, Selector::Id("cuerpo")),
            Some(r#"<div id="cuerpo"><p>body</p></div>"#)
        );
    }

    #[test]
    fn test_absolutize() {
        let base = base();
        assert_eq!(absolutize("/x/1", Some(&base)), "https://www.example.cl/x/1");
        assert_eq!(absolutize("https://o.cl/y", Some(&base)), "https://o.cl/y");
        assert_eq!(absolutize("rel.html", Some(&base)), "rel.html");
        assert_eq!(absolutize("/x", None), "/x");

        let with_port = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(absolutize("/a", Some(&with_port)), "http://localhost:8080/a");
    }

    #[test]
    fn test_selector_link_urls() {
        let html = r#"
            <div class="listado"><a href="/n/1">one</a> <a href="https://other.cl/2">two</a></div>
            <div class="listado"><a href="/n/3">three</a></div>
            <a href="/outside">outside</a>"#;
        let urls = selector_link_urls(html, Selector::Class("listado"), Some(&base()));
        assert_eq!(
            urls,
            vec![
                "https://www.example.cl/n/1",
                "https://other.cl/2",
                "https://www.example.cl/n/3"
            ]
        );
    }

    #[test]
    fn test_soychile_highlights() {
        let html = r#"
            <div class="destacadas-wrapper grid">
              <span class="media-desc"><h2><a href="/Santiago/2025/05/06/1/nota.html">Nota</a></h2></span>
            </div>
            <div class="destacadas-wrapper"><span>no desc</span><a href="/skip">x</a></div>"#;
        assert_eq!(
            soychile_highlight_urls(html, Some(&base())),
            vec!["https://www.example.cl/Santiago/2025/05/06/1/nota.html"]
        );
    }

    #[test]
    fn test_emol_headlines() {
        let html = r#"
            <div id="ucHomePage_cuNoticiasCentral_contTitular"><h1><a href="/noticias/Nacional/2025/05/06/1/a.html">A</a></h1></div>
            <div id="ucHomePage_cuNoticiasCentral_repNoticiasCetral_cajaSec_3"><h3><a href="https://www.emol.com/noticias/b.html">B</a><a href="/second">C</a></h3></div>
            <div id="otro"><a href="/nope">N</a></div>"#;
        assert_eq!(
            emol_headline_urls(html, Some(&base())),
            vec![
                "https://www.example.cl/noticias/Nacional/2025/05/06/1/a.html",
                "https://www.emol.com/noticias/b.html"
            ]
        );
    }

    #[test]
    fn test_no_match_returns_empty() {
        assert!(find_containers("<p>plain</p>", Selector::Class("x")).is_empty());
        assert!(soychile_highlight_urls("<p>plain</p>", None).is_empty());
        assert!(emol_headline_urls("<p>plain</p>", None).is_empty());
    }
}
