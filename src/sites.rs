//! Per-domain strategy registry.
//!
//! Each entry pairs a domain pattern with the listing scan, article-link rule
//! and body extractor that site needs. The last entry has no pattern and
//! carries the generic behaviour, so lookup always succeeds.

use crate::extract::{emol_body, soychile_body};
use crate::locator::{emol_headline_urls, soychile_highlight_urls};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Scans a listing page for structurally verified article links.
pub type HighlightScan = fn(&str, Option<&Url>) -> Vec<String>;
/// Decides whether a raw href is a news article on this site.
pub type NewsLinkRule = fn(&str) -> bool;
/// Pulls the body text out of an article page, if the site's container is present.
pub type ContentExtractor = fn(&str) -> Option<String>;

/// One entry of the strategy table.
#[derive(Debug)]
pub struct SiteStrategy {
    /// Short label used in logs.
    pub name: &'static str,
    /// Substring of the source URL that selects this entry; `None` matches any source.
    pub domain_pattern: Option<&'static str>,
    /// Finds the listing's highlighted links when the source has no list selector.
    pub highlight_scan: Option<HighlightScan>,
    /// When set, this rule alone decides which links are articles and a match
    /// earns the site bonus. Otherwise the generic path rules apply.
    pub news_link: Option<NewsLinkRule>,
    /// Site-specific body extractor, tried after the source's content selector.
    pub content: Option<ContentExtractor>,
}

impl SiteStrategy {
    /// Whether this entry applies to a source URL.
    pub fn matches(&self, source_url: &str) -> bool {
        self.domain_pattern
            .is_none_or(|pattern| source_url.contains(pattern))
    }

    /// Whether this is the fallback entry.
    pub fn is_generic(&self) -> bool {
        self.domain_pattern.is_none()
    }
}

/// Known sites first; the generic entry must stay last.
pub static STRATEGIES: [SiteStrategy; 3] = [
    SiteStrategy {
        name: "soychile",
        domain_pattern: Some("soychile.cl"),
        highlight_scan: Some(soychile_highlight_urls),
        news_link: Some(is_soychile_news),
        content: Some(soychile_body),
    },
    SiteStrategy {
        name: "emol",
        domain_pattern: Some("emol.com"),
        highlight_scan: Some(emol_headline_urls),
        news_link: Some(is_emol_news),
        content: Some(emol_body),
    },
    SiteStrategy {
        name: "generic",
        domain_pattern: None,
        highlight_scan: None,
        news_link: None,
        content: None,
    },
];

/// The strategy for a source URL. Falls back to the generic entry.
pub fn strategy_for(source_url: &str) -> &'static SiteStrategy {
    STRATEGIES
        .iter()
        .find(|strategy| strategy.matches(source_url))
        .unwrap_or(&STRATEGIES[STRATEGIES.len() - 1])
}

static YEAR_2020S_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/202[0-9]/").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+/").unwrap());

/// SoyChile articles are `.html` pages under a year or numeric id folder.
pub fn is_soychile_news(href: &str) -> bool {
    href.contains(".html") && (YEAR_2020S_SEGMENT.is_match(href) || NUMERIC_SEGMENT.is_match(href))
}

/// Emol articles live under `/noticias/`.
pub fn is_emol_news(href: &str) -> bool {
    href.contains("/noticias/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_domain() {
        assert_eq!(strategy_for("https://www.soychile.cl/").name, "soychile");
        assert_eq!(strategy_for("https://www.emol.com/").name, "emol");
        let generic = strategy_for("https://www.biobiochile.cl/");
        assert_eq!(generic.name, "generic");
        assert!(generic.is_generic());
        assert!(generic.content.is_none());
    }

    #[test]
    fn test_soychile_rule() {
        assert!(is_soychile_news("/Santiago/2025/05/06/1/nota.html"));
        assert!(is_soychile_news("/Valparaiso/Policial/884512/x.html"));
        assert!(!is_soychile_news("/Santiago/2025/05/06/1/nota"));
        assert!(!is_soychile_news("/contacto.html"));
    }

    #[test]
    fn test_emol_rule() {
        assert!(is_emol_news("https://www.emol.com/noticias/Nacional/2025/a.html"));
        assert!(!is_emol_news("https://www.emol.com/deportes/a.html"));
    }
}
