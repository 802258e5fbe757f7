//! Listing-page candidate filtering, scoring and ranking.
//!
//! Every anchor on the page is run through a filter gate, scored with
//! additive bonuses, then stable-sorted by score so that ties keep discovery
//! order. Only the top `limit` candidates survive.

use crate::anchors::{Anchor, char_len, find_anchors};
use crate::locator::{Selector, absolutize, selector_link_urls};
use crate::models::{LinkCandidate, Source};
use crate::sites::{SiteStrategy, strategy_for};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Anchor text must be strictly longer than this.
pub const MIN_TITLE_CHARS: usize = 10;
/// Anchor text strictly longer than this earns [`LONG_TITLE_BONUS`].
pub const LONG_TITLE_CHARS: usize = 40;

pub const DATE_PATH_BONUS: u32 = 20;
pub const NEWS_PATH_BONUS: u32 = 10;
pub const LONG_TITLE_BONUS: u32 = 5;
pub const SITE_NEWS_BONUS: u32 = 15;
pub const HIGH_PRIORITY_BONUS: u32 = 50;

/// Anchor texts containing any of these (case-insensitively) are site chrome.
pub const CHROME_PHRASES: &[&str] = &[
    "más",
    "ver todo",
    "menú",
    "login",
    "registrarse",
    "suscríbete",
    "términos",
    "política de privacidad",
    "&nbsp;",
];

const ARTICLE_PATH_MARKERS: &[&str] = &[
    "/tv/", "/noticia", "/articulo", ".html", ".aspx", "/2024/", "/2025/", "/2026/",
];

static DATE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").unwrap());
static SLUG_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[a-z-]+/\d+").unwrap());

/// Whether a raw href looks like an article on a site without special rules.
pub fn looks_like_article(href: &str) -> bool {
    ARTICLE_PATH_MARKERS.iter().any(|marker| href.contains(marker))
        || DATE_PATH.is_match(href)
        || SLUG_NUMBER.is_match(href)
        || (href.starts_with('/') && href.split('/').count() > 2)
}

fn is_chrome(text: &str) -> bool {
    let lower = text.to_lowercase();
    CHROME_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Sum of every bonus that applies to a link.
pub fn score(href: &str, title: &str, site_news: bool, high_priority: bool) -> u32 {
    let mut score = 0;
    if DATE_PATH.is_match(href) {
        score += DATE_PATH_BONUS;
    }
    if href.contains("/noticia") || href.contains("/articulo") {
        score += NEWS_PATH_BONUS;
    }
    if char_len(title) > LONG_TITLE_CHARS {
        score += LONG_TITLE_BONUS;
    }
    if site_news {
        score += SITE_NEWS_BONUS;
    }
    if high_priority {
        score += HIGH_PRIORITY_BONUS;
    }
    score
}

/// State for one pass over one listing page.
pub struct ListingScan<'a> {
    site: &'a SiteStrategy,
    base: Option<Url>,
    /// URLs already persisted for this source.
    known_urls: &'a HashSet<String>,
    high_priority: HashSet<String>,
    seen: HashSet<String>,
}

impl<'a> ListingScan<'a> {
    pub fn new(source: &Source, known_urls: &'a HashSet<String>) -> Self {
        let base = match Url::parse(&source.url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(source = %source.name, url = %source.url, error = %e, "Invalid source URL; relative links will be skipped");
                None
            }
        };
        Self {
            site: strategy_for(&source.url),
            base,
            known_urls,
            high_priority: HashSet::new(),
            seen: HashSet::new(),
        }
    }

    /// Collect high-priority URLs from the configured list selector, or from
    /// the site's legacy scan when no selector is set. A blank selector counts
    /// as unset.
    pub fn locate_highlights(&mut self, html: &str, list_selector: Option<&str>) {
        let base = self.base.as_ref();
        let urls = match list_selector.and_then(Selector::parse) {
            Some(selector) => selector_link_urls(html, selector, base),
            None => self
                .site
                .highlight_scan
                .map(|scan| scan(html, base))
                .unwrap_or_default(),
        };
        debug!(count = urls.len(), site = self.site.name, "High-priority URLs located");
        self.high_priority.extend(urls);
    }

    /// Absolute URL for an href, or `None` when it is neither absolute nor
    /// site-root-relative.
    fn resolve(&self, href: &str) -> Option<String> {
        if href.starts_with('/') {
            let base = self.base.as_ref()?;
            Some(absolutize(href, Some(base)))
        } else if href.starts_with("http") {
            Some(href.to_string())
        } else {
            None
        }
    }

    /// Run one anchor through the filter gate and score it.
    pub fn consider(&mut self, anchor: &Anchor) -> Option<LinkCandidate> {
        let href = anchor.href.as_str();
        let url = self.resolve(href)?;

        if char_len(&anchor.text) <= MIN_TITLE_CHARS
            || self.seen.contains(&url)
            || self.known_urls.contains(&url)
            || is_chrome(&anchor.text)
            || href.contains('#')
            || href.contains("javascript")
        {
            return None;
        }

        let site_news = match self.site.news_link {
            Some(rule) => {
                if !rule(href) {
                    return None;
                }
                true
            }
            None => {
                if !looks_like_article(href) {
                    return None;
                }
                false
            }
        };

        self.seen.insert(url.clone());
        let high_priority = self.high_priority.contains(&url);
        Some(LinkCandidate {
            score: score(href, &anchor.text, site_news, high_priority),
            title: anchor.text.clone(),
            url,
        })
    }

    /// Every accepted candidate on the page, in discovery order.
    pub fn candidates(&mut self, html: &str) -> Vec<LinkCandidate> {
        let anchors = find_anchors(html);
        let total = anchors.len();
        let accepted: Vec<LinkCandidate> = anchors
            .iter()
            .filter_map(|anchor| self.consider(anchor))
            .collect();
        debug!(total, valid = accepted.len(), "Scanned listing anchors");
        accepted
    }
}

/// Highest scores first, ties in discovery order, at most `limit` items.
pub fn rank(mut candidates: Vec<LinkCandidate>, limit: usize) -> Vec<LinkCandidate> {
    candidates.sort_by_key(|candidate| Reverse(candidate.score));
    candidates.truncate(limit);
    candidates
}

/// Discover, score and rank the article links on a source's listing page.
pub fn select_candidates(
    html: &str,
    source: &Source,
    known_urls: &HashSet<String>,
    limit: usize,
) -> Vec<LinkCandidate> {
    let mut scan = ListingScan::new(source, known_urls);
    scan.locate_highlights(html, source.list_container_selector.as_deref());
    rank(scan.candidates(html), limit)
}
