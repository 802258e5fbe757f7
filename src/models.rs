//! Data models shared by the scraping pipeline.
//!
//! - [`Source`]: a configured news site, read-only to the pipeline
//! - [`LinkCandidate`]: a scored link discovered on a listing page
//! - [`ExtractedArticle`]: the insert-only record handed to the store
//! - [`ScrapeOutcome`]: what one `scrape` invocation returns
//!
//! Field names follow the store's column names (`original_url`,
//! `selector_list_container`, ...) so records serialize straight into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for one news site.
///
/// Selectors, when present, are single-class (`.x`) or single-id (`#x`)
/// selectors. Anything else is treated as a bare class-or-id token.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub name: String,
    /// Listing page URL; also the base for resolving site-root-relative links.
    pub url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Container holding the listing's article links.
    #[serde(default, rename = "selector_list_container")]
    pub list_container_selector: Option<String>,
    /// Container holding an article page's body text.
    #[serde(default, rename = "selector_content")]
    pub content_selector: Option<String>,
}

fn default_active() -> bool {
    true
}

/// A potential article link found while scanning a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Cleaned anchor text.
    pub title: String,
    /// Absolute article URL.
    pub url: String,
    pub score: u32,
}

/// An article accepted by the pipeline.
///
/// `is_processed` and `is_selected` start false and belong to the downstream
/// editorial workflow.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    /// First 200 characters of `content`, with `...` appended when cut.
    pub summary: String,
    pub original_url: String,
    pub image_url: Option<String>,
    pub source_id: String,
    pub published_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
    pub is_processed: bool,
    pub is_selected: bool,
}

/// Result of a successful `scrape` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeOutcome {
    pub count: usize,
    pub articles: Vec<ExtractedArticle>,
}

impl ScrapeOutcome {
    pub fn new(articles: Vec<ExtractedArticle>) -> Self {
        Self {
            count: articles.len(),
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_deserialization_with_store_columns() {
        let json = r##"{
            "id": "src-1",
            "name": "Emol",
            "url": "https://www.emol.com",
            "is_active": true,
            "selector_list_container": ".portada",
            "selector_content": "#cuerpo"
        }"##;

        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.list_container_selector.as_deref(), Some(".portada"));
        assert_eq!(source.content_selector.as_deref(), Some("#cuerpo"));
    }

    #[test]
    fn test_source_defaults() {
        let json = r#"{"id": "s", "name": "n", "url": "https://example.com"}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert!(source.is_active);
        assert_eq!(source.list_container_selector, None);
        assert_eq!(source.content_selector, None);
    }

    #[test]
    fn test_outcome_counts_articles() {
        let outcome = ScrapeOutcome::new(vec![]);
        assert_eq!(outcome.count, 0);

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"count\":0"));
    }
}
