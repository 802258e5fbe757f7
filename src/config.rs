//! Operational tunables for a scrape run.
//!
//! Every field has a default, so an empty or partial YAML file is valid:
//!
//! ```yaml
//! concurrent_sources: 3
//! articles_per_source: 3
//! listing_timeout_secs: 45
//! ```

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_PROXY_ENDPOINT: &str = "https://app.scrapingbee.com/api/v1/";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Sources scraped in parallel per chunk.
    pub concurrent_sources: usize,
    /// Top-ranked candidates fetched per source.
    pub articles_per_source: usize,
    /// How many of a source's newest persisted URLs are checked for dedup.
    pub recent_url_window: usize,
    pub listing_timeout_secs: u64,
    pub article_timeout_secs: u64,
    /// Listing pages shorter than this are treated as a failed fetch.
    pub min_listing_html_len: usize,
    /// Proxy render wait for listing pages.
    pub listing_wait_ms: u32,
    /// Proxy render wait for article pages.
    pub article_wait_ms: u32,
    pub proxy_endpoint: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrent_sources: 3,
            articles_per_source: 3,
            recent_url_window: 100,
            listing_timeout_secs: 45,
            article_timeout_secs: 20,
            min_listing_html_len: 1000,
            listing_wait_ms: 2000,
            article_wait_ms: 1000,
            proxy_endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    /// Chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        self.concurrent_sources.max(1)
    }
}

/// Parse a YAML config document.
pub fn parse_config(yaml: &str) -> Result<ScrapeConfig> {
    if yaml.trim().is_empty() {
        return Ok(ScrapeConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the config at `path`, or defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<ScrapeConfig> {
    let Some(path) = path else {
        return Ok(ScrapeConfig::default());
    };
    let yaml = fs::read_to_string(path).await?;
    let config = parse_config(&yaml)?;
    info!(?config, "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.concurrent_sources, 3);
        assert_eq!(config.articles_per_source, 3);
        assert_eq!(config.recent_url_window, 100);
        assert_eq!(config.listing_timeout(), Duration::from_secs(45));
        assert_eq!(config.article_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config("articles_per_source: 5\nlisting_timeout_secs: 10\n").unwrap();
        assert_eq!(config.articles_per_source, 5);
        assert_eq!(config.listing_timeout_secs, 10);
        assert_eq!(config.concurrent_sources, 3);
        assert_eq!(config.proxy_endpoint, DEFAULT_PROXY_ENDPOINT);
    }

    #[test]
    fn test_empty_yaml_and_zero_chunk() {
        assert_eq!(parse_config("").unwrap(), ScrapeConfig::default());
        let config = parse_config("concurrent_sources: 0").unwrap();
        assert_eq!(config.chunk_size(), 1);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(parse_config("concurrent_sources: [nope").is_err());
    }

    #[tokio::test]
    async fn test_load_config_without_path() {
        assert_eq!(load_config(None).await.unwrap(), ScrapeConfig::default());
    }
}
