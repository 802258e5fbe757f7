//! Error taxonomy for the scraping pipeline.
//!
//! Only a handful of these ever reach the caller of
//! [`Scraper::scrape`](crate::pipeline::Scraper::scrape): missing input,
//! no active sources, a failed source lookup, or a failed final insert.
//! Everything else is raised by a single fetch or parse and absorbed at the
//! article or source boundary.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while scraping sources.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The caller supplied an empty source list.
    #[error("No sources provided")]
    NoSources,

    /// None of the requested sources exist or are active.
    #[error("No active sources found")]
    NoActiveSources,

    /// The store could not list the requested sources.
    #[error("Store error: {0}")]
    Store(String),

    /// The final bulk insert failed; nothing from this batch was saved.
    #[error("Could not save scraped articles: {0}")]
    Persist(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The rendering proxy answered with a non-success status.
    #[error("Proxy returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Timed out after {after:?} fetching {url}")]
    Timeout { url: String, after: Duration },

    /// The listing page came back suspiciously small (bot wall or empty page).
    #[error("Listing HTML too short ({len} chars)")]
    ShortListing { len: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ScrapeError {
    /// Whether this error aborts a whole batch rather than a single unit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::NoSources
                | ScrapeError::NoActiveSources
                | ScrapeError::Store(_)
                | ScrapeError::Persist(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
