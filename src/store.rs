//! Persistence collaborator.
//!
//! The pipeline only needs three things from storage: the active sources for
//! a set of ids, a source's most recent article URLs (for dedup) and one bulk
//! insert at the end of a batch. [`JsonFileStore`] backs the CLI with two JSON
//! files; [`MemoryStore`] keeps everything in memory.

use crate::error::{Result, ScrapeError};
use crate::models::{ExtractedArticle, Source};
use std::cmp::Reverse;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::{info, instrument};

/// Storage used by the scraping pipeline.
///
/// Implementations read sources, report which article URLs are already
/// stored, and save a batch of new articles.
pub trait ArticleStore {
    /// Active sources among `ids`, in the order the store holds them.
    ///
    /// # Arguments
    ///
    /// * `ids` - Source ids requested by the caller; unknown ids are ignored
    ///
    /// # Returns
    ///
    /// The matching sources with `is_active` set. An empty list is not an error.
    async fn list_active_sources(&self, ids: &[String]) -> Result<Vec<Source>>;

    /// URLs of the source's newest `limit` articles, newest first.
    ///
    /// # Arguments
    ///
    /// * `source_id` - Source whose articles are listed
    /// * `limit` - Maximum number of URLs returned
    async fn list_recent_article_urls(&self, source_id: &str, limit: usize) -> Result<Vec<String>>;

    /// Insert every article or none.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the whole batch is stored, or [`ScrapeError::Persist`] if nothing was.
    async fn bulk_insert_articles(&self, articles: &[ExtractedArticle]) -> Result<()>;
}

fn active_sources(sources: &[Source], ids: &[String]) -> Vec<Source> {
    sources
        .iter()
        .filter(|source| source.is_active && ids.contains(&source.id))
        .cloned()
        .collect()
}

fn recent_urls(articles: &[ExtractedArticle], source_id: &str, limit: usize) -> Vec<String> {
    let mut own: Vec<&ExtractedArticle> = articles
        .iter()
        .filter(|article| article.source_id == source_id)
        .collect();
    own.sort_by_key(|article| Reverse(article.scraped_at));
    own.into_iter()
        .take(limit)
        .map(|article| article.original_url.clone())
        .collect()
}

/// Sources and articles kept as two JSON arrays on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    sources_path: PathBuf,
    articles_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(sources_path: impl Into<PathBuf>, articles_path: impl Into<PathBuf>) -> Self {
        Self {
            sources_path: sources_path.into(),
            articles_path: articles_path.into(),
        }
    }

    async fn read_sources(&self) -> Result<Vec<Source>> {
        let json = fs::read_to_string(&self.sources_path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Saved articles; a missing file means none yet.
    async fn read_articles(&self) -> Result<Vec<ExtractedArticle>> {
        match fs::read_to_string(&self.articles_path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ArticleStore for JsonFileStore {
    #[instrument(level = "debug", skip_all)]
    async fn list_active_sources(&self, ids: &[String]) -> Result<Vec<Source>> {
        let sources = self
            .read_sources()
            .await
            .map_err(|e| ScrapeError::Store(e.to_string()))?;
        Ok(active_sources(&sources, ids))
    }

    async fn list_recent_article_urls(&self, source_id: &str, limit: usize) -> Result<Vec<String>> {
        Ok(recent_urls(&self.read_articles().await?, source_id, limit))
    }

    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    async fn bulk_insert_articles(&self, articles: &[ExtractedArticle]) -> Result<()> {
        let write = async {
            let mut all = self.read_articles().await?;
            all.extend_from_slice(articles);
            let json = serde_json::to_string_pretty(&all)?;
            // Write beside the target then rename, so a failed write leaves the old file intact.
            let tmp = self.articles_path.with_extension("json.tmp");
            fs::write(&tmp, json).await?;
            fs::rename(&tmp, &self.articles_path).await?;
            Ok::<usize, ScrapeError>(all.len())
        };
        let total = write.await.map_err(|e| ScrapeError::Persist(e.to_string()))?;
        info!(total, path = %self.articles_path.display(), "Saved articles");
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sources: Vec<Source>,
    articles: Mutex<Vec<ExtractedArticle>>,
    fail_inserts: bool,
}

impl MemoryStore {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }

    /// A store whose bulk insert always fails.
    pub fn failing_inserts(sources: Vec<Source>) -> Self {
        Self {
            sources,
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn articles(&self) -> Vec<ExtractedArticle> {
        self.articles
            .lock()
            .map(|articles| articles.clone())
            .unwrap_or_default()
    }
}

impl ArticleStore for MemoryStore {
    async fn list_active_sources(&self, ids: &[String]) -> Result<Vec<Source>> {
        Ok(active_sources(&self.sources, ids))
    }

    async fn list_recent_article_urls(&self, source_id: &str, limit: usize) -> Result<Vec<String>> {
        let articles = self
            .articles
            .lock()
            .map_err(|e| ScrapeError::Store(e.to_string()))?;
        Ok(recent_urls(&articles, source_id, limit))
    }

    async fn bulk_insert_articles(&self, articles: &[ExtractedArticle]) -> Result<()> {
        if self.fail_inserts {
            return Err(ScrapeError::Persist("insert rejected".into()));
        }
        self.articles
            .lock()
            .map_err(|e| ScrapeError::Persist(e.to_string()))?
            .extend_from_slice(articles);
        Ok(())
    }
}
