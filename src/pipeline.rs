//! Fetch orchestration: the `scrape` entry point.
//!
//! Sources are processed in fixed-size chunks; each chunk runs concurrently
//! and is awaited fully before the next one starts. Within a source, the
//! selected candidates are fetched concurrently. Failures are absorbed at the
//! smallest scope that contains them:
//!
//! - a failed article fetch or a rejected body drops that article only
//! - a failed listing fetch (error, timeout, short page) drops that source only
//! - the final bulk insert is the one step whose failure fails the batch
//!
//! All per-run state (seen URLs, accumulators) lives inside a single
//! [`Scraper::scrape`] call.

use crate::anchors::char_len;
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extract::{extract_content, extract_lead_image};
use crate::models::{ExtractedArticle, LinkCandidate, ScrapeOutcome, Source};
use crate::progress::{ProgressEvent, ProgressKind, ProgressSink};
use crate::proxy::{RenderOptions, RenderProxy, render_with_timeout};
use crate::quality::{Rejection, drop_duplicate_bodies, summarize, validate_body};
use crate::ranking::select_candidates;
use crate::store::ArticleStore;
use crate::utils::preview;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// The scraping pipeline, generic over its three collaborators.
pub struct Scraper<P, S, E> {
    proxy: P,
    store: S,
    progress: E,
    config: ScrapeConfig,
}

impl<P, S, E> Scraper<P, S, E>
where
    P: RenderProxy,
    S: ArticleStore,
    E: ProgressSink,
{
    pub fn new(proxy: P, store: S, progress: E, config: ScrapeConfig) -> Self {
        Self {
            proxy,
            store,
            progress,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn emit(&self, kind: ProgressKind, message: impl Into<String>) {
        self.progress.emit(ProgressEvent::new(kind, message));
    }

    /// Scrape the given sources and persist every accepted article in one insert.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::NoSources`] when `source_ids` is empty
    /// - [`ScrapeError::Store`] when the sources cannot be listed
    /// - [`ScrapeError::NoActiveSources`] when none of the ids is an active source
    /// - [`ScrapeError::Persist`] when the final insert fails
    #[instrument(level = "info", skip_all, fields(requested = source_ids.len()))]
    pub async fn scrape(&self, source_ids: &[String]) -> Result<ScrapeOutcome> {
        if source_ids.is_empty() {
            return Err(ScrapeError::NoSources);
        }

        let sources = self
            .store
            .list_active_sources(source_ids)
            .await
            .map_err(|e| match e {
                err @ ScrapeError::Store(_) => err,
                other => ScrapeError::Store(other.to_string()),
            })?;
        if sources.is_empty() {
            return Err(ScrapeError::NoActiveSources);
        }

        let t0 = Instant::now();
        let total = sources.len();
        info!(total, chunk_size = self.config.chunk_size(), "Starting scrape");
        self.emit(
            ProgressKind::Start,
            format!("Iniciando análisis de {total} fuentes..."),
        );

        let mut scraped = Vec::new();
        let mut processed = 0;
        for chunk in sources.chunks(self.config.chunk_size()) {
            let results = join_all(chunk.iter().map(|source| self.process_source(source))).await;
            scraped.extend(results.into_iter().flatten());

            processed += chunk.len();
            let percent = percent_complete(processed, total);
            self.progress.emit(
                ProgressEvent::new(
                    ProgressKind::Progress,
                    format!("Procesado {processed}/{total} fuentes ({percent}%)"),
                )
                .with_percent(percent),
            );
        }

        let articles = drop_duplicate_bodies(scraped);
        if articles.is_empty() {
            info!("No new articles; skipping insert");
        } else {
            self.emit(ProgressKind::Saving, "Guardando noticias en base de datos...");
            self.store
                .bulk_insert_articles(&articles)
                .await
                .map_err(|e| {
                    error!(error = %e, count = articles.len(), "Bulk insert failed");
                    match e {
                        err @ ScrapeError::Persist(_) => err,
                        other => ScrapeError::Persist(other.to_string()),
                    }
                })?;
        }

        let elapsed = t0.elapsed();
        info!(count = articles.len(), secs = elapsed.as_secs_f64(), "Scrape complete");
        Ok(ScrapeOutcome::new(articles))
    }

    /// One source's accepted articles; any failure yields none.
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn process_source(&self, source: &Source) -> Vec<ExtractedArticle> {
        match self.try_process_source(source).await {
            Ok(articles) => {
                info!(accepted = articles.len(), "Source finished");
                articles
            }
            Err(e) => {
                error!(error = %e, url = %source.url, "Skipping source");
                let message = match &e {
                    ScrapeError::Upstream { status, .. } => {
                        format!("Error del proxy ({status}): {}", source.name)
                    }
                    ScrapeError::ShortListing { .. } => {
                        format!("Contenido vacío/corto para: {}", source.name)
                    }
                    ScrapeError::Timeout { .. } => {
                        format!("Tiempo de espera agotado para: {}", source.name)
                    }
                    other => format!("Error procesando {}: {other}", source.name),
                };
                self.emit(ProgressKind::Error, message);
                Vec::new()
            }
        }
    }

    async fn try_process_source(&self, source: &Source) -> Result<Vec<ExtractedArticle>> {
        self.emit(
            ProgressKind::Progress,
            format!("Contactando proxy para: {}...", source.name),
        );
        let html = render_with_timeout(
            &self.proxy,
            &source.url,
            &RenderOptions::listing(self.config.listing_wait_ms),
            self.config.listing_timeout(),
        )
        .await?;

        let len = char_len(&html);
        if len < self.config.min_listing_html_len {
            warn!(len, "Listing HTML too short; possible bot wall or empty page");
            return Err(ScrapeError::ShortListing { len });
        }

        self.emit(
            ProgressKind::Progress,
            format!("Analizando enlaces de: {}...", source.name),
        );
        let known_urls = self.known_urls(source).await;
        let candidates = select_candidates(
            &html,
            source,
            &known_urls,
            self.config.articles_per_source,
        );

        if candidates.is_empty() {
            warn!("No new article links found; check link patterns or selectors");
            self.emit(
                ProgressKind::Progress,
                format!("No se encontraron artículos nuevos en {}", source.name),
            );
            return Ok(Vec::new());
        }

        let total = candidates.len();
        for candidate in &candidates {
            debug!(url = %candidate.url, score = candidate.score, "Selected candidate");
        }
        self.emit(
            ProgressKind::Progress,
            format!(
                "Encontrados {total} artículos nuevos en {}. Procesando...",
                source.name
            ),
        );

        let fetched = join_all(
            candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| self.process_article(source, candidate, index, total)),
        )
        .await;
        Ok(drop_duplicate_bodies(fetched.into_iter().flatten().collect()))
    }

    /// The source's recently persisted URLs; a failed lookup counts as none.
    async fn known_urls(&self, source: &Source) -> HashSet<String> {
        match self
            .store
            .list_recent_article_urls(&source.id, self.config.recent_url_window)
            .await
        {
            Ok(urls) => urls.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "Could not load recent URLs; deduplicating against none");
                HashSet::new()
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(url = %candidate.url))]
    async fn process_article(
        &self,
        source: &Source,
        candidate: &LinkCandidate,
        index: usize,
        total: usize,
    ) -> Option<ExtractedArticle> {
        self.emit(
            ProgressKind::Progress,
            format!(
                "Extrayendo ({}/{total}): {}",
                index + 1,
                preview(&candidate.title, 30)
            ),
        );

        let html = match render_with_timeout(
            &self.proxy,
            &candidate.url,
            &RenderOptions::article(self.config.article_wait_ms),
            self.config.article_timeout(),
        )
        .await
        {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Skipping article; fetch failed");
                return None;
            }
        };

        let content = extract_content(&html, &candidate.title, source);
        if let Err(rejection) = validate_body(&content) {
            warn!(%rejection, "Skipping article");
            let reason = match rejection {
                Rejection::InvalidPhrase(_) => "contenido inválido",
                Rejection::TooShort(_) => "contenido corto",
            };
            self.emit(
                ProgressKind::Progress,
                format!("Omitido por {reason}: {}", preview(&candidate.title, 20)),
            );
            return None;
        }

        let now = Utc::now();
        Some(ExtractedArticle {
            title: candidate.title.clone(),
            summary: summarize(&content),
            image_url: extract_lead_image(&html, &candidate.url),
            content,
            original_url: candidate.url.clone(),
            source_id: source.id.clone(),
            published_at: now,
            scraped_at: now,
            is_processed: false,
            is_selected: false,
        })
    }
}

/// Share of sources processed, rounded to the nearest percent.
fn percent_complete(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}
