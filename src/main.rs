//! # Radio News Scraper
//!
//! Runs one scrape batch over the requested sources, appends the accepted
//! articles to the articles file and optionally writes a JSON run report.
//!
//! ## Usage
//!
//! ```sh
//! SCRAPINGBEE_API_KEY=... radio_news_scraper -s sources.json -a articles.json -i emol -j ./reports
//! ```

use chrono::Utc;
use clap::Parser;
use radio_news_scraper::cli::Cli;
use radio_news_scraper::config::load_config;
use radio_news_scraper::outputs::json;
use radio_news_scraper::progress::TracingProgress;
use radio_news_scraper::proxy::ScrapingBee;
use radio_news_scraper::store::JsonFileStore;
use radio_news_scraper::utils::ensure_writable_dir;
use radio_news_scraper::Scraper;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("radio_news_scraper starting up");

    let args = Cli::parse();
    debug!(
        sources_file = %args.sources_file,
        articles_file = %args.articles_file,
        source_ids = ?args.source_ids,
        ?args.json_output_dir,
        "Parsed CLI arguments"
    );

    // Early check: a report directory that can't be written fails before any proxy credits are spent
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Report directory is not writable");
            return Err(e);
        }
    }

    let config = load_config(args.config.as_deref()).await?;
    let proxy = ScrapingBee::new(args.api_key.as_str(), config.proxy_endpoint.as_str())?;
    let store = JsonFileStore::new(&args.sources_file, &args.articles_file);
    let scraper = Scraper::new(proxy, store, TracingProgress, config);

    let outcome = match scraper.scrape(&args.source_ids).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Scrape failed");
            return Err(e.into());
        }
    };

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_report(&outcome, dir, Utc::now()).await {
            error!(error = %e, "Failed to write run report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        count = outcome.count,
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
