//! Command-line interface definitions.
//!
//! Every option can also come from the environment where noted.

use clap::Parser;

/// Scrape the given news sources once and store the accepted articles.
///
/// # Examples
///
/// ```sh
/// # Scrape two sources listed in sources.json
/// radio_news_scraper -s sources.json -a articles.json -i emol -i soychile
///
/// # With a config file and a run report
/// radio_news_scraper -s sources.json -a articles.json -i emol -c scrape.yaml -j ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file holding the configured sources
    #[arg(short, long, env = "SCRAPER_SOURCES_FILE")]
    pub sources_file: String,

    /// JSON file the accepted articles are appended to
    #[arg(short, long, env = "SCRAPER_ARTICLES_FILE")]
    pub articles_file: String,

    /// Id of a source to scrape (repeatable)
    #[arg(short = 'i', long = "source-id")]
    pub source_ids: Vec<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// ScrapingBee API key
    #[arg(long, env = "SCRAPINGBEE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Directory for the JSON run report (no report when omitted)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}
