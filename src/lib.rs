//! # Radio News Scraper
//!
//! Discovers article links on news listing pages, ranks them with heuristic
//! scores, extracts each article's body text from raw HTML and hands the
//! accepted articles to a store in a single bulk insert.
//!
//! Every page goes through a JavaScript-rendering proxy. Pages are never
//! parsed into a DOM: links, containers and paragraphs are all located with
//! regular expressions over the raw HTML, with per-site rules for the news
//! sites that need them.
//!
//! ## Pipeline
//!
//! 1. **Listing**: fetch each source's front page ([`proxy`])
//! 2. **Discovery**: locate highlighted containers and collect anchors ([`locator`], [`anchors`])
//! 3. **Ranking**: filter, score and keep the best candidates ([`ranking`], [`sites`])
//! 4. **Extraction**: run the content cascade on each article page ([`extract`], [`clean`])
//! 5. **Validation**: reject boilerplate, short and duplicate bodies ([`quality`])
//! 6. **Persistence**: one bulk insert per batch ([`store`])
//!
//! [`pipeline::Scraper`] ties these together.

pub mod anchors;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod locator;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod progress;
pub mod proxy;
pub mod quality;
pub mod ranking;
pub mod sites;
pub mod store;
pub mod utils;

pub use error::{Result, ScrapeError};
pub use pipeline::Scraper;
