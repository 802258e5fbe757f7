//! Rendering proxy client.
//!
//! All page fetches go through a third-party "render & fetch" proxy that
//! executes the page's JavaScript and returns the resulting HTML. The
//! [`RenderProxy`] trait is the seam the pipeline is generic over;
//! [`ScrapingBee`] is the production implementation.
//!
//! Timeouts are applied by [`render_with_timeout`], which drops (and so
//! aborts) the in-flight request when the deadline passes.

use crate::error::{Result, ScrapeError};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Query parameters controlling how the proxy renders a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub render_js: bool,
    /// Milliseconds to wait after load before capturing the HTML.
    pub wait_ms: u32,
    /// Browser viewport, width by height.
    pub window: Option<(u32, u32)>,
}

impl RenderOptions {
    /// Listing pages: JS on, desktop-sized window so lazy grids render.
    pub fn listing(wait_ms: u32) -> Self {
        Self {
            render_js: true,
            wait_ms,
            window: Some((1920, 1080)),
        }
    }

    pub fn article(wait_ms: u32) -> Self {
        Self {
            render_js: true,
            wait_ms,
            window: None,
        }
    }
}

/// Something that turns a URL into rendered HTML.
pub trait RenderProxy {
    /// Fetch `url` through the proxy. Non-success responses are errors.
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String>;
}

/// [`RenderProxy::render`] bounded by `limit`.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn render_with_timeout<P: RenderProxy>(
    proxy: &P,
    url: &str,
    options: &RenderOptions,
    limit: Duration,
) -> Result<String> {
    let t0 = Instant::now();
    match timeout(limit, proxy.render(url, options)).await {
        Ok(result) => {
            debug!(elapsed_ms = t0.elapsed().as_millis() as u64, ok = result.is_ok(), "Proxy fetch finished");
            result
        }
        Err(_) => {
            warn!(after = ?limit, "Proxy fetch timed out");
            Err(ScrapeError::Timeout {
                url: url.to_string(),
                after: limit,
            })
        }
    }
}

/// ScrapingBee HTML API client.
pub struct ScrapingBee {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ScrapingBee {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Full proxy request URL for `target`.
    pub fn request_url(&self, target: &str, options: &RenderOptions) -> String {
        let mut url = format!(
            "{}?api_key={}&url={}&render_js={}&wait={}",
            self.endpoint,
            encode(&self.api_key),
            encode(target),
            options.render_js,
            options.wait_ms
        );
        if let Some((width, height)) = options.window {
            url.push_str(&format!("&window_width={width}&window_height={height}"));
        }
        url
    }
}

impl fmt::Debug for ScrapingBee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrapingBee")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RenderProxy for ScrapingBee {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let response = self
            .client
            .get(self.request_url(url, options))
            .send()
            .await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        if let Some(used) = header("Spb-Used-Credits") {
            let remaining = header("Spb-Remaining-Credits").unwrap_or_default();
            debug!(%used, %remaining, "ScrapingBee credits");
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Upstream {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }
        Ok(response.text().await?)
    }
}
