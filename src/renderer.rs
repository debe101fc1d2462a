//! Page rendering: turn a URL into the final markup the scraper reads.
//!
//! The listing page loads more stories as it is scrolled, so the default
//! [`HeadlessRenderer`] drives a headless Chrome: load the page, let it settle,
//! scroll to the bottom until the document stops growing, then read the DOM.
//! [`HttpRenderer`] is a plain GET for pages that need no JavaScript.
//!
//! Both sit behind [`PageRenderer`]; [`Renderer`] picks one at runtime.

use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

const SCROLL_HEIGHT_JS: &str = "document.body.scrollHeight";
const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Everything that can stop a page from being rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid browser configuration: {0}")]
    Config(String),
    #[error("failed to launch browser: {0}")]
    Launch(#[source] CdpError),
    #[error("failed to load {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },
    #[error("scroll script failed: {0}")]
    Script(String),
    #[error("failed to read page content: {0}")]
    Content(#[source] CdpError),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Produces the final markup for a URL.
pub trait PageRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Headless Chrome renderer with scroll-to-bottom pagination.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    /// Browser binary; `None` lets chromiumoxide look for one.
    pub chrome_executable: Option<PathBuf>,
    /// Wait after navigation before the first scroll.
    pub settle: Duration,
    /// Wait after each scroll for new content to arrive.
    pub scroll_pause: Duration,
    /// Upper bound on scroll rounds, for pages that never stop growing.
    pub max_scrolls: usize,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            settle: Duration::from_secs(5),
            scroll_pause: Duration::from_secs(2),
            max_scrolls: 50,
        }
    }
}

impl HeadlessRenderer {
    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Config)
    }

    /// Navigate, settle, scroll, and read the DOM. The caller owns the browser.
    async fn load(&self, browser: &Browser, url: &str) -> Result<String, RenderError> {
        let navigation = |source| RenderError::Navigation {
            url: url.to_string(),
            source,
        };

        let page = browser.new_page("about:blank").await.map_err(navigation)?;
        page.goto(url).await.map_err(navigation)?;
        info!("Page loaded; waiting for it to settle");
        sleep(self.settle).await;

        match self.scroll_to_bottom(&page).await {
            Ok(rounds) => info!(rounds, "Scrolling completed"),
            Err(e) => warn!(error = %e, "Scrolling failed; using content loaded so far"),
        }

        let html = page.content().await.map_err(RenderError::Content)?;
        info!(bytes = html.len(), "Extracted page source");
        Ok(html)
    }

    /// Scroll until the document height stops changing. Returns the rounds taken.
    async fn scroll_to_bottom(&self, page: &Page) -> Result<usize, RenderError> {
        let mut last_height = scroll_height(page).await?;

        for round in 1..=self.max_scrolls {
            page.evaluate(SCROLL_TO_BOTTOM_JS)
                .await
                .map_err(|e| RenderError::Script(e.to_string()))?;
            sleep(self.scroll_pause).await;

            let height = scroll_height(page).await?;
            debug!(round, last_height, height, "Scrolled");
            if height == last_height {
                return Ok(round);
            }
            last_height = height;
        }

        warn!(max_scrolls = self.max_scrolls, "Page kept growing; stopped scrolling");
        Ok(self.max_scrolls)
    }
}

async fn scroll_height(page: &Page) -> Result<f64, RenderError> {
    page.evaluate(SCROLL_HEIGHT_JS)
        .await
        .map_err(|e| RenderError::Script(e.to_string()))?
        .into_value::<f64>()
        .map_err(|e| RenderError::Script(e.to_string()))
}

impl PageRenderer for HeadlessRenderer {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let t0 = Instant::now();
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(RenderError::Launch)?;
        info!("Browser launched");

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.load(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser cleanly");
        }
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Failed waiting for browser exit");
        }
        events.abort();
        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Browser closed");

        result
    }
}

/// Plain HTTP renderer; the markup is whatever the server sends.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

impl PageRenderer for HttpRenderer {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let http = |source| RenderError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(http)?;
        info!(bytes = html.len(), "Fetched page source");
        Ok(html)
    }
}

/// The renderer chosen on the command line.
#[derive(Debug, Clone)]
pub enum Renderer {
    Headless(HeadlessRenderer),
    Http(HttpRenderer),
}

impl PageRenderer for Renderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        match self {
            Renderer::Headless(r) => r.render(url).await,
            Renderer::Http(r) => r.render(url).await,
        }
    }
}
