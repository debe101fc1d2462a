//! Command-line interface definitions.
//!
//! Every option has a default; the ones that carry deployment details (the
//! listing URL, the inference credentials, the browser binary) can also come
//! from environment variables.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Listing page scraped when no URL is given.
pub const DEFAULT_URL: &str = "https://www.ndtv.com/delhi-news#pfrom=home-ndtv_mainnavigation";

/// How the listing page is turned into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Headless Chrome, scrolling until no more stories load
    Headless,
    /// Plain HTTP GET, no JavaScript
    Http,
}

/// Scrape crime headlines and tag each with a location and crime type.
///
/// # Examples
///
/// ```sh
/// # Print the feed for the default listing page
/// GROQ_API_KEY=gsk_... delhi_crime_news
///
/// # Write it to a file, fetching without a browser
/// delhi_crime_news --renderer http -o ./out/feed.json --pretty
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to scrape
    #[arg(short, long, env = "NEWS_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Write the JSON feed here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON feed
    #[arg(long)]
    pub pretty: bool,

    /// Page renderer
    #[arg(long, env = "RENDERER", value_enum, default_value_t = RendererKind::Headless)]
    pub renderer: RendererKind,

    /// Chrome/Chromium binary for the headless renderer
    #[arg(long, env = "CHROME_EXECUTABLE")]
    pub chrome_executable: Option<PathBuf>,

    /// Milliseconds to wait after the page loads before scrolling
    #[arg(long, default_value_t = 5000)]
    pub settle_ms: u64,

    /// Milliseconds to wait after each scroll
    #[arg(long, default_value_t = 2000)]
    pub scroll_pause_ms: u64,

    /// Maximum number of scroll rounds
    #[arg(long, default_value_t = 50)]
    pub max_scrolls: usize,

    /// API key for the inference endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI-compatible inference endpoint
    #[arg(long, env = "LLM_API_BASE", default_value = "https://api.groq.com/openai/v1")]
    pub api_base: String,

    /// Model used for classification
    #[arg(long, env = "LLM_MODEL", default_value = "llama3-8b-8192")]
    pub model: String,

    /// Region the model should place locations in
    #[arg(long, env = "CLASSIFY_REGION", default_value = "DELHI NCR")]
    pub region: String,

    /// Seconds to wait for each classification; 0 waits indefinitely
    #[arg(long, default_value_t = 30)]
    pub classify_timeout_secs: u64,
}

impl Cli {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn classify_timeout(&self) -> Option<Duration> {
        (self.classify_timeout_secs > 0).then(|| Duration::from_secs(self.classify_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["delhi_crime_news"]);

        assert_eq!(cli.output, None);
        assert!(!cli.pretty);
        assert_eq!(cli.settle(), Duration::from_secs(5));
        assert_eq!(cli.scroll_pause(), Duration::from_secs(2));
        assert_eq!(cli.max_scrolls, 50);
        assert_eq!(cli.classify_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "delhi_crime_news",
            "-u",
            "https://www.ndtv.com/cities",
            "-o",
            "/tmp/feed.json",
        ]);

        assert_eq!(cli.url, "https://www.ndtv.com/cities");
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/feed.json")));
    }

    #[test]
    fn test_cli_renderer_and_timeout() {
        let cli = Cli::parse_from([
            "delhi_crime_news",
            "--renderer",
            "http",
            "--classify-timeout-secs",
            "0",
            "--model",
            "llama-3.1-8b-instant",
        ]);

        assert_eq!(cli.renderer, RendererKind::Http);
        assert_eq!(cli.classify_timeout(), None);
        assert_eq!(cli.model, "llama-3.1-8b-instant");
    }
}
