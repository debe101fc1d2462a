//! # Delhi Crime News
//!
//! A single-pass scraper that reads a news listing page, extracts each story's
//! headline, timestamp, link, and image, and tags it with a location and crime
//! type inferred by an LLM.
//!
//! ## Usage
//!
//! ```sh
//! GROQ_API_KEY=gsk_... delhi_crime_news --pretty > feed.json
//! ```
//!
//! ## Architecture
//!
//! One run is a linear pipeline:
//! 1. **Rendering**: Load the listing page (headless Chrome or plain HTTP)
//! 2. **Parsing**: Locate story entries and parse each into a record
//! 3. **Classification**: Ask the LLM for location and crime type, one story at a time
//! 4. **Output**: Write `{ "data": [...] }` as JSON
//!
//! A story that cannot be parsed is skipped; a story that cannot be classified
//! keeps a fallback classification; a page that cannot be rendered yields an
//! empty feed.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod classifier;
mod cli;
mod models;
mod outputs;
mod pipeline;
mod renderer;
mod scrapers;
mod utils;

use api::ChatClient;
use classifier::CrimeClassifier;
use cli::{Cli, RendererKind};
use outputs::json;
use renderer::{HeadlessRenderer, HttpRenderer, Renderer};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr, so stdout stays pure JSON) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("delhi_crime_news starting up");

    let args = Cli::parse();
    debug!(url = %args.url, renderer = ?args.renderer, model = %args.model, "Parsed CLI arguments");

    // ---- Collaborators ----
    if args.api_key.is_none() {
        warn!("No API key set (GROQ_API_KEY); every story will get the fallback classification");
    }
    let client = ChatClient::new(args.api_key.as_deref(), &args.api_base, &args.model);
    let classifier =
        CrimeClassifier::new(client, args.region.clone()).with_timeout(args.classify_timeout());

    let renderer = match args.renderer {
        RendererKind::Headless => Renderer::Headless(HeadlessRenderer {
            chrome_executable: args.chrome_executable.clone(),
            settle: args.settle(),
            scroll_pause: args.scroll_pause(),
            max_scrolls: args.max_scrolls,
        }),
        RendererKind::Http => Renderer::Http(HttpRenderer::new()?),
    };

    // ---- Scrape & classify ----
    let feed = pipeline::run(&renderer, &classifier, &args.url).await;

    // ---- Output ----
    json::write_feed(&feed, args.output.as_deref(), args.pretty).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = feed.data.len(),
        classifier_fallbacks = classifier.fallback_count(),
        "Execution complete"
    );

    Ok(())
}
