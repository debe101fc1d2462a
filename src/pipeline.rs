//! One scrape run: render → locate → parse → classify → collect.
//!
//! Items are handled one at a time in document order. Each item is its own
//! failure domain: a parse failure drops that item and a classification
//! failure degrades it to the fallback, but neither touches its neighbours.
//! Only a render failure empties the whole result.

use crate::api::AskAsync;
use crate::classifier::CrimeClassifier;
use crate::models::{NewsFeed, NewsRecord, ParsedItem};
use crate::renderer::PageRenderer;
use crate::scrapers::ndtv;
use scraper::Html;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Scrape `url` and classify every story found on it.
///
/// Never fails: if the page cannot be rendered the result is `{"data": []}`.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn run<R, C>(renderer: &R, classifier: &CrimeClassifier<C>, url: &str) -> NewsFeed
where
    R: PageRenderer,
    C: AskAsync<Response = String>,
{
    let html = match renderer.render(url).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, "Rendering failed; returning empty result");
            return NewsFeed::default();
        }
    };

    let base = Url::parse(url).ok();
    process_markup(&html, base.as_ref(), classifier).await
}

/// Build the feed from already-rendered markup.
pub async fn process_markup<C>(
    html: &str,
    base: Option<&Url>,
    classifier: &CrimeClassifier<C>,
) -> NewsFeed
where
    C: AskAsync<Response = String>,
{
    let t0 = Instant::now();
    let items = parse_listing(html, base);
    let fallbacks_before = classifier.fallback_count();

    let mut data = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let classification = classifier.classify(&item.headline).await;
        debug!(
            index,
            headline = %item.headline,
            location = %classification.location,
            crime_type = %classification.crime_type,
            "Classified news item"
        );
        data.push(NewsRecord::from_parts(item, classification));
    }

    info!(
        records = data.len(),
        fallbacks = classifier.fallback_count() - fallbacks_before,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Completed classification"
    );
    NewsFeed { data }
}

/// Locate and parse every listing entry, dropping the ones that fail.
///
/// The parsed document does not outlive this call.
pub fn parse_listing(html: &str, base: Option<&Url>) -> Vec<ParsedItem> {
    let document = Html::parse_document(html);

    let mut located = 0usize;
    let mut items = Vec::new();
    for (index, node) in ndtv::locate(&document).enumerate() {
        located += 1;
        match ndtv::parse_item(node, base) {
            Ok(item) => items.push(item),
            Err(e) => warn!(index, error = %e, "Skipping news item"),
        }
    }

    info!(
        located,
        parsed = items.len(),
        dropped = located - items.len(),
        "Parsed news items"
    );
    items
}
