//! NDTV city-news listing scraper.
//!
//! The listing page at <https://www.ndtv.com/delhi-news> renders each story as
//! an anchor wrapping a thumbnail and an overlay with the publish time:
//!
//! ```html
//! <a class="NwsLstPg_img" href="https://www.ndtv.com/delhi-news/...">
//!   <img class="NwsLstPg_img-full" title="Headline text" src="https://c.ndtvimg.com/...">
//!   <span class="NwsLstPg_ovl-dt-nm">Oct 14, 2024 10:30 pm</span>
//! </a>
//! ```
//!
//! The headline lives in the image's `title`, so an entry without an image
//! still parses but carries the `"N/A"` sentinel as its headline.

use crate::models::{NOT_AVAILABLE, ParsedItem};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.NwsLstPg_img").expect("valid item selector"));
static TIMESTAMP_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.NwsLstPg_ovl-dt-nm").expect("valid timestamp selector"));
static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.NwsLstPg_img-full").expect("valid image selector"));

/// Why a listing entry could not become a record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("news item has no link (headline: {headline})")]
    MissingLink { headline: String },
}

/// Find every news entry in the page, in document order.
///
/// An empty iterator means the page had no entries; it is not an error.
pub fn locate(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.select(&ITEM_SELECTOR)
}

/// Parse one listing entry.
///
/// A relative `href` is resolved against `base` when one is given. Every field
/// except the link degrades to `"N/A"` when missing.
pub fn parse_item(item: ElementRef<'_>, base: Option<&Url>) -> Result<ParsedItem, ParseError> {
    let timestamp = item
        .select(&TIMESTAMP_SELECTOR)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty());
    let (date, time) = match timestamp.as_deref() {
        Some(raw) => split_timestamp(raw),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    let image = item.select(&IMAGE_SELECTOR).next();
    let headline = image
        .and_then(|img| non_blank_attr(img, "title"))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();
    let image_url = image
        .and_then(|img| non_blank_attr(img, "src").or_else(|| non_blank_attr(img, "data-src")))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();

    let href = non_blank_attr(item, "href").ok_or_else(|| ParseError::MissingLink {
        headline: headline.clone(),
    })?;

    Ok(ParsedItem {
        id: Uuid::new_v4().to_string(),
        headline,
        date,
        time,
        image_url,
        link: resolve_link(href, base),
    })
}

/// Split a listing timestamp such as `"Oct 14, 2024 10:30 pm"` into
/// `("Oct14,2024", "10:30pm")`.
///
/// Date is the first three tokens joined, time the next two. Timestamps with
/// fewer than five tokens yield `("N/A", "N/A")`.
pub fn split_timestamp(raw: &str) -> (String, String) {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 5 {
        return (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string());
    }
    (tokens[..3].concat(), tokens[3..5].concat())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn resolve_link(href: &str, base: Option<&Url>) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.and_then(|base| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| href.to_string())
}
