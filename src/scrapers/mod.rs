//! News source scrapers.
//!
//! Each scraper module exports:
//! - `locate(document)`: the listing entries on a rendered page, in document order
//! - `parse_item(entry, base)`: one entry as a [`ParsedItem`](crate::models::ParsedItem)
//!
//! # Supported Sources
//!
//! | Source | Module | Listing |
//! |--------|--------|---------|
//! | NDTV city news | [`ndtv`] | `https://www.ndtv.com/delhi-news` |

pub mod ndtv;
