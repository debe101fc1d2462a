//! Data models for scraped headlines and their classified representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ParsedItem`]: One listing entry as read from the page, before classification
//! - [`Classification`]: The `{location, crime_type}` pair inferred from a headline
//! - [`NewsRecord`]: A parsed item merged with its classification
//! - [`NewsFeed`]: The `{ "data": [...] }` envelope written at the end of a run
//!
//! Record fields use camelCase on the wire to match the shape consumers of the
//! feed already expect, and every field is a plain string: absent values are
//! the [`NOT_AVAILABLE`] sentinel, never `null`.

use serde::{Deserialize, Serialize};

/// Sentinel used in place of any value that could not be found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Location reported when classification fails outright.
pub const FALLBACK_LOCATION: &str = "Delhi";

/// A single listing entry as extracted from the rendered page.
///
/// Built by the record parser; carries everything a [`NewsRecord`] needs
/// except the classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// Process-unique identifier (UUID v4).
    pub id: String,
    /// Headline text, or [`NOT_AVAILABLE`].
    pub headline: String,
    /// Date part of the listing timestamp, or [`NOT_AVAILABLE`].
    pub date: String,
    /// Time part of the listing timestamp, or [`NOT_AVAILABLE`].
    pub time: String,
    /// Image source, or [`NOT_AVAILABLE`].
    pub image_url: String,
    /// Link to the full story. Always present.
    pub link: String,
}

/// Location and crime type inferred from a headline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Classification {
    pub location: String,
    pub crime_type: String,
}

impl Classification {
    /// The value substituted whenever the remote call or its response parsing fails.
    pub fn fallback() -> Self {
        Self {
            location: FALLBACK_LOCATION.to_string(),
            crime_type: NOT_AVAILABLE.to_string(),
        }
    }
}

/// A fully populated output record.
///
/// `readMoreUrl` and `url` always carry the same link; both are kept because
/// downstream consumers read one or the other.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    /// The headline, used as the record's content.
    pub content: String,
    pub date: String,
    pub id: String,
    pub imageUrl: String,
    pub readMoreUrl: String,
    pub time: String,
    pub url: String,
    /// Crime type from the classifier.
    #[serde(rename = "type")]
    pub crime_type: String,
    pub location: String,
}

impl NewsRecord {
    /// Merge a parsed item with its classification.
    pub fn from_parts(item: ParsedItem, classification: Classification) -> Self {
        Self {
            content: item.headline,
            date: item.date,
            id: item.id,
            imageUrl: item.image_url,
            readMoreUrl: item.link.clone(),
            time: item.time,
            url: item.link,
            crime_type: classification.crime_type,
            location: classification.location,
        }
    }
}

/// The result of one run, serialized as `{ "data": [...] }`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NewsFeed {
    pub data: Vec<NewsRecord>,
}
