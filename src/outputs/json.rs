//! JSON output for a finished run.
//!
//! The feed is written as a single `{ "data": [...] }` document, either to
//! stdout (the default, so the binary composes with other tools) or to a file.

use crate::models::NewsFeed;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncWriteExt, stdout};
use tracing::{error, info, instrument};

/// Serialize a [`NewsFeed`], optionally pretty-printed.
pub fn render_feed(feed: &NewsFeed, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(feed)
    } else {
        serde_json::to_string(feed)
    }
}

/// Write a [`NewsFeed`] to `path`, or to stdout when `path` is `None`.
///
/// Parent directories of `path` are created as needed.
#[instrument(level = "info", skip_all, fields(path = ?path))]
pub async fn write_feed(
    feed: &NewsFeed,
    path: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let mut json = render_feed(feed, pretty)?;
    json.push('\n');

    let Some(path) = path else {
        let mut out = stdout();
        out.write_all(json.as_bytes()).await?;
        out.flush().await?;
        info!(records = feed.data.len(), "Wrote JSON to stdout");
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(path = %path.display(), records = feed.data.len(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, NewsRecord, ParsedItem};

    fn feed_with_one_record() -> NewsFeed {
        let item = ParsedItem {
            id: "id-1".to_string(),
            headline: "Robbery at Connaught Place".to_string(),
            date: "Oct14,2024".to_string(),
            time: "10:30pm".to_string(),
            image_url: "N/A".to_string(),
            link: "https://www.ndtv.com/delhi-news/robbery".to_string(),
        };
        NewsFeed {
            data: vec![NewsRecord::from_parts(item, Classification::fallback())],
        }
    }

    #[test]
    fn test_render_feed_compact_and_pretty() {
        let feed = feed_with_one_record();
        let compact = render_feed(&feed, false).unwrap();
        let pretty = render_feed(&feed, true).unwrap();

        assert!(compact.starts_with(r#"{"data":[{"content":"Robbery at Connaught Place""#));
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));

        let reparsed: NewsFeed = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed.data, feed.data);
    }

    #[tokio::test]
    async fn test_write_feed_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("delhi_crime_news_{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("feed.json");

        write_feed(&feed_with_one_record(), Some(&path), false)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let feed: NewsFeed = serde_json::from_str(&written).unwrap();
        assert_eq!(feed.data.len(), 1);
        assert_eq!(feed.data[0].location, "Delhi");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
