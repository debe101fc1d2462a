//! Headline classification through an LLM.
//!
//! [`CrimeClassifier`] asks the model for a location and crime type and turns
//! whatever comes back into a [`Classification`]. It never fails: any transport
//! error, timeout, or unusable response yields [`Classification::fallback`].
//!
//! # Response handling
//!
//! Models tend to wrap the requested JSON in prose, so the reply is parsed in
//! two stages:
//! 1. [`extract_json_object`] slices from the first `{` to the last `}`.
//! 2. That slice must parse as a JSON object; `location` and `crime_type` are
//!    read from it, each defaulting to `"N/A"`.
//!
//! A failure at either stage produces the fallback.

use crate::api::AskAsync;
use crate::models::{Classification, NOT_AVAILABLE};
use crate::utils::truncate_for_log;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Why a model reply could not be turned into a [`Classification`].
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no JSON object found in the response")]
    NoJsonObject,
    #[error("response JSON is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Classifies headlines by location and crime type.
///
/// Holds the injected LLM client; the caller owns its construction.
pub struct CrimeClassifier<C> {
    client: C,
    region: String,
    timeout: Option<Duration>,
    fallbacks: AtomicUsize,
}

impl<C> CrimeClassifier<C>
where
    C: AskAsync<Response = String>,
{
    /// Create a classifier that scopes locations to `region` (e.g. `"DELHI NCR"`).
    pub fn new(client: C, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            timeout: None,
            fallbacks: AtomicUsize::new(0),
        }
    }

    /// Bound each remote call; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of classifications that ended in the fallback so far.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Classify one headline. Always returns a value.
    #[instrument(level = "debug", skip_all)]
    pub async fn classify(&self, headline: &str) -> Classification {
        if headline.trim().is_empty() || headline == NOT_AVAILABLE {
            debug!("No headline to classify; using fallback");
            return self.fall_back();
        }

        let prompt = build_prompt(&self.region, headline);
        let reply = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.client.ask(&prompt)).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!(timeout = ?limit, headline, "Classification timed out; using fallback");
                    return self.fall_back();
                }
            },
            None => self.client.ask(&prompt).await,
        };

        let text = match reply {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, headline, "Classification call failed; using fallback");
                return self.fall_back();
            }
        };
        debug!(response = %truncate_for_log(&text, 300), "Raw classification response");

        match parse_classification(&text) {
            Ok(classification) => classification,
            Err(e) => {
                warn!(
                    error = %e,
                    response_preview = %truncate_for_log(&text, 300),
                    "Model returned unusable JSON; using fallback"
                );
                self.fall_back()
            }
        }
    }

    fn fall_back(&self) -> Classification {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        Classification::fallback()
    }
}

/// Build the instruction sent to the model for `headline`.
pub fn build_prompt(region: &str, headline: &str) -> String {
    format!(
        r#"Extract the most precise LOCATION inside {region} and STRICTLY IDENTIFY THE CRIME TYPE from the following headline: '{headline}'.
Return the output as a valid JSON object with keys 'location' and 'crime_type'.
Example:
{{
    "location": "Connaught Place",
    "crime_type": "Robbery"
}}
Ensure the response is a valid JSON object and does not contain any additional text."#
    )
}

/// Slice `raw` from its first `{` to its last `}` inclusive.
///
/// Returns `None` when either brace is missing or the last `}` precedes the
/// first `{`.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse a model reply into a [`Classification`].
pub fn parse_classification(raw: &str) -> Result<Classification, ClassifyError> {
    let slice = extract_json_object(raw.trim()).ok_or(ClassifyError::NoJsonObject)?;
    let object: Map<String, Value> = serde_json::from_str(slice)?;

    Ok(Classification {
        location: field_or_sentinel(&object, "location"),
        crime_type: field_or_sentinel(&object, "crime_type"),
    })
}

fn field_or_sentinel(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) | Some(Value::Null) | None => NOT_AVAILABLE.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AskError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every prompt it receives.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl AskAsync for ScriptedClient {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, AskError> {
            self.prompts.lock().unwrap().push(text.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(e)) => Err(e.into()),
                None => Err("no scripted reply left".into()),
            }
        }
    }

    struct HangingClient;

    impl AskAsync for HangingClient {
        type Response = String;

        async fn ask(&self, _text: &str) -> Result<String, AskError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_extract_json_object_with_surrounding_prose() {
        let raw = r#"Sure! Here you go: {"location": "Saket"} Hope this helps."#;
        assert_eq!(extract_json_object(raw), Some(r#"{"location": "Saket"}"#));
    }

    #[test]
    fn test_extract_json_object_without_braces() {
        assert_eq!(extract_json_object("I cannot determine that."), None);
        assert_eq!(extract_json_object("only an opening {"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[test]
    fn test_parse_classification_brace_slicing() {
        let raw = "Some text {\"location\": \"Saket\", \"crime_type\": \"Theft\"} trailing";
        let classification = parse_classification(raw).unwrap();
        assert_eq!(classification.location, "Saket");
        assert_eq!(classification.crime_type, "Theft");
    }

    #[test]
    fn test_parse_classification_missing_crime_type() {
        let classification = parse_classification(r#"{"location": "Rohini"}"#).unwrap();
        assert_eq!(classification.location, "Rohini");
        assert_eq!(classification.crime_type, "N/A");
    }

    #[test]
    fn test_parse_classification_null_and_empty_values() {
        let classification =
            parse_classification(r#"{"location": "  ", "crime_type": null}"#).unwrap();
        assert_eq!(classification.location, "N/A");
        assert_eq!(classification.crime_type, "N/A");
    }

    #[test]
    fn test_parse_classification_non_string_value() {
        let classification =
            parse_classification(r#"{"location": "Sector 18", "crime_type": 302}"#).unwrap();
        assert_eq!(classification.crime_type, "302");
    }

    #[test]
    fn test_parse_classification_errors() {
        assert!(matches!(
            parse_classification("no json here"),
            Err(ClassifyError::NoJsonObject)
        ));
        assert!(matches!(
            parse_classification(r#"{"location": "Saket", "crime_type": }"#),
            Err(ClassifyError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_build_prompt_embeds_headline_and_region() {
        let prompt = build_prompt("DELHI NCR", "Two held for robbery in Karol Bagh");
        assert!(prompt.contains("inside DELHI NCR"));
        assert!(prompt.contains("'Two held for robbery in Karol Bagh'"));
        assert!(prompt.contains("'location' and 'crime_type'"));
    }

    #[tokio::test]
    async fn test_classify_success() {
        let client = ScriptedClient::new(vec![Ok(
            r#"{"location": "Connaught Place", "crime_type": "Robbery"}"#,
        )]);
        let classifier = CrimeClassifier::new(client, "DELHI NCR");

        let classification = classifier.classify("Robbery at Connaught Place").await;
        assert_eq!(classification.location, "Connaught Place");
        assert_eq!(classification.crime_type, "Robbery");
        assert_eq!(classifier.fallback_count(), 0);
    }

    #[tokio::test]
    async fn test_classify_no_braces_falls_back() {
        let client = ScriptedClient::new(vec![Ok("The location is unclear.")]);
        let classifier = CrimeClassifier::new(client, "DELHI NCR");

        let classification = classifier.classify("Something happened").await;
        assert_eq!(classification, Classification::fallback());
        assert_eq!(classifier.fallback_count(), 1);
    }

    #[tokio::test]
    async fn test_classify_transport_error_falls_back() {
        let client = ScriptedClient::new(vec![Err("429 Too Many Requests")]);
        let classifier = CrimeClassifier::new(client, "DELHI NCR");

        let classification = classifier.classify("Chain snatching in Dwarka").await;
        assert_eq!(classification, Classification::fallback());
    }

    #[tokio::test]
    async fn test_classify_sentinel_headline_skips_call() {
        let client = ScriptedClient::new(vec![]);
        let classifier = CrimeClassifier::new(client, "DELHI NCR");

        let classification = classifier.classify("N/A").await;
        assert_eq!(classification, Classification::fallback());
        assert!(classifier.client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classify_timeout_falls_back() {
        let classifier = CrimeClassifier::new(HangingClient, "DELHI NCR")
            .with_timeout(Some(Duration::from_millis(20)));

        let classification = classifier.classify("Murder in Mehrauli").await;
        assert_eq!(classification, Classification::fallback());
        assert_eq!(classifier.fallback_count(), 1);
    }
}
