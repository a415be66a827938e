//! Search response parsing.
//!
//! Turns the JSON body returned by the search endpoint into [`Article`]s:
//!
//! ```text
//! { "response": { "results": [
//!     { "webTitle", "sectionName", "webUrl", "webPublicationDate",
//!       "tags": [ { "webTitle" }, ... ] },
//!     ...
//! ] } }
//! ```
//!
//! The batch is best-effort, not atomic.  Records are converted in array
//! order and the first record that cannot be converted stops the batch: the
//! articles built before it are kept and the failure is reported in
//! [`ParsedBatch::malformed`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::{Article, NO_CONTRIBUTORS};

/// Width of the `THH:MM:SSZ` suffix cut off `webPublicationDate`.
const TIME_OF_DAY_SUFFIX_LEN: usize = 10;

const CONTRIBUTOR_SEPARATOR: &str = ", ";

/// Outcome of parsing one response body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedBatch {
    /// Articles in response order, up to the first malformed record.
    pub articles: Vec<Article>,
    /// Why parsing stopped early, if it did.
    pub malformed: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    response: ResponseBody,
}

#[derive(Deserialize)]
struct ResponseBody {
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord {
    #[serde(deserialize_with = "scalar_text")]
    web_title: String,
    #[serde(deserialize_with = "scalar_text")]
    section_name: String,
    #[serde(deserialize_with = "scalar_text")]
    web_url: String,
    #[serde(deserialize_with = "scalar_text")]
    web_publication_date: String,
    #[serde(default)]
    tags: Option<Vec<Tag>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tag {
    #[serde(deserialize_with = "scalar_text")]
    web_title: String,
}

/// Text fields also accept numbers and booleans, taken as their JSON text.
/// `null`, arrays and objects are still rejected.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {other}"))),
    }
}

#[derive(Debug, Error)]
enum RecordError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("publication date {0:?} is shorter than its time-of-day suffix")]
    ShortDate(String),

    #[error("webUrl {url:?} is not an absolute URL: {source}")]
    BadUrl { url: String, source: url::ParseError },
}

/// Parse a raw response body into articles.
///
/// Never fails: an empty body gives an empty batch, a body that is not the
/// expected envelope gives an empty batch with `malformed` set, and a bad
/// record truncates the batch at that record.
pub fn parse_articles(raw: &str) -> ParsedBatch {
    if raw.trim().is_empty() {
        debug!("empty response body, no data to parse");
        return ParsedBatch::default();
    }

    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "response is not a search result envelope");
            return ParsedBatch {
                articles: Vec::new(),
                malformed: Some(e.to_string()),
            };
        }
    };

    let records = envelope.response.results;
    let mut articles = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match article_from_record(record) {
            Ok(article) => articles.push(article),
            Err(e) => {
                warn!(
                    index,
                    parsed = articles.len(),
                    error = %e,
                    "malformed result record, dropping the rest of the batch"
                );
                return ParsedBatch {
                    articles,
                    malformed: Some(format!("result {index}: {e}")),
                };
            }
        }
    }

    debug!(count = articles.len(), "parsed search results");
    ParsedBatch {
        articles,
        malformed: None,
    }
}

fn article_from_record(record: Value) -> Result<Article, RecordError> {
    let record: ResultRecord = serde_json::from_value(record)?;

    let date_published = strip_time_of_day(&record.web_publication_date)
        .ok_or_else(|| RecordError::ShortDate(record.web_publication_date.clone()))?;

    if let Err(source) = Url::parse(&record.web_url) {
        return Err(RecordError::BadUrl {
            url: record.web_url,
            source,
        });
    }

    let contributor = match record.tags.as_deref() {
        Some(tags) if !tags.is_empty() => tags
            .iter()
            .map(|tag| tag.web_title.as_str())
            .collect::<Vec<_>>()
            .join(CONTRIBUTOR_SEPARATOR),
        _ => NO_CONTRIBUTORS.to_string(),
    };

    Ok(Article::new(
        record.web_title,
        contributor,
        date_published,
        record.section_name,
        record.web_url,
    ))
}

/// Drop the fixed-width time-of-day suffix, counting characters rather than
/// bytes.  Timestamps of any other width come out truncated wrongly; the API
/// always sends `YYYY-MM-DDTHH:MM:SSZ`.
fn strip_time_of_day(timestamp: &str) -> Option<&str> {
    let (cut, _) = timestamp
        .char_indices()
        .rev()
        .nth(TIME_OF_DAY_SUFFIX_LEN - 1)?;
    Some(&timestamp[..cut])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
