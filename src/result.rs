//! Search result types and raw-record mapping.

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{is_excluded_href, RawRecord, RawTextRecord};
use crate::normalize::{normalize_text, normalize_url};

/// A single web text result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    /// Result title, tag-stripped and entity-decoded.
    pub title: String,
    /// Result link, percent-decoded with spaces rendered as `+`.
    pub href: String,
    /// Result snippet, tag-stripped and entity-decoded.
    pub body: String,
}

impl TextResult {
    /// Maps a raw text record to `(identity key, result)`.
    ///
    /// Records with an empty or excluded href are dropped. When
    /// `require_body` is set (the script-JSON shape), records whose
    /// normalized snippet is empty are dropped as well. The identity key
    /// is the href as it appeared on the wire, before normalization.
    pub(crate) fn from_raw(raw: RawTextRecord, require_body: bool) -> Option<(String, Self)> {
        if raw.href.is_empty() || is_excluded_href(&raw.href) {
            return None;
        }
        let body = normalize_text(&raw.body);
        if require_body && body.is_empty() {
            return None;
        }
        let result = Self {
            title: normalize_text(&raw.title),
            href: normalize_url(&raw.href),
            body,
        };
        Some((raw.href, result))
    }
}

/// A single image result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Image title.
    pub title: String,
    /// Full-size image URL; the identity key for deduplication.
    pub image: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Page the image was found on.
    pub url: String,
    /// Image height in pixels.
    pub height: u64,
    /// Image width in pixels.
    pub width: u64,
    /// Index source, e.g. "Bing".
    pub source: String,
}

impl ImageResult {
    /// Maps a raw JSON record to `(identity key, result)`.
    pub(crate) fn from_raw(raw: &RawRecord) -> Option<(String, Self)> {
        let image = raw.get("image")?.as_str()?;
        if image.is_empty() {
            return None;
        }
        let result = Self {
            title: str_field(raw, "title"),
            image: normalize_url(image),
            thumbnail: normalize_url(&str_field(raw, "thumbnail")),
            url: normalize_url(&str_field(raw, "url")),
            height: dim_field(raw, "height"),
            width: dim_field(raw, "width"),
            source: str_field(raw, "source"),
        };
        Some((image.to_string(), result))
    }
}

/// A single video result.
///
/// Upstream sends a richer record than is modelled here; unrecognized
/// fields are dropped on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoResult {
    /// Content URL; the identity key for deduplication.
    pub content: String,
    /// Video title.
    #[serde(default)]
    pub title: String,
    /// Video description.
    #[serde(default)]
    pub description: String,
    /// Duration label, e.g. "12:01".
    #[serde(default)]
    pub duration: String,
    /// Embeddable player URL.
    #[serde(default)]
    pub embed_url: String,
    /// Publication timestamp as sent upstream.
    #[serde(default)]
    pub published: String,
    /// Publishing platform, e.g. "YouTube".
    #[serde(default)]
    pub publisher: String,
    /// Uploader display name.
    #[serde(default)]
    pub uploader: String,
    /// Thumbnail image variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    /// View counts and similar statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

impl VideoResult {
    /// Maps a raw JSON record to `(identity key, result)`.
    pub(crate) fn from_raw(raw: &RawRecord) -> Option<(String, Self)> {
        let content = raw.get("content")?.as_str()?;
        if content.is_empty() {
            return None;
        }
        let result: Self = serde_json::from_value(Value::Object(raw.clone())).ok()?;
        Some((content.to_string(), result))
    }
}

/// A single news result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsResult {
    /// Publication date, RFC 3339 in UTC.
    pub date: String,
    /// Article title.
    pub title: String,
    /// Article excerpt, tag-stripped and entity-decoded.
    pub body: String,
    /// Article URL; the identity key for deduplication.
    pub url: String,
    /// Illustration URL, empty when absent.
    pub image: String,
    /// Publishing outlet.
    pub source: String,
}

impl NewsResult {
    /// Maps a raw JSON record to `(identity key, result)`.
    pub(crate) fn from_raw(raw: &RawRecord) -> Option<(String, Self)> {
        let url = raw.get("url")?.as_str()?;
        if url.is_empty() {
            return None;
        }
        let stamp = raw.get("date").and_then(Value::as_i64).unwrap_or_default();
        let date = DateTime::from_timestamp(stamp, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        let result = Self {
            date,
            title: str_field(raw, "title"),
            body: normalize_text(&str_field(raw, "excerpt")),
            url: normalize_url(url),
            image: normalize_url(&str_field(raw, "image")),
            source: str_field(raw, "source"),
        };
        Some((url.to_string(), result))
    }
}

/// An instant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Icon URL, empty when the answer has none.
    pub icon: String,
    /// Answer text.
    pub text: String,
    /// Topic group the answer belongs to, empty for top-level entries.
    pub topic: String,
    /// Source URL.
    pub url: String,
}

/// A query completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested query phrase.
    pub phrase: String,
}

/// A translated phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// The input text.
    pub original: String,
    /// The translated text.
    pub translated: String,
    /// Language detected for the input, when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
}

fn str_field(raw: &RawRecord, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Image dimensions arrive as numbers but occasionally as strings.
fn dim_field(raw: &RawRecord, key: &str) -> u64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}
