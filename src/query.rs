//! Search query representations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SearchError;

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// Strict filtering.
    On,
    /// Moderate filtering.
    #[default]
    Moderate,
    /// No filtering.
    Off,
}

/// Time window filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLimit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeLimit {
    /// Wire code used by the `df` query parameter.
    pub fn as_code(&self) -> &'static str {
        match self {
            TimeLimit::Day => "d",
            TimeLimit::Week => "w",
            TimeLimit::Month => "m",
            TimeLimit::Year => "y",
        }
    }
}

/// Response shape a text search is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBackend {
    /// Embedded-script JSON from `links.duckduckgo.com/d.js`.
    #[default]
    Api,
    /// Rendered result blocks from `html.duckduckgo.com`.
    Html,
    /// Table rows from `lite.duckduckgo.com`.
    Lite,
}

impl fmt::Display for TextBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextBackend::Api => "api",
            TextBackend::Html => "html",
            TextBackend::Lite => "lite",
        };
        f.write_str(name)
    }
}

impl FromStr for TextBackend {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(TextBackend::Api),
            "html" => Ok(TextBackend::Html),
            "lite" => Ok(TextBackend::Lite),
            other => Err(SearchError::InvalidBackend(other.to_string())),
        }
    }
}

const DEFAULT_REGION: &str = "wt-wt";

/// A text search query.
///
/// `max_results` is clamped to the endpoint ceiling; `0` fetches only
/// the seed page with no fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextQuery {
    /// The search terms.
    pub keywords: String,
    /// Region code, e.g. "wt-wt", "us-en", "uk-en".
    pub region: String,
    /// Safe search level.
    pub safesearch: SafeSearch,
    /// Time window filter.
    pub timelimit: Option<TimeLimit>,
    /// Response shape to query.
    pub backend: TextBackend,
    /// Requested maximum result count.
    pub max_results: usize,
}

impl TextQuery {
    /// Creates a new text query with the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            region: DEFAULT_REGION.to_string(),
            safesearch: SafeSearch::Moderate,
            timelimit: None,
            backend: TextBackend::Api,
            max_results: 0,
        }
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// Sets the time window filter.
    pub fn with_timelimit(mut self, limit: TimeLimit) -> Self {
        self.timelimit = Some(limit);
        self
    }

    /// Sets the response shape to query.
    pub fn with_backend(mut self, backend: TextBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the requested maximum result count.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// An image search query.
///
/// Facet values are passed through to the provider verbatim; see the
/// upstream parameter documentation for accepted codes (e.g. size
/// `Small`/`Medium`/`Large`/`Wallpaper`, layout `Square`/`Tall`/`Wide`,
/// type `photo`/`clipart`/`gif`/`transparent`/`line`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesQuery {
    /// The search terms.
    pub keywords: String,
    /// Region code.
    pub region: String,
    /// Safe search level.
    pub safesearch: SafeSearch,
    /// Time window facet (`Day`, `Week`, `Month`, `Year`).
    pub timelimit: Option<String>,
    /// Image size facet.
    pub size: Option<String>,
    /// Image color facet.
    pub color: Option<String>,
    /// Image type facet.
    pub type_image: Option<String>,
    /// Image layout facet.
    pub layout: Option<String>,
    /// Image license facet.
    pub license_image: Option<String>,
    /// Requested maximum result count.
    pub max_results: usize,
}

impl ImagesQuery {
    /// Creates a new image query with the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            region: DEFAULT_REGION.to_string(),
            safesearch: SafeSearch::Moderate,
            timelimit: None,
            size: None,
            color: None,
            type_image: None,
            layout: None,
            license_image: None,
            max_results: 0,
        }
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// Sets the time window facet.
    pub fn with_timelimit(mut self, limit: impl Into<String>) -> Self {
        self.timelimit = Some(limit.into());
        self
    }

    /// Sets the size facet.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the color facet.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the type facet.
    pub fn with_type_image(mut self, type_image: impl Into<String>) -> Self {
        self.type_image = Some(type_image.into());
        self
    }

    /// Sets the layout facet.
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Sets the license facet.
    pub fn with_license_image(mut self, license: impl Into<String>) -> Self {
        self.license_image = Some(license.into());
        self
    }

    /// Sets the requested maximum result count.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// A video search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideosQuery {
    /// The search terms.
    pub keywords: String,
    /// Region code.
    pub region: String,
    /// Safe search level.
    pub safesearch: SafeSearch,
    /// Time window facet (`d`, `w`, `m`).
    pub timelimit: Option<String>,
    /// Resolution facet (`high`, `standart`).
    pub resolution: Option<String>,
    /// Duration facet (`short`, `medium`, `long`).
    pub duration: Option<String>,
    /// License facet (`creativeCommon`, `youtube`).
    pub license_videos: Option<String>,
    /// Requested maximum result count.
    pub max_results: usize,
}

impl VideosQuery {
    /// Creates a new video query with the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            region: DEFAULT_REGION.to_string(),
            safesearch: SafeSearch::Moderate,
            timelimit: None,
            resolution: None,
            duration: None,
            license_videos: None,
            max_results: 0,
        }
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// Sets the time window facet.
    pub fn with_timelimit(mut self, limit: impl Into<String>) -> Self {
        self.timelimit = Some(limit.into());
        self
    }

    /// Sets the resolution facet.
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Sets the duration facet.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Sets the license facet.
    pub fn with_license_videos(mut self, license: impl Into<String>) -> Self {
        self.license_videos = Some(license.into());
        self
    }

    /// Sets the requested maximum result count.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// A news search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsQuery {
    /// The search terms.
    pub keywords: String,
    /// Region code.
    pub region: String,
    /// Safe search level.
    pub safesearch: SafeSearch,
    /// Time window filter.
    pub timelimit: Option<TimeLimit>,
    /// Requested maximum result count.
    pub max_results: usize,
}

impl NewsQuery {
    /// Creates a new news query with the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            region: DEFAULT_REGION.to_string(),
            safesearch: SafeSearch::Moderate,
            timelimit: None,
            max_results: 0,
        }
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// Sets the time window filter.
    pub fn with_timelimit(mut self, limit: TimeLimit) -> Self {
        self.timelimit = Some(limit);
        self
    }

    /// Sets the requested maximum result count.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safesearch_default() {
        assert_eq!(SafeSearch::default(), SafeSearch::Moderate);
    }

    #[test]
    fn test_timelimit_codes() {
        assert_eq!(TimeLimit::Day.as_code(), "d");
        assert_eq!(TimeLimit::Week.as_code(), "w");
        assert_eq!(TimeLimit::Month.as_code(), "m");
        assert_eq!(TimeLimit::Year.as_code(), "y");
    }

    #[test]
    fn test_backend_default() {
        assert_eq!(TextBackend::default(), TextBackend::Api);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("api".parse::<TextBackend>().unwrap(), TextBackend::Api);
        assert_eq!("html".parse::<TextBackend>().unwrap(), TextBackend::Html);
        assert_eq!("lite".parse::<TextBackend>().unwrap(), TextBackend::Lite);
    }

    #[test]
    fn test_backend_from_str_invalid() {
        let err = "xml".parse::<TextBackend>().unwrap_err();
        assert!(matches!(err, SearchError::InvalidBackend(ref s) if s == "xml"));
    }

    #[test]
    fn test_backend_display_round_trip() {
        for backend in [TextBackend::Api, TextBackend::Html, TextBackend::Lite] {
            assert_eq!(backend.to_string().parse::<TextBackend>().unwrap(), backend);
        }
    }

    #[test]
    fn test_text_query_defaults() {
        let query = TextQuery::new("rust");
        assert_eq!(query.keywords, "rust");
        assert_eq!(query.region, "wt-wt");
        assert_eq!(query.safesearch, SafeSearch::Moderate);
        assert!(query.timelimit.is_none());
        assert_eq!(query.backend, TextBackend::Api);
        assert_eq!(query.max_results, 0);
    }

    #[test]
    fn test_text_query_builder_chain() {
        let query = TextQuery::new("rust async")
            .with_region("us-en")
            .with_safesearch(SafeSearch::Off)
            .with_timelimit(TimeLimit::Week)
            .with_backend(TextBackend::Lite)
            .with_max_results(40);

        assert_eq!(query.region, "us-en");
        assert_eq!(query.safesearch, SafeSearch::Off);
        assert_eq!(query.timelimit, Some(TimeLimit::Week));
        assert_eq!(query.backend, TextBackend::Lite);
        assert_eq!(query.max_results, 40);
    }

    #[test]
    fn test_images_query_facets() {
        let query = ImagesQuery::new("ferris")
            .with_size("Large")
            .with_color("Orange")
            .with_type_image("photo")
            .with_layout("Wide")
            .with_license_image("Public")
            .with_timelimit("Week")
            .with_max_results(100);

        assert_eq!(query.size.as_deref(), Some("Large"));
        assert_eq!(query.color.as_deref(), Some("Orange"));
        assert_eq!(query.type_image.as_deref(), Some("photo"));
        assert_eq!(query.layout.as_deref(), Some("Wide"));
        assert_eq!(query.license_image.as_deref(), Some("Public"));
        assert_eq!(query.timelimit.as_deref(), Some("Week"));
        assert_eq!(query.max_results, 100);
    }

    #[test]
    fn test_videos_query_facets() {
        let query = VideosQuery::new("rustconf")
            .with_resolution("high")
            .with_duration("short")
            .with_license_videos("creativeCommon");

        assert_eq!(query.resolution.as_deref(), Some("high"));
        assert_eq!(query.duration.as_deref(), Some("short"));
        assert_eq!(query.license_videos.as_deref(), Some("creativeCommon"));
    }

    #[test]
    fn test_news_query_builder() {
        let query = NewsQuery::new("rust release")
            .with_region("uk-en")
            .with_timelimit(TimeLimit::Day)
            .with_max_results(30);

        assert_eq!(query.region, "uk-en");
        assert_eq!(query.timelimit, Some(TimeLimit::Day));
        assert_eq!(query.max_results, 30);
    }

    #[test]
    fn test_text_query_serialization() {
        let query = TextQuery::new("test");
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"keywords\":\"test\""));
        assert!(json.contains("\"backend\":\"api\""));
    }

    #[test]
    fn test_safesearch_serialization() {
        assert_eq!(serde_json::to_string(&SafeSearch::On).unwrap(), "\"on\"");
        assert_eq!(
            serde_json::to_string(&SafeSearch::Moderate).unwrap(),
            "\"moderate\""
        );
        assert_eq!(serde_json::to_string(&SafeSearch::Off).unwrap(), "\"off\"");
    }
}
