//! The search client and its per-endpoint request plumbing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::aggregator::{fan_out, Collector, Pagination};
use crate::extract::{json_results, Extract, HtmlBlocks, LiteRows, RawRecord, RawTextRecord, ScriptJson};
use crate::fetcher::{HttpMethod, PageFetcher};
use crate::fetcher_http::HttpFetcher;
use crate::query::{ImagesQuery, NewsQuery, SafeSearch, TextBackend, TextQuery, VideosQuery};
use crate::result::{
    Answer, ImageResult, NewsResult, Suggestion, TextResult, Translation, VideoResult,
};
use crate::token::extract_vqd;
use crate::{Result, SearchError};

const BASE_URL: &str = "https://duckduckgo.com";
const TEXT_API_URL: &str = "https://links.duckduckgo.com/d.js";
const TEXT_HTML_URL: &str = "https://html.duckduckgo.com/html";
const TEXT_LITE_URL: &str = "https://lite.duckduckgo.com/lite/";
const IMAGES_URL: &str = "https://duckduckgo.com/i.js";
const VIDEOS_URL: &str = "https://duckduckgo.com/v.js";
const NEWS_URL: &str = "https://duckduckgo.com/news.js";
const ANSWERS_URL: &str = "https://api.duckduckgo.com/";
const SUGGESTIONS_URL: &str = "https://duckduckgo.com/ac";
const TRANSLATE_URL: &str = "https://duckduckgo.com/translation.js";

/// The html endpoint only demands a token past its first-page size.
const HTML_TOKEN_THRESHOLD: usize = 20;

type Payload = Vec<(String, String)>;

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Async DuckDuckGo search client.
///
/// One instance may serve many queries; the underlying transport is
/// reused but no query state outlives a call.
pub struct Ddgs {
    fetcher: Arc<dyn PageFetcher>,
}

impl Ddgs {
    /// Creates a client with default transport settings.
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    /// Starts building a client with custom transport settings.
    pub fn builder() -> DdgsBuilder {
        DdgsBuilder::default()
    }

    /// Creates a client over a caller-supplied fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches the vqd session token scoping `keywords`.
    async fn request_token(&self, keywords: &str) -> Result<String> {
        let params = vec![param("q", keywords)];
        let body = self
            .fetcher
            .fetch(HttpMethod::Post, BASE_URL, &params, None)
            .await?;
        extract_vqd(&body, keywords)
    }

    /// Text search, dispatching on the query's backend.
    pub async fn text(&self, query: &TextQuery) -> Result<Vec<TextResult>> {
        if query.keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        match query.backend {
            TextBackend::Api => self.text_api(query).await,
            TextBackend::Html => self.text_html(query).await,
            TextBackend::Lite => self.text_lite(query).await,
        }
    }

    async fn text_api(&self, query: &TextQuery) -> Result<Vec<TextResult>> {
        let vqd = self.request_token(&query.keywords).await?;
        let mut payload = vec![
            param("q", &*query.keywords),
            param("kl", &*query.region),
            param("l", &*query.region),
            param("vqd", vqd),
            param("bing_market", &*query.region),
            param("a", "ftsa"),
        ];
        match query.safesearch {
            SafeSearch::Moderate => payload.push(param("ex", "-1")),
            SafeSearch::Off => payload.push(param("ex", "-2")),
            SafeSearch::On => payload.push(param("p", "1")),
        }
        if let Some(limit) = query.timelimit {
            payload.push(param("df", limit.as_code()));
        }
        self.text_pages(
            TEXT_API_URL,
            HttpMethod::Get,
            payload,
            ScriptJson,
            true,
            query.max_results,
        )
        .await
    }

    async fn text_html(&self, query: &TextQuery) -> Result<Vec<TextResult>> {
        let mut payload = vec![
            param("q", &*query.keywords),
            param("kl", &*query.region),
            param(
                "p",
                match query.safesearch {
                    SafeSearch::On => "1",
                    SafeSearch::Moderate => "-1",
                    SafeSearch::Off => "-2",
                },
            ),
            param("o", "json"),
            param("api", "d.js"),
        ];
        if let Some(limit) = query.timelimit {
            payload.push(param("df", limit.as_code()));
        }
        if query.max_results > HTML_TOKEN_THRESHOLD {
            let vqd = self.request_token(&query.keywords).await?;
            payload.push(param("vqd", vqd));
        }
        self.text_pages(
            TEXT_HTML_URL,
            HttpMethod::Post,
            payload,
            HtmlBlocks,
            false,
            query.max_results,
        )
        .await
    }

    async fn text_lite(&self, query: &TextQuery) -> Result<Vec<TextResult>> {
        let mut payload = vec![
            param("q", &*query.keywords),
            param("o", "json"),
            param("api", "d.js"),
            param("kl", &*query.region),
        ];
        if let Some(limit) = query.timelimit {
            payload.push(param("df", limit.as_code()));
        }
        self.text_pages(
            TEXT_LITE_URL,
            HttpMethod::Post,
            payload,
            LiteRows,
            false,
            query.max_results,
        )
        .await
    }

    /// Runs the paginated fan-out for one of the text shapes.
    async fn text_pages<E>(
        &self,
        url: &'static str,
        method: HttpMethod,
        payload: Payload,
        extractor: E,
        require_body: bool,
        max_results: usize,
    ) -> Result<Vec<TextResult>>
    where
        E: Extract<Record = RawTextRecord> + Send + Sync + 'static,
    {
        let pagination = Pagination::TEXT;
        let pages = pagination.pages(max_results);
        debug!(pages = pages.len(), url, "dispatching text search");

        let collector = Arc::new(Collector::new());
        let fetcher = Arc::clone(&self.fetcher);
        let payload = Arc::new(payload);
        let extractor = Arc::new(extractor);

        fan_out(pages, &collector, move |page| {
            let fetcher = Arc::clone(&fetcher);
            let payload = Arc::clone(&payload);
            let extractor = Arc::clone(&extractor);
            async move {
                let mut params = (*payload).clone();
                params.push(param("s", page.offset.to_string()));
                let body = fetcher.fetch(method, url, &params, None).await?;
                let records = extractor.extract(&body)?;
                Ok(records
                    .into_iter()
                    .filter_map(|raw| TextResult::from_raw(raw, require_body))
                    .collect())
            }
        })
        .await;

        Ok(collector.drain_ordered(pagination.limit(max_results)))
    }

    /// Image search.
    pub async fn images(&self, query: &ImagesQuery) -> Result<Vec<ImageResult>> {
        if query.keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        let vqd = self.request_token(&query.keywords).await?;
        let mut payload = vec![
            param("l", &*query.region),
            param("o", "json"),
            param("q", &*query.keywords),
            param("vqd", vqd),
            param(
                "p",
                match query.safesearch {
                    SafeSearch::On | SafeSearch::Moderate => "1",
                    SafeSearch::Off => "-1",
                },
            ),
        ];
        let facets = facet_string(&[
            ("time", query.timelimit.as_deref()),
            ("size", query.size.as_deref()),
            ("color", query.color.as_deref()),
            ("type", query.type_image.as_deref()),
            ("layout", query.layout.as_deref()),
            ("license", query.license_image.as_deref()),
        ]);
        if !facets.is_empty() {
            payload.push(param("f", facets));
        }
        self.json_pages(
            IMAGES_URL,
            Pagination::IMAGES,
            payload,
            query.max_results,
            ImageResult::from_raw,
        )
        .await
    }

    /// Video search.
    pub async fn videos(&self, query: &VideosQuery) -> Result<Vec<VideoResult>> {
        if query.keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        let vqd = self.request_token(&query.keywords).await?;
        let mut payload = vec![
            param("l", &*query.region),
            param("o", "json"),
            param("q", &*query.keywords),
            param("vqd", vqd),
            param(
                "p",
                match query.safesearch {
                    SafeSearch::On => "1",
                    SafeSearch::Moderate => "-1",
                    SafeSearch::Off => "-2",
                },
            ),
        ];
        let facets = facet_string(&[
            ("publishedAfter", query.timelimit.as_deref()),
            ("videoDefinition", query.resolution.as_deref()),
            ("videoDuration", query.duration.as_deref()),
            ("videoLicense", query.license_videos.as_deref()),
        ]);
        if !facets.is_empty() {
            payload.push(param("f", facets));
        }
        self.json_pages(
            VIDEOS_URL,
            Pagination::VIDEOS,
            payload,
            query.max_results,
            VideoResult::from_raw,
        )
        .await
    }

    /// News search.
    pub async fn news(&self, query: &NewsQuery) -> Result<Vec<NewsResult>> {
        if query.keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        let vqd = self.request_token(&query.keywords).await?;
        let mut payload = vec![
            param("l", &*query.region),
            param("o", "json"),
            param("noamp", "1"),
            param("q", &*query.keywords),
            param("vqd", vqd),
            param(
                "p",
                match query.safesearch {
                    SafeSearch::On => "1",
                    SafeSearch::Moderate => "-1",
                    SafeSearch::Off => "-2",
                },
            ),
        ];
        if let Some(limit) = query.timelimit {
            payload.push(param("df", limit.as_code()));
        }
        self.json_pages(
            NEWS_URL,
            Pagination::NEWS,
            payload,
            query.max_results,
            NewsResult::from_raw,
        )
        .await
    }

    /// Runs the paginated fan-out for one of the plain-JSON shapes.
    async fn json_pages<T>(
        &self,
        url: &'static str,
        pagination: Pagination,
        payload: Payload,
        max_results: usize,
        map_record: fn(&RawRecord) -> Option<(String, T)>,
    ) -> Result<Vec<T>>
    where
        T: Send + 'static,
    {
        let pages = pagination.pages(max_results);
        debug!(pages = pages.len(), url, "dispatching media search");

        let collector = Arc::new(Collector::new());
        let fetcher = Arc::clone(&self.fetcher);
        let payload = Arc::new(payload);

        fan_out(pages, &collector, move |page| {
            let fetcher = Arc::clone(&fetcher);
            let payload = Arc::clone(&payload);
            async move {
                let mut params = (*payload).clone();
                params.push(param("s", page.offset.to_string()));
                let body = fetcher.fetch(HttpMethod::Get, url, &params, None).await?;
                let rows = json_results(&body)?;
                Ok(rows.iter().filter_map(map_record).collect())
            }
        })
        .await;

        Ok(collector.drain_ordered(pagination.limit(max_results)))
    }

    /// Instant answers: the abstract for "what is <keywords>", then the
    /// related topics for the keywords themselves.
    pub async fn answers(&self, keywords: &str) -> Result<Vec<Answer>> {
        if keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }

        let params = vec![param("format", "json"), param("q", format!("what is {keywords}"))];
        let body = self
            .fetcher
            .fetch(HttpMethod::Get, ANSWERS_URL, &params, None)
            .await?;
        let page: Value = serde_json::from_str(&body)
            .map_err(|e| SearchError::Extraction(format!("answers JSON: {e}")))?;

        let mut results = Vec::new();
        let text = json_str(&page, "AbstractText");
        if !text.is_empty() {
            results.push(Answer {
                icon: String::new(),
                text,
                topic: String::new(),
                url: json_str(&page, "AbstractURL"),
            });
        }

        let params = vec![param("format", "json"), param("q", keywords)];
        let body = self
            .fetcher
            .fetch(HttpMethod::Get, ANSWERS_URL, &params, None)
            .await?;
        let page: Value = serde_json::from_str(&body)
            .map_err(|e| SearchError::Extraction(format!("related topics JSON: {e}")))?;

        if let Some(rows) = page.get("RelatedTopics").and_then(Value::as_array) {
            for row in rows {
                let topic = json_str(row, "Name");
                if topic.is_empty() {
                    push_topic_answer(&mut results, row, "");
                } else if let Some(grouped) = row.get("Topics").and_then(Value::as_array) {
                    for sub in grouped {
                        push_topic_answer(&mut results, sub, &topic);
                    }
                }
            }
        }
        Ok(results)
    }

    /// Query completion suggestions.
    pub async fn suggestions(&self, keywords: &str, region: &str) -> Result<Vec<Suggestion>> {
        if keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        let region = if region.is_empty() { "wt-wt" } else { region };
        let params = vec![param("q", keywords), param("kl", region)];
        let body = self
            .fetcher
            .fetch(HttpMethod::Get, SUGGESTIONS_URL, &params, None)
            .await?;
        serde_json::from_str(&body)
            .map_err(|e| SearchError::Extraction(format!("suggestions JSON: {e}")))
    }

    /// Translates each input string concurrently; failed items are
    /// dropped, successes are returned in completion order.
    pub async fn translate(
        &self,
        keywords: &[String],
        from: Option<&str>,
        to: &str,
    ) -> Result<Vec<Translation>> {
        if keywords.is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        let to = if to.is_empty() { "en" } else { to };

        // The token is scoped to the literal word "translate".
        let vqd = self.request_token("translate").await?;
        let mut payload = vec![
            param("vqd", vqd),
            param("query", "translate"),
            param("to", to),
        ];
        if let Some(from) = from {
            if !from.is_empty() {
                payload.push(param("from", from));
            }
        }

        let results = Arc::new(Mutex::new(Vec::new()));
        let payload = Arc::new(payload);
        let tasks: Vec<_> = keywords
            .iter()
            .cloned()
            .map(|keyword| {
                let fetcher = Arc::clone(&self.fetcher);
                let payload = Arc::clone(&payload);
                let results = Arc::clone(&results);
                tokio::spawn(async move {
                    let fetched = fetcher
                        .fetch(HttpMethod::Post, TRANSLATE_URL, &payload, Some(keyword.clone()))
                        .await;
                    let body = match fetched {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(error = %e, "translation item dropped");
                            return;
                        }
                    };
                    let Ok(page) = serde_json::from_str::<Value>(&body) else {
                        warn!("unparseable translation response, item dropped");
                        return;
                    };
                    let translated = json_str(&page, "translated");
                    if translated.is_empty() {
                        return;
                    }
                    let detected = page
                        .get("detected_language")
                        .and_then(Value::as_str)
                        .map(String::from);
                    let mut held = results.lock().unwrap_or_else(|e| e.into_inner());
                    held.push(Translation {
                        original: keyword,
                        translated,
                        detected_language: detected,
                    });
                })
            })
            .collect();
        join_all(tasks).await;

        let mut held = results.lock().unwrap_or_else(|e| e.into_inner());
        Ok(std::mem::take(&mut *held))
    }
}

impl Default for Ddgs {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`Ddgs`] client over the HTTP transport.
pub struct DdgsBuilder {
    timeout: Duration,
    proxy: Option<String>,
    user_agent: String,
}

impl Default for DdgsBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            proxy: None,
            user_agent: "Mozilla/5.0 (compatible; ddg-search/0.3)".to_string(),
        }
    }
}

impl DdgsBuilder {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Routes all requests through the given proxy URL
    /// (e.g. `http://127.0.0.1:8080` or `socks5://127.0.0.1:1080`).
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Overrides the user-agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Ddgs> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout);
        if let Some(proxy) = self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = builder.build()?;
        Ok(Ddgs::with_fetcher(Arc::new(HttpFetcher::with_client(
            client,
        ))))
    }
}

/// Joins present facets as `key:value` pairs for the `f` parameter.
fn facet_string(facets: &[(&str, Option<&str>)]) -> String {
    facets
        .iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}:{v}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn json_str(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn push_topic_answer(results: &mut Vec<Answer>, row: &Value, topic: &str) {
    let text = json_str(row, "Text");
    if text.is_empty() {
        return;
    }
    let icon_path = row
        .get("Icon")
        .and_then(|icon| icon.get("URL"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let icon = if icon_path.is_empty() {
        String::new()
    } else {
        format!("{BASE_URL}{icon_path}")
    };
    results.push(Answer {
        icon,
        text,
        topic: topic.to_string(),
        url: json_str(row, "FirstURL"),
    });
}
