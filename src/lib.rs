//! # ddg-search
//!
//! An async DuckDuckGo search client library.
//!
//! This library aggregates paginated search results across result types
//! (text, images, videos, news, instant answers, suggestions,
//! translation) and response shapes, with support for:
//!
//! - Concurrent page fetching with one task per page
//! - Intra-query deduplication with deterministic ordering
//! - Token-gated pagination (vqd session tokens)
//! - Tolerant partial aggregation (a failed page never fails the call)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddg_search::{Ddgs, TextQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Ddgs::new();
//!
//!     let query = TextQuery::new("rust programming").with_max_results(25);
//!     let results = client.text(&query).await?;
//!
//!     for result in &results {
//!         println!("{}: {}", result.title, result.href);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod client;
mod error;
mod extract;
mod fetcher;
mod fetcher_http;
mod normalize;
mod query;
mod result;
mod token;

pub use client::{Ddgs, DdgsBuilder};
pub use error::{Result, SearchError};
pub use fetcher::{HttpMethod, PageFetcher};
pub use fetcher_http::HttpFetcher;
pub use normalize::{normalize_text, normalize_url};
pub use query::{ImagesQuery, NewsQuery, SafeSearch, TextBackend, TextQuery, TimeLimit, VideosQuery};
pub use result::{
    Answer, ImageResult, NewsResult, Suggestion, TextResult, Translation, VideoResult,
};
pub use token::extract_vqd;
