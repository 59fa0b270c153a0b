//! Page fetcher abstraction for retrieving raw response bodies.

use async_trait::async_trait;

use crate::Result;

/// HTTP method for a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Trait for issuing one HTTP request for one page.
///
/// Implementations own their transport configuration (user-agent,
/// timeout, proxy); `fetch` is a parameters-in, body-out interface. The
/// optional `body` carries a raw POST payload (used by translation,
/// where the body is the text to translate).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs the request and returns the response body.
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
        body: Option<String>,
    ) -> Result<String>;
}
