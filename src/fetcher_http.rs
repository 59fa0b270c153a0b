//! HTTP-based page fetcher using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::fetcher::{HttpMethod, PageFetcher};
use crate::Result;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ddg-search/0.3)";

/// A page fetcher that issues plain HTTP requests via reqwest.
///
/// The underlying connection pool is reused across calls but carries no
/// query-specific state.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(DEFAULT_USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    ///
    /// Timeouts and proxies are configured on the client; every request
    /// issued through this fetcher inherits them.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
        body: Option<String>,
    ) -> Result<String> {
        let mut target = Url::parse(url)?;
        if !params.is_empty() {
            target
                .query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let request = match method {
            HttpMethod::Get => self.client.get(target),
            HttpMethod::Post => self.client.post(target),
        };
        let request = match body {
            Some(body) => request.body(body),
            None => request,
        };

        let response = request.send().await?;
        let text = response.text().await?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_new() {
        let _fetcher = HttpFetcher::new();
    }

    #[test]
    fn test_http_fetcher_default() {
        let _fetcher = HttpFetcher::default();
    }

    #[test]
    fn test_http_fetcher_with_client() {
        let client = Client::builder().user_agent("test-agent").build().unwrap();
        let _fetcher = HttpFetcher::with_client(client);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let fetcher = HttpFetcher::new();
        let result = fetcher
            .fetch(HttpMethod::Get, "not a url", &[], None)
            .await;
        assert!(matches!(result, Err(crate::SearchError::UrlParse(_))));
    }
}
