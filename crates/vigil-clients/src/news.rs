use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{ClientError, Result, RetryPolicy};

pub const NEWS_API_URL: &str = "https://newsapi.org/v2";

const SERVICE: &str = "NewsAPI";

// ─── NewsSource ───────────────────────────────────────────────────────────

/// The news collaborator. Returns the raw response body untouched so the
/// caller can persist it byte-for-byte before interpreting it.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// `endpoint` is a path segment such as `everything` or `top-headlines`;
    /// `query` is a pre-encoded query string such as `country=us`.
    async fn fetch(&self, endpoint: &str, query: &str) -> Result<Vec<u8>>;
}

// ─── NewsApiClient ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url: NEWS_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full request URL for an endpoint/query pair. The credential travels in
    /// a header, never in the URL, so this is safe to log.
    pub fn url_for(&self, endpoint: &str, query: &str) -> String {
        let endpoint = endpoint.trim_matches('/');
        if query.is_empty() {
            format!("{}/{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}?{query}", self.base_url)
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch(&self, endpoint: &str, query: &str) -> Result<Vec<u8>> {
        let url = self.url_for(endpoint, query);
        debug!(url = %url, "news request");
        self.retry.run("news fetch", || self.fetch_once(&url)).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
