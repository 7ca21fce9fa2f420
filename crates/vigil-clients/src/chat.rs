use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::types::{ChatRequest, ChatResponse};
use crate::{ClientError, Result, RetryPolicy};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

const SERVICE: &str = "OpenAI";

// ─── ChatModel ────────────────────────────────────────────────────────────

/// The language-model collaborator: one role-tagged request in, free-form
/// text out. The reply carries no structural guarantee; callers parse it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

// ─── OpenAiChat ───────────────────────────────────────────────────────────

/// Chat completions over the OpenAI HTTP API (or any compatible endpoint).
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
            timeout: Duration::from_secs(120),
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

    async fn send_once(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(request)
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

        let bytes = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes).map_err(|source| {
            ClientError::Parse {
                service: SERVICE,
                source,
            }
        })?;

        if let Some(usage) = parsed.usage {
            debug!(
                model = %request.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        parsed
            .first_text()
            .map(|text| text.trim().to_string())
            .ok_or(ClientError::EmptyCompletion(SERVICE))
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "chat completion request"
        );
        self.retry
            .run("chat completion", || self.send_once(request))
            .await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
