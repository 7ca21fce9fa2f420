pub mod cache;
pub mod config;
pub mod metadata;
pub mod pray;
pub mod show;

use anyhow::Context;
use std::future::Future;
use std::path::Path;
use vigil_clients::{NewsApiClient, OpenAiChat};
use vigil_core::config::{require_credential, Config};
use vigil_core::paths;
use vigil_core::store::FsStore;

pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const NEWS_KEY_VAR: &str = "NEWS_API_KEY";
pub const NEWS_URL_VAR: &str = "VIGIL_NEWS_BASE_URL";
pub const OPENAI_URL_VAR: &str = "VIGIL_OPENAI_BASE_URL";

/// Load `.vigil/config.yaml` and apply endpoint overrides from the
/// environment.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(url) = env_value(NEWS_URL_VAR) {
        config.news.base_url = url;
    }
    if let Some(url) = env_value(OPENAI_URL_VAR) {
        config.openai.base_url = url;
    }
    Ok(config)
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

pub fn open_store(root: &Path) -> FsStore {
    FsStore::new(paths::data_dir(root))
}

pub fn chat_client(config: &Config, api_key: Option<String>) -> anyhow::Result<OpenAiChat> {
    let key = require_credential(OPENAI_KEY_VAR, api_key)?;
    Ok(OpenAiChat::new(key)
        .with_base_url(&config.openai.base_url)
        .with_timeout(config.http.timeout())
        .with_retry(config.http.retry_policy()))
}

pub fn news_client(config: &Config, api_key: Option<String>) -> anyhow::Result<NewsApiClient> {
    let key = require_credential(NEWS_KEY_VAR, api_key)?;
    Ok(NewsApiClient::new(key)
        .with_base_url(&config.news.base_url)
        .with_timeout(config.http.timeout())
        .with_retry(config.http.retry_policy()))
}

/// Drive a pipeline future to completion on a fresh runtime.
pub fn block_on<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    Ok(rt.block_on(fut))
}
