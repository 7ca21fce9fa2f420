//! Day-keyed cache in front of the news collaborator.
//!
//! At most one external fetch per (day, endpoint, query). The raw payload
//! is stored before anything is derived from it, so a rerun on the same day
//! sees exactly the bytes the first run saw.

use crate::error::{Result, VigilError};
use crate::headline::{format_listing, parse_listing};
use crate::paths;
use crate::store::Store;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use vigil_clients::NewsSource;

const HASH_PREFIX_LEN: usize = 12;
const MAX_QUERY_SLUG: usize = 64;

// ---------------------------------------------------------------------------
// CacheKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub day: NaiveDate,
    pub endpoint: String,
    pub query: String,
}

impl CacheKey {
    pub fn new(day: NaiveDate, endpoint: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            day,
            endpoint: endpoint.into(),
            query: query.into(),
        }
    }

    /// `cache/<YYYY-MM-DD>/<endpoint>/<query-slug>-<sha256 prefix>.json`
    ///
    /// The slugs keep keys readable; the hash covers endpoint and query
    /// verbatim, so pairs that sanitize to the same slugs stay apart.
    pub fn storage_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.endpoint.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.query.as_bytes());
        let digest = hasher.finalize();
        let hash: String = digest
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
            .chars()
            .take(HASH_PREFIX_LEN)
            .collect();
        format!(
            "{}/{}/{}/{}-{}.json",
            paths::CACHE_PREFIX,
            day_prefix(self.day),
            sanitize(&self.endpoint),
            sanitize(&self.query),
            hash
        )
    }
}

pub fn day_prefix(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn sanitize(raw: &str) -> String {
    let slug: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(MAX_QUERY_SLUG)
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "default".to_string()
    } else {
        slug.to_string()
    }
}

// ---------------------------------------------------------------------------
// SourceCache
// ---------------------------------------------------------------------------

pub struct SourceCache<'a> {
    store: &'a dyn Store,
    news: &'a dyn NewsSource,
    day: NaiveDate,
}

impl<'a> SourceCache<'a> {
    pub fn new(store: &'a dyn Store, news: &'a dyn NewsSource, day: NaiveDate) -> Self {
        Self { store, news, day }
    }

    /// Formatted headlines for `endpoint?query` on this cache's day.
    pub async fn fetch(&self, endpoint: &str, query: &str) -> Result<Vec<String>> {
        let key = CacheKey::new(self.day, endpoint, query).storage_key();
        let payload = match self.store.get(&key)? {
            Some(bytes) => {
                info!(key = %key, "using cached headlines");
                bytes
            }
            None => self.fetch_and_store(&key, endpoint, query).await?,
        };
        let headlines = format_listing(&parse_listing(&payload)?);
        debug!(key = %key, count = headlines.len(), "headlines loaded");
        Ok(headlines)
    }

    async fn fetch_and_store(&self, key: &str, endpoint: &str, query: &str) -> Result<Vec<u8>> {
        info!(endpoint, query, day = %self.day, "fetching headlines");
        let payload = self
            .news
            .fetch(endpoint, query)
            .await
            .map_err(VigilError::news)?;
        // Refuse to cache something that will never parse.
        parse_listing(&payload)?;
        if self.store.put_if_absent(key, &payload)? {
            return Ok(payload);
        }
        // Another process created the entry first; its payload wins.
        debug!(key, "cache entry created concurrently; using stored payload");
        Ok(self.store.get(key)?.unwrap_or(payload))
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// Cache keys, optionally limited to one day.
pub fn list_entries(store: &dyn Store, day: Option<NaiveDate>) -> Result<Vec<String>> {
    let prefix = match day {
        Some(d) => format!("{}/{}/", paths::CACHE_PREFIX, day_prefix(d)),
        None => format!("{}/", paths::CACHE_PREFIX),
    };
    store.list(&prefix)
}

/// Delete entries for days before `cutoff`. Returns the number removed.
pub fn prune_before(store: &dyn Store, cutoff: NaiveDate) -> Result<usize> {
    let mut removed = 0;
    for key in list_entries(store, None)? {
        let day = key
            .split('/')
            .nth(1)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        if matches!(day, Some(d) if d < cutoff) && store.delete(&key)? {
            removed += 1;
        }
    }
    Ok(removed)
}
