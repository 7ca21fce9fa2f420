//! Key-value persistence for cache entries and record slots.
//!
//! Keys are `/`-separated relative paths (`cache/2025-01-10/everything/…`,
//! `latest_prayer.json`). What a key means is decided by the caller; the
//! store only guarantees the write semantics: `put` overwrites atomically,
//! `put_if_absent` creates atomically or leaves the existing value alone.

use crate::error::{Result, VigilError};
use crate::io;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite `key` with `value`. Readers never observe a partial value.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Create `key` only if nothing is stored there. Returns `true` when this
    /// call created it.
    fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool>;

    /// Remove `key`. Returns `true` if something was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All keys beginning with `prefix`, sorted.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Load and decode a JSON value. An absent or blank entry is `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(Some(serde_json::from_slice(&bytes)?))
        }
        _ => Ok(None),
    }
}

/// Encode as pretty JSON and overwrite `key`.
pub fn save_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    store.put(key, &data)
}

// ---------------------------------------------------------------------------
// FsStore
// ---------------------------------------------------------------------------

/// Files under a single data directory; one file per key.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |p, part| p.join(part)))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            // Staged tempfiles from in-flight writes.
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if entry.file_type()?.is_dir() {
                self.collect(&path, out)?;
            } else if let Ok(rel) = path.strip_prefix(&self.root) {
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(key);
            }
        }
        Ok(())
    }
}

impl Store for FsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        io::atomic_write(&self.path_for(key)?, value)
    }

    fn put_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
        io::create_if_absent(&self.path_for(key)?, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        if self.root.is_dir() {
            self.collect(&self.root, &mut keys)?;
        }
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(VigilError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (FsStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().join(".vigil"));
        (store, dir)
    }

    #[test]
    fn get_returns_none_when_absent() {
        let (store, _dir) = store();
        assert_eq!(store.get("latest_prayer.json").unwrap(), None);
    }

    #[test]
    fn put_then_get() {
        let (store, _dir) = store();
        store.put("cache/2025-01-10/everything/q.json", b"{}").unwrap();
        assert_eq!(
            store.get("cache/2025-01-10/everything/q.json").unwrap(),
            Some(b"{}".to_vec())
        );
    }

    #[test]
    fn put_if_absent_does_not_clobber() {
        let (store, _dir) = store();
        assert!(store.put_if_absent("k.json", b"first").unwrap());
        assert!(!store.put_if_absent("k.json", b"second").unwrap());
        assert_eq!(store.get("k.json").unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn list_filters_by_prefix_and_sorts() {
        let (store, _dir) = store();
        store.put("cache/2025-01-11/a.json", b"1").unwrap();
        store.put("cache/2025-01-10/b.json", b"2").unwrap();
        store.put("latest_prayer.json", b"3").unwrap();
        assert_eq!(
            store.list("cache/").unwrap(),
            vec!["cache/2025-01-10/b.json", "cache/2025-01-11/a.json"]
        );
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let (store, _dir) = store();
        assert!(store.list("").unwrap().is_empty());
    }

    #[test]
    fn delete_reports_whether_removed() {
        let (store, _dir) = store();
        store.put("x.json", b"1").unwrap();
        assert!(store.delete("x.json").unwrap());
        assert!(!store.delete("x.json").unwrap());
    }

    #[test]
    fn rejects_escaping_keys() {
        let (store, _dir) = store();
        for key in ["", "/etc/passwd", "../up.json", "a//b", "a/./b"] {
            assert!(
                matches!(store.get(key), Err(VigilError::InvalidKey(_))),
                "expected invalid: {key}"
            );
        }
    }

    #[test]
    fn load_json_treats_blank_as_absent() {
        let (store, _dir) = store();
        store.put("blank.json", b"  \n").unwrap();
        let value: Option<serde_json::Value> = load_json(&store, "blank.json").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn save_json_is_pretty() {
        let (store, _dir) = store();
        save_json(&store, "v.json", &serde_json::json!({"a": 1})).unwrap();
        let text = String::from_utf8(store.get("v.json").unwrap().unwrap()).unwrap();
        assert!(text.contains("\n"));
    }
}
