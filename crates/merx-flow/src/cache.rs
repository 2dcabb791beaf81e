//! # Query Cache
//!
//! The cached-or-remote collaborator the screens use for catalog and record
//! listings.
//!
//! `fetch` returns the cached value for a key when present, otherwise runs
//! the loader and stores its result under the key with a set of tags.
//! `invalidate(tag)` drops every entry carrying that tag, so a successful
//! create or cancel can evict all record listings in one call.
//!
//! Values are stored as JSON so one cache serves every response type. The
//! core never depends on this module's internals; it is plumbing between
//! the screens and the collaborator traits.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::collab::RemoteError;

struct CacheEntry {
    value: serde_json::Value,
    tags: Vec<String>,
}

/// In-memory tag-indexed response cache.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        QueryCache::default()
    }

    /// Returns the cached value for `key`, or loads, caches and returns it.
    ///
    /// The lock is never held across the loader's await.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &str,
        tags: &[&str],
        load: F,
    ) -> Result<T, RemoteError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        if let Some(hit) = self.get(key) {
            debug!(key, "query cache hit");
            return Ok(hit);
        }

        let value = load().await?;
        self.put(key, tags, &value)?;
        Ok(value)
    }

    /// Drops every entry tagged with `tag`.
    pub fn invalidate(&self, tag: &str) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let before = entries.len();
        entries.retain(|_, e| !e.tags.iter().any(|t| t == tag));
        debug!(tag, evicted = before - entries.len(), "query cache invalidated");
    }

    /// Drops everything, for session teardown.
    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .get(key)
            .and_then(|e| serde_json::from_value(e.value.clone()).ok())
    }

    fn put<T: Serialize>(&self, key: &str, tags: &[&str], value: &T) -> Result<(), RemoteError> {
        let value = serde_json::to_value(value)
            .map_err(|e| RemoteError::Transport(format!("cache encode: {e}")))?;
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
