use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::store::{CacheEntry, CacheError, CacheMap, CacheStore};
use crate::models::{MediaKind, SearchKind, TimeWindow, TrendingMediaType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        kind: SearchKind,
        query: String,
        page: u32,
    },
    Details(MediaKind, u64),
    Trending {
        media_type: TrendingMediaType,
        window: TimeWindow,
        page: u32,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search { kind, query, page } => write!(f, "search:{}:{}:{}", kind, query, page),
            CacheKey::Details(kind, id) => write!(f, "{}:{}", kind, id),
            CacheKey::Trending {
                media_type,
                window,
                page,
            } => write!(f, "trending:{}:{}:{}", media_type, window, page),
        }
    }
}

/// Outcome of a raw lookup. Callers only ever see hit or `None`.
#[derive(Debug)]
enum Lookup {
    Hit(serde_json::Value),
    Miss,
    Unavailable(CacheError),
}

/// Best-effort TTL cache in front of a [`CacheStore`].
///
/// Every operation loads the whole store, so expired entries are pruned on
/// read. Store calls run on the blocking pool. Store failures never reach the
/// caller: a failed load is a miss and a failed save is dropped.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the cached value for `key` if present, unexpired and of type `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        match self.lookup(key.clone()).await {
            Lookup::Hit(value) => match serde_json::from_value(value) {
                Ok(data) => {
                    tracing::debug!(key = %key, "Cache hit");
                    Some(data)
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Cached value has unexpected shape");
                    None
                }
            },
            Lookup::Miss => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
            Lookup::Unavailable(e) => {
                tracing::debug!(key = %key, error = %e, "Cache store unavailable");
                None
            }
        }
    }

    /// Stores `value` under `key` with the default TTL
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    /// Stores `value` under `key`, overwriting any previous entry
    pub async fn set_with_ttl<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let key = key.to_string();
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache serialization error");
                return;
            }
        };

        let store = self.store.clone();
        let entry_key = key.clone();
        let saved = tokio::task::spawn_blocking(move || {
            let mut entries = load_pruned(store.as_ref()).unwrap_or_default();
            entries.insert(entry_key, CacheEntry::new(value, ttl.as_secs_f64(), now()));
            store.save(&entries)
        })
        .await;

        match saved {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(key = %key, error = %e, "Failed to persist cache entry"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache write task failed"),
        }
    }

    async fn lookup(&self, key: String) -> Lookup {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            load_pruned(store.as_ref()).map(|mut entries| entries.remove(&key))
        })
        .await;

        match loaded {
            Ok(Ok(Some(entry))) => Lookup::Hit(entry.value),
            Ok(Ok(None)) => Lookup::Miss,
            Ok(Err(e)) => Lookup::Unavailable(e),
            Err(e) => Lookup::Unavailable(CacheError::Io(io::Error::other(e.to_string()))),
        }
    }
}

/// Loads the store and drops expired entries, writing back if any were dropped
fn load_pruned(store: &dyn CacheStore) -> Result<CacheMap, CacheError> {
    let mut entries = store.load()?;
    let now = now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));

    let pruned = before - entries.len();
    if pruned > 0 {
        tracing::debug!(pruned, "Pruned expired cache entries");
        if let Err(e) = store.save(&entries) {
            tracing::warn!(error = %e, "Failed to persist pruned cache");
        }
    }

    Ok(entries)
}

/// Current time in fractional seconds since the Unix epoch
fn now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
