// Persistence backends for the response cache.
// A store only loads and saves the whole map; expiry is handled by ResponseCache.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Fallback lifetime for entries written without a `ttl` field.
pub const FALLBACK_TTL_SECS: f64 = 3600.0;

/// One persisted cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, seconds since the Unix epoch.
    #[serde(default)]
    pub ts: f64,
    /// Lifetime in seconds.
    #[serde(default = "fallback_ttl")]
    pub ttl: f64,
    #[serde(default)]
    pub value: serde_json::Value,
}

fn fallback_ttl() -> f64 {
    FALLBACK_TTL_SECS
}

impl CacheEntry {
    pub fn new(value: serde_json::Value, ttl: f64, now: f64) -> Self {
        Self { ts: now, ttl, value }
    }

    /// An entry is valid iff `now < ts + ttl`.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.ts + self.ttl
    }
}

pub type CacheMap = BTreeMap<String, CacheEntry>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Whole-map key-value persistence.
#[cfg_attr(test, mockall::automock)]
pub trait CacheStore: Send + Sync {
    /// Loads every persisted entry, expired or not.
    fn load(&self) -> Result<CacheMap, CacheError>;

    /// Replaces the persisted map.
    fn save(&self, entries: &CacheMap) -> Result<(), CacheError>;
}

/// Decodes entries one by one; unreadable ones (including `null`) are dropped
fn decode_entries(raw: BTreeMap<String, serde_json::Value>) -> CacheMap {
    raw.into_iter()
        .filter(|(_, value)| !value.is_null())
        .filter_map(|(key, value)| match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Dropping unreadable cache entry");
                None
            }
        })
        .collect()
}

/// Single JSON document on disk mapping key -> `{ts, ttl, value}`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<CacheMap, CacheError> {
        if !self.path.exists() {
            return Ok(CacheMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&contents)?;
        Ok(decode_entries(raw))
    }

    fn save(&self, entries: &CacheMap) -> Result<(), CacheError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let json = serde_json::to_string(entries)?;

        // Each save writes its own temp file, then renames it over the document
        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

/// In-process store, for tests and runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<CacheMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: CacheMap) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn snapshot(&self) -> CacheMap {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<CacheMap, CacheError> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| CacheError::Io(io::Error::other("memory store poisoned")))
    }

    fn save(&self, entries: &CacheMap) -> Result<(), CacheError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CacheError::Io(io::Error::other("memory store poisoned")))?;
        *guard = entries.clone();
        Ok(())
    }
}
