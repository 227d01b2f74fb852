//! Cache stores for indexed search paths.
//!
//! Each search path gets one entry, keyed by the SHA-256 of its root, holding
//! the fingerprint of the directory listing it was indexed from and the
//! records found there.

use crate::error::Result;
use crate::record::ThemeRecord;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Prefix of every search-path cache key.
pub const CACHE_KEY_PREFIX: &str = "themes.path_cache.";

/// Generic get/put cache.
///
/// Stores may be shared between processes; concurrent writers race and the
/// last write wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value) -> Result<()>;
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Cache key of the entry for `root`.
pub fn cache_key_for_root(root: &Path) -> String {
    format!(
        "{CACHE_KEY_PREFIX}{}",
        sha256_hex(root.to_string_lossy().as_bytes())
    )
}

/// What is stored per search path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPathCacheEntry {
    /// Fingerprint of the listing the themes were indexed from.
    #[serde(default)]
    pub integrity_hash: Option<String>,
    #[serde(default)]
    pub themes: BTreeMap<String, ThemeRecord>,
}

impl SearchPathCacheEntry {
    /// Decode a cached value.
    ///
    /// A miss, a value carrying neither `integrity_hash` nor `themes`, or a
    /// value that fails to decode is an empty entry.
    pub fn from_cached(value: Option<Value>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let has_shape = value
            .as_object()
            .is_some_and(|o| o.contains_key("integrity_hash") || o.contains_key("themes"));
        if !has_shape {
            return Self::default();
        }
        match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Discarding undecodable theme cache entry: {}", e);
                Self::default()
            }
        }
    }
}

// ── In-memory ──────────────────────────────────────────────────────────────

/// Process-local cache store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Value>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `put` calls served so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}

// ── File-backed ────────────────────────────────────────────────────────────

/// Cache store keeping one JSON file per key in a directory.
///
/// File names are the SHA-256 of the key, so any key is safe to use. Writes
/// go to a temporary file that is then renamed over the entry, so readers in
/// other processes never observe a half-written file.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    directory: PathBuf,
}

impl FileCacheStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", sha256_hex(key.as_bytes())))
    }
}

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.entry_path(key);
        // Unique per writer, so concurrent puts never share a temp file.
        let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let temp_path = path.with_extension(format!("json.{}-{}.tmp", std::process::id(), seq));
        let data = serde_json::to_vec(&value).map_err(std::io::Error::other)?;
        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, &path)?;
        log::trace!("Wrote cache entry {} for {}", path.display(), key);
        Ok(())
    }
}
