//! Cache-backed theme indexer.
//!
//! Every search path is fingerprinted by the sorted names of its direct
//! subdirectories. When the fingerprint matches the cached one, the cached
//! records are reused without touching any theme directory; otherwise the
//! path is re-indexed and the cache entry replaced. The merged result is
//! memoized until [`ThemeIndexer::invalidate`] or a forced refresh.
//!
//! Invalidation works at listing granularity: editing an about file without
//! adding, removing or renaming a directory keeps serving the cached record,
//! even on a forced refresh. [`ThemeIndexer::purge_cache`] forces a re-parse.

use crate::about::scan_about_file;
use crate::cache::{CacheStore, SearchPathCacheEntry, cache_key_for_root, sha256_hex};
use crate::collaborators::{AssetResolver, BaseUrlAssetResolver};
use crate::error::{Result, ThemeError};
use crate::record::{RecordContext, ThemeRecord};
use crate::search_paths::{SearchPath, SearchPaths};
use crate::theme_files::find_theme_files;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use theme_manager_config::ThemeSettings;

/// Merged, immutable view of every indexed theme, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, ThemeRecord>,
}

impl ThemeRegistry {
    pub fn new(themes: BTreeMap<String, ThemeRecord>) -> Self {
        Self { themes }
    }

    pub fn get(&self, identifier: &str) -> Option<&ThemeRecord> {
        self.themes.get(identifier)
    }

    /// Look up `identifier` ignoring ASCII case; an exact match wins.
    pub fn get_ignore_case(&self, identifier: &str) -> Option<&ThemeRecord> {
        self.themes.get(identifier).or_else(|| {
            self.themes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(identifier))
                .map(|(_, v)| v)
        })
    }

    /// The record whose `folder` equals `folder`.
    pub fn find_by_folder(&self, folder: &str) -> Option<&ThemeRecord> {
        self.themes.values().find(|r| r.folder == folder)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.themes.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ThemeRecord)> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Counters describing the work the indexer has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Registry rebuilds (memo misses and forced refreshes).
    pub refreshes: usize,
    /// Search paths whose fingerprint changed and were re-indexed.
    pub paths_reindexed: usize,
    /// Theme directories inspected while re-indexing.
    pub candidates_scanned: usize,
    /// Search paths served from the cache store.
    pub cache_hits: usize,
}

#[derive(Debug, Default)]
struct IndexCounters {
    refreshes: AtomicUsize,
    paths_reindexed: AtomicUsize,
    candidates_scanned: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl IndexCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> IndexStats {
        IndexStats {
            refreshes: self.refreshes.load(Ordering::Relaxed),
            paths_reindexed: self.paths_reindexed.load(Ordering::Relaxed),
            candidates_scanned: self.candidates_scanned.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }
}

/// Discovers themes across search paths, backed by a [`CacheStore`].
///
/// Readers of the memoized registry never block; refreshes are serialized
/// and publish a whole new registry at once.
pub struct ThemeIndexer {
    search_paths: SearchPaths,
    cache: Arc<dyn CacheStore>,
    assets: Arc<dyn AssetResolver>,
    application_root: PathBuf,
    memo: ArcSwapOption<ThemeRegistry>,
    refresh_lock: Mutex<()>,
    counters: IndexCounters,
}

impl std::fmt::Debug for ThemeIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeIndexer")
            .field("search_paths", &self.search_paths)
            .field("application_root", &self.application_root)
            .field("memoized", &self.memo.load().is_some())
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}

impl ThemeIndexer {
    pub fn new(search_paths: SearchPaths, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            search_paths,
            cache,
            assets: Arc::new(BaseUrlAssetResolver::default()),
            application_root: theme_manager_config::defaults::application_root(),
            memo: ArcSwapOption::empty(),
            refresh_lock: Mutex::new(()),
            counters: IndexCounters::default(),
        }
    }

    /// Indexer over the roots and asset settings in `settings`.
    pub fn from_settings(settings: &ThemeSettings, cache: Arc<dyn CacheStore>) -> Self {
        Self::new(SearchPaths::from_settings(settings), cache)
            .with_application_root(&settings.application_root)
            .with_asset_resolver(Arc::new(BaseUrlAssetResolver::new(
                settings.asset_base_url.clone(),
            )))
    }

    pub fn with_asset_resolver(mut self, assets: Arc<dyn AssetResolver>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_application_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.application_root = root.into();
        self
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    pub fn stats(&self) -> IndexStats {
        self.counters.snapshot()
    }

    /// All themes across every search path.
    ///
    /// Returns the memoized registry unless `force_refresh` is set or nothing
    /// has been indexed yet.
    pub fn available_themes(&self, force_refresh: bool) -> Arc<ThemeRegistry> {
        if !force_refresh && let Some(registry) = self.memo.load_full() {
            return registry;
        }

        let _guard = self.refresh_lock.lock();
        // Another caller may have refreshed while we waited.
        if !force_refresh && let Some(registry) = self.memo.load_full() {
            return registry;
        }

        IndexCounters::bump(&self.counters.refreshes);
        let mut merged = BTreeMap::new();
        for search_path in &self.search_paths {
            if let Some(themes) = self.index_search_path(search_path) {
                merged.extend(themes);
            }
        }

        log::info!(
            "Indexed {} theme(s) across {} search path(s)",
            merged.len(),
            self.search_paths.len()
        );
        let registry = Arc::new(ThemeRegistry::new(merged));
        self.memo.store(Some(Arc::clone(&registry)));
        registry
    }

    /// Record for `identifier` from the memoized registry.
    pub fn theme_info(&self, identifier: &str) -> Option<ThemeRecord> {
        self.available_themes(false).get(identifier).cloned()
    }

    /// Drop the memoized registry; the cache store is left alone.
    pub fn invalidate(&self) {
        self.memo.store(None);
    }

    /// Replace every search path's cache entry with an empty one and drop
    /// the memo, so the next call re-parses every about file.
    pub fn purge_cache(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock();
        let empty = serde_json::to_value(SearchPathCacheEntry::default())
            .map_err(std::io::Error::other)?;
        for search_path in &self.search_paths {
            self.cache
                .put(&cache_key_for_root(&search_path.root), empty.clone())?;
        }
        self.memo.store(None);
        log::info!("Purged theme cache for {} search path(s)", self.search_paths.len());
        Ok(())
    }

    /// Themes of one search path, from the cache when its listing is
    /// unchanged. `None` when the root cannot be listed.
    fn index_search_path(&self, search_path: &SearchPath) -> Option<BTreeMap<String, ThemeRecord>> {
        let root = &search_path.root;
        let key = cache_key_for_root(root);
        let cached = SearchPathCacheEntry::from_cached(self.cache.get(&key));

        let listing = match list_subdirectories(root) {
            Ok(listing) => listing,
            Err(ThemeError::NotADirectory { source: None, .. }) => {
                log::debug!(
                    "Theme search path '{}' ({}) does not exist",
                    root.display(),
                    search_path.label
                );
                return None;
            }
            Err(e) => {
                log::warn!("Skipping theme search path ({}): {}", search_path.label, e);
                return None;
            }
        };

        let fingerprint = fingerprint(&listing);
        if cached.integrity_hash.as_deref() == Some(fingerprint.as_str()) {
            IndexCounters::bump(&self.counters.cache_hits);
            log::debug!(
                "Theme cache hit for '{}' ({} theme(s))",
                root.display(),
                cached.themes.len()
            );
            return Some(cached.themes);
        }

        IndexCounters::bump(&self.counters.paths_reindexed);
        log::debug!("Re-indexing theme search path '{}'", root.display());

        let mut themes = BTreeMap::new();
        for name in listing.iter().filter(|n| !n.starts_with('.')) {
            IndexCounters::bump(&self.counters.candidates_scanned);
            match self.index_candidate(search_path, name) {
                Ok(Some(record)) => {
                    if let Some(previous) = themes.insert(record.identifier.clone(), record) {
                        log::warn!(
                            "Theme '{}' in '{}' is declared again by '{}'",
                            previous.identifier,
                            previous.theme_root.display(),
                            name
                        );
                    }
                }
                Ok(None) => {}
                Err(e) => log::warn!("Skipping theme candidate '{}': {}", name, e),
            }
        }

        let entry = SearchPathCacheEntry {
            integrity_hash: Some(fingerprint),
            themes,
        };
        match serde_json::to_value(&entry) {
            Ok(value) => {
                if let Err(e) = self.cache.put(&key, value) {
                    log::warn!("Failed to store theme cache for '{}': {}", root.display(), e);
                }
            }
            Err(e) => log::warn!("Failed to encode theme cache for '{}': {}", root.display(), e),
        }

        Some(entry.themes)
    }

    fn index_candidate(&self, search_path: &SearchPath, name: &str) -> Result<Option<ThemeRecord>> {
        let dir = search_path.root.join(name);
        let Some(files) = find_theme_files(&dir)? else {
            log::trace!("'{}' has no about file", dir.display());
            return Ok(None);
        };

        let extraction = |source| ThemeError::Extraction {
            path: files.about_file.clone(),
            source,
        };

        let Some(declaration) = scan_about_file(&files.about_file).map_err(extraction)? else {
            log::debug!(
                "'{}' carries no theme declaration",
                files.about_file.display()
            );
            return Ok(None);
        };

        let context = RecordContext {
            label: &search_path.label,
            application_root: &self.application_root,
            assets: self.assets.as_ref(),
        };
        let record = ThemeRecord::from_declaration(declaration, &files, &context).map_err(extraction)?;

        if record.folder.is_empty() {
            log::warn!(
                "Theme '{}' declares an empty folder; skipping",
                record.identifier
            );
            return Ok(None);
        }
        Ok(Some(record))
    }
}

/// Sorted names of the direct subdirectories of `root`.
fn list_subdirectories(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(ThemeError::not_a_directory(root, None));
    }
    let read_dir =
        std::fs::read_dir(root).map_err(|e| ThemeError::not_a_directory(root, Some(e)))?;

    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Hex SHA-256 of the JSON-encoded listing.
fn fingerprint(listing: &[String]) -> String {
    let encoded = serde_json::to_vec(listing).unwrap_or_default();
    sha256_hex(&encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use std::fs;
    use tempfile::TempDir;

    fn write_theme(root: &Path, folder: &str, body: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("about.php"), body).unwrap();
    }

    fn indexer_for(root: &Path) -> (Arc<MemoryCacheStore>, ThemeIndexer) {
        let cache = Arc::new(MemoryCacheStore::new());
        let indexer = ThemeIndexer::new(SearchPaths::empty().with_root(root, "core"), cache.clone())
            .with_application_root(root);
        (cache, indexer)
    }

    #[test]
    fn test_fingerprint_tracks_listing() {
        let a = fingerprint(&["a".to_string(), "b".to_string()]);
        let b = fingerprint(&["a".to_string(), "b".to_string()]);
        let c = fingerprint(&["a".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_listing_ignores_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        assert_eq!(list_subdirectories(temp.path()).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let temp = TempDir::new().unwrap();
        write_theme(temp.path(), ".git", "<?php\n$ThemeInfo['git'] = array();\n");
        write_theme(temp.path(), "foo", "<?php\n$ThemeInfo['foo'] = array();\n");

        let (_cache, indexer) = indexer_for(temp.path());
        let registry = indexer.available_themes(false);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("foo"));
        assert_eq!(indexer.stats().candidates_scanned, 1);
    }

    #[test]
    fn test_memo_is_reused() {
        let temp = TempDir::new().unwrap();
        write_theme(temp.path(), "foo", "<?php\n$ThemeInfo['foo'] = array();\n");

        let (cache, indexer) = indexer_for(temp.path());
        let first = indexer.available_themes(false);
        let second = indexer.available_themes(false);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(indexer.stats().refreshes, 1);
        assert_eq!(cache.reads(), 1);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let temp = TempDir::new().unwrap();
        let (_cache, indexer) = indexer_for(&temp.path().join("nope"));
        assert!(indexer.available_themes(true).is_empty());
        assert_eq!(indexer.stats().paths_reindexed, 0);
    }

    #[test]
    fn test_registry_case_insensitive_lookup() {
        let temp = TempDir::new().unwrap();
        write_theme(temp.path(), "big", "<?php\n$ThemeInfo['Ocean'] = array();\n");
        write_theme(temp.path(), "small", "<?php\n$ThemeInfo['ocean'] = array();\n");
        let (_cache, indexer) = indexer_for(temp.path());
        let registry = indexer.available_themes(false);

        assert_eq!(registry.get_ignore_case("ocean").unwrap().identifier, "ocean");
        assert_eq!(registry.get_ignore_case("Ocean").unwrap().identifier, "Ocean");
        assert!(registry.get_ignore_case("OCEAN").is_some());
        assert!(registry.find_by_folder("ocean").is_some());
        assert!(registry.get_ignore_case("reef").is_none());
    }
}
