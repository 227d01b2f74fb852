//! Resolved runtime settings.
//!
//! [`ThemeSettings::from_store`] reads every setting key once, applying the
//! defaults from [`crate::defaults`] for anything missing.

use crate::defaults;
use crate::keys;
use crate::search_paths::{ConfiguredSearchPath, parse_search_paths};
use crate::store::ConfigStore;
use std::path::PathBuf;

/// Settings needed to build a theme indexer and manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSettings {
    /// Root of the bundled themes.
    pub core_themes_root: PathBuf,
    /// Root of the locally installed themes.
    pub local_themes_root: PathBuf,
    /// Extra roots from `themes.search_paths`, unchecked.
    pub extra_search_paths: Vec<ConfiguredSearchPath>,
    /// Application root; screenshot URLs are built relative to it.
    pub application_root: PathBuf,
    /// Prefix for resolved asset URLs.
    pub asset_base_url: String,
    /// Directory used by the file-backed cache store.
    pub cache_directory: PathBuf,
}

impl ThemeSettings {
    /// Resolve settings from a configuration store.
    ///
    /// An invalid `themes.search_paths` value is logged and ignored rather
    /// than failing startup.
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let application_root = path_setting(store, keys::APPLICATION_ROOT)
            .unwrap_or_else(defaults::application_root);
        let core_themes_root = path_setting(store, keys::CORE_THEMES_ROOT)
            .unwrap_or_else(|| defaults::core_themes_root(&application_root));
        let local_themes_root = path_setting(store, keys::LOCAL_THEMES_ROOT)
            .unwrap_or_else(defaults::local_themes_root);
        let cache_directory = path_setting(store, keys::CACHE_DIRECTORY)
            .unwrap_or_else(defaults::cache_directory);
        let asset_base_url = store.get_string(keys::ASSET_BASE_URL, &defaults::asset_base_url());

        let extra_search_paths = match store.get(keys::SEARCH_PATHS) {
            None => Vec::new(),
            Some(value) => match parse_search_paths(&value) {
                Ok(paths) => paths,
                Err(e) => {
                    log::warn!("Ignoring invalid {}: {}", keys::SEARCH_PATHS, e);
                    Vec::new()
                }
            },
        };

        Self {
            core_themes_root,
            local_themes_root,
            extra_search_paths,
            application_root,
            asset_base_url,
            cache_directory,
        }
    }
}

fn path_setting(store: &dyn ConfigStore, key: &str) -> Option<PathBuf> {
    let raw = store.get_string(key, "");
    if raw.is_empty() {
        None
    } else {
        Some(expand_home(&raw))
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
