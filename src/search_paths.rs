//! Ordered registry of the filesystem roots scanned for themes.
//!
//! Roots are registered core first, then local, then any configured extras.
//! When two roots provide a theme with the same identifier, the root
//! registered later wins.

use std::path::PathBuf;
use theme_manager_config::{ConfiguredSearchPath, ThemeSettings};

/// Label of the bundled themes root.
pub const CORE_LABEL: &str = "core";
/// Label of the locally installed themes root.
pub const LOCAL_LABEL: &str = "local";

/// A root directory and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SearchPath {
    pub root: PathBuf,
    pub label: String,
}

/// Immutable, ordered list of search roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    paths: Vec<SearchPath>,
}

impl SearchPaths {
    /// Registry holding the built-in core and local roots.
    pub fn new(core_root: impl Into<PathBuf>, local_root: impl Into<PathBuf>) -> Self {
        let mut paths = Self::default();
        paths.register(core_root.into(), CORE_LABEL);
        paths.register(local_root.into(), LOCAL_LABEL);
        paths
    }

    /// Registry with no roots at all; callers add them with [`Self::with_root`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the registry from resolved settings.
    pub fn from_settings(settings: &ThemeSettings) -> Self {
        Self::new(&settings.core_themes_root, &settings.local_themes_root)
            .with_configured(&settings.extra_search_paths)
    }

    /// Append configured roots. Roots that are not directories are skipped.
    pub fn with_configured(mut self, configured: &[ConfiguredSearchPath]) -> Self {
        for entry in configured {
            if !entry.root.is_dir() {
                log::debug!(
                    "Skipping theme search path '{}' ({}): not a directory",
                    entry.root.display(),
                    entry.label
                );
                continue;
            }
            self.register(entry.root.clone(), &entry.label);
        }
        self
    }

    /// Append a single root without checking it exists.
    pub fn with_root(mut self, root: impl Into<PathBuf>, label: &str) -> Self {
        self.register(root.into(), label);
        self
    }

    fn register(&mut self, root: PathBuf, label: &str) {
        let root = trim_trailing_separators(root);
        if let Some(existing) = self.paths.iter_mut().find(|p| p.root == root) {
            existing.label = label.to_string();
            return;
        }
        self.paths.push(SearchPath {
            root,
            label: label.to_string(),
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchPaths {
    type Item = &'a SearchPath;
    type IntoIter = std::slice::Iter<'a, SearchPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

fn trim_trailing_separators(root: PathBuf) -> PathBuf {
    let text = root.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() || trimmed.len() == text.len() {
        return root;
    }
    PathBuf::from(trimmed)
}
