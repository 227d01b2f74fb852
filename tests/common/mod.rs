//! Shared integration test helpers for theme-manager.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{TestContext, about_source};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per test file.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use theme_manager::{
    MemoryCacheStore, SearchPaths, ThemeHooks, ThemeIndexer, ThemeManager,
};
use theme_manager_config::MemoryConfigStore;

/// Minimal about file declaring `identifier` with a display name.
pub fn about_source(identifier: &str, name: &str) -> String {
    format!("<?php if (!defined('APPLICATION')) exit();\n\n$ThemeInfo['{identifier}'] = array(\n   'Name' => '{name}',\n);\n")
}

/// Write `about.php` with `body` into `root/folder`, creating directories.
pub fn write_about(root: &Path, folder: &str, body: &str) -> PathBuf {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).expect("Failed to create theme dir");
    fs::write(dir.join("about.php"), body).expect("Failed to write about file");
    dir
}

/// Write a hooks file declaring the requested capabilities.
pub fn write_hooks(root: &Path, folder: &str, setup: bool, on_disable: bool) {
    let mut body = format!("<?php\nclass {folder}ThemeHooks implements Gdn_IPlugin {{\n");
    if setup {
        body.push_str("   public function Setup() {}\n");
    }
    if on_disable {
        body.push_str("   public function OnDisable() {}\n");
    }
    body.push_str("}\n");
    let file = format!("class.{}themehooks.php", folder.to_lowercase());
    fs::write(root.join(folder).join(file), body).expect("Failed to write hooks file");
}

/// Temporary core and local roots with in-memory config and cache stores.
///
/// The layout created:
/// ```text
/// <tmp>/
///   app/themes/   # core root
///   local/        # local root
/// ```
pub struct TestContext {
    pub temp: TempDir,
    pub core: PathBuf,
    pub local: PathBuf,
    pub cache: Arc<MemoryCacheStore>,
    pub config: Arc<MemoryConfigStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let core = temp.path().join("app").join("themes");
        let local = temp.path().join("local");
        fs::create_dir_all(&core).expect("Failed to create core root");
        fs::create_dir_all(&local).expect("Failed to create local root");
        Self {
            temp,
            core,
            local,
            cache: Arc::new(MemoryCacheStore::new()),
            config: Arc::new(MemoryConfigStore::new()),
        }
    }

    pub fn search_paths(&self) -> SearchPaths {
        SearchPaths::new(&self.core, &self.local)
    }

    pub fn indexer(&self) -> ThemeIndexer {
        ThemeIndexer::new(self.search_paths(), self.cache.clone())
            .with_application_root(self.temp.path().join("app"))
    }

    pub fn manager(&self) -> ThemeManager {
        ThemeManager::new(Arc::new(self.indexer()), self.config.clone())
    }
}

/// Hooks that record every call into a shared log.
pub struct RecordingHooks {
    pub theme: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_setup: bool,
}

impl RecordingHooks {
    pub fn new(theme: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            theme: theme.to_string(),
            calls,
            fail_setup: false,
        }
    }

    pub fn failing(theme: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            fail_setup: true,
            ..Self::new(theme, calls)
        }
    }
}

impl ThemeHooks for RecordingHooks {
    fn setup(&self) -> Result<(), String> {
        self.calls.lock().push(format!("{}:setup", self.theme));
        if self.fail_setup {
            Err("database is read-only".to_string())
        } else {
            Ok(())
        }
    }

    fn on_disable(&self) -> Result<(), String> {
        self.calls.lock().push(format!("{}:on_disable", self.theme));
        Ok(())
    }
}
