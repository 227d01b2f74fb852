//! Theme lifecycle hooks.
//!
//! A theme may ship a hooks file (`class.<name>themehooks.php`). Its code is
//! never loaded by this crate: the indexer only records which lifecycle
//! capabilities the file declares, and the manager asks a [`HookLoader`] for
//! a [`ThemeHooks`] implementation when it needs to run them.

use crate::record::ThemeRecord;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Lifecycle callbacks a theme can provide.
///
/// Both operations default to doing nothing so implementors only override
/// what they declare.
pub trait ThemeHooks: Send + Sync {
    /// Runs while the theme is being enabled, before the selection is saved.
    fn setup(&self) -> Result<(), String> {
        Ok(())
    }

    /// Runs on the previously enabled theme when another one is enabled.
    fn on_disable(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Turns a theme's hooks file into a callable [`ThemeHooks`] object.
///
/// This is the plugin-loading seam; embedders decide how theme code is
/// provided (statically linked, scripted, ...).
pub trait HookLoader: Send + Sync {
    /// Load the hooks for `theme`, or `None` if none are available.
    fn load(&self, theme: &ThemeRecord) -> Option<Arc<dyn ThemeHooks>>;
}

/// Loader that never provides hooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl HookLoader for NoHooks {
    fn load(&self, _theme: &ThemeRecord) -> Option<Arc<dyn ThemeHooks>> {
        None
    }
}

/// Loader backed by hooks registered per theme folder.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<HashMap<String, Arc<dyn ThemeHooks>>>,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("folders", &self.hooks.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hooks` for the theme living in `folder`.
    pub fn register(&self, folder: impl Into<String>, hooks: Arc<dyn ThemeHooks>) {
        self.hooks.write().insert(folder.into(), hooks);
    }
}

impl HookLoader for HookRegistry {
    fn load(&self, theme: &ThemeRecord) -> Option<Arc<dyn ThemeHooks>> {
        self.hooks.read().get(&theme.folder).cloned()
    }
}

/// Lifecycle operations a hooks file declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCapabilities {
    pub setup: bool,
    pub on_disable: bool,
}

impl HookCapabilities {
    pub fn any(&self) -> bool {
        self.setup || self.on_disable
    }
}

static SETUP_RE: OnceLock<Regex> = OnceLock::new();
static ON_DISABLE_RE: OnceLock<Regex> = OnceLock::new();

fn setup_re() -> &'static Regex {
    SETUP_RE.get_or_init(|| {
        Regex::new(r"(?i)\bfunction\s+setup\s*\(").expect("Failed to compile setup hook regex")
    })
}

fn on_disable_re() -> &'static Regex {
    ON_DISABLE_RE.get_or_init(|| {
        Regex::new(r"(?i)\bfunction\s+on_?disable\s*\(")
            .expect("Failed to compile on-disable hook regex")
    })
}

/// Detect declared capabilities from hooks source text.
pub fn detect_capabilities(source: &str) -> HookCapabilities {
    HookCapabilities {
        setup: setup_re().is_match(source),
        on_disable: on_disable_re().is_match(source),
    }
}

/// Read a hooks file and detect its capabilities.
///
/// An unreadable file declares nothing.
pub fn detect_capabilities_in_file(path: &Path) -> HookCapabilities {
    match std::fs::read(path) {
        Ok(bytes) => detect_capabilities(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            log::warn!("Failed to read hooks file '{}': {}", path.display(), e);
            HookCapabilities::default()
        }
    }
}
