//! Default values for settings that are not present in the store.

use std::path::PathBuf;

// ── Roots ──────────────────────────────────────────────────────────────────

pub fn application_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn core_themes_root(application_root: &std::path::Path) -> PathBuf {
    application_root.join("themes")
}

pub fn local_themes_root() -> PathBuf {
    crate::persistence::config_dir().join("themes")
}

// ── Assets & cache ─────────────────────────────────────────────────────────

pub fn asset_base_url() -> String {
    "/".to_string()
}

pub fn cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("theme-manager")
}
