//! Locating the well-known files inside a theme directory.

use crate::error::{Result, ThemeError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// The files that make a directory a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeFileSet {
    /// Metadata file (`about.php` or `<name>.theme.php`).
    pub about_file: PathBuf,
    /// Lifecycle hooks file (`class.<name>themehooks.php`).
    pub hooks_file: Option<PathBuf>,
    /// Preview image (`screenshot.{gif,jpg,jpeg,png}`).
    pub screenshot_file: Option<PathBuf>,
}

static ABOUT_RE: OnceLock<Regex> = OnceLock::new();
static HOOKS_RE: OnceLock<Regex> = OnceLock::new();
static SCREENSHOT_RE: OnceLock<Regex> = OnceLock::new();

fn about_re() -> &'static Regex {
    ABOUT_RE.get_or_init(|| {
        Regex::new(r"^(?:about|.+\.theme)\.php$").expect("Failed to compile about file regex")
    })
}

fn hooks_re() -> &'static Regex {
    HOOKS_RE.get_or_init(|| {
        Regex::new(r"^class\..*themehooks\.php$").expect("Failed to compile hooks file regex")
    })
}

fn screenshot_re() -> &'static Regex {
    SCREENSHOT_RE.get_or_init(|| {
        Regex::new(r"^screenshot\.(?:gif|jpg|jpeg|png)$")
            .expect("Failed to compile screenshot regex")
    })
}

/// Match the entries of `dir` against the theme file patterns.
///
/// Only direct entries are considered, in name order; when several entries
/// match the same pattern the last one wins. Returns `Ok(None)` when the
/// directory has no about file.
pub fn find_theme_files(dir: &Path) -> Result<Option<ThemeFileSet>> {
    let read_dir =
        std::fs::read_dir(dir).map_err(|e| ThemeError::not_a_directory(dir, Some(e)))?;

    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    let mut about = None;
    let mut hooks = None;
    let mut screenshot = None;

    for name in &names {
        if about_re().is_match(name) {
            about = Some(name);
        } else if hooks_re().is_match(name) {
            hooks = Some(name);
        } else if screenshot_re().is_match(name) {
            screenshot = Some(name);
        }
    }

    let Some(about) = about else {
        return Ok(None);
    };

    Ok(Some(ThemeFileSet {
        about_file: dir.join(about),
        hooks_file: hooks.map(|h| dir.join(h)),
        screenshot_file: screenshot.map(|s| dir.join(s)),
    }))
}
