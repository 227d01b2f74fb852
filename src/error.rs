//! Typed error types for theme-manager.
//!
//! Indexing errors (`NotADirectory`, `Extraction`) are logged and swallowed by
//! the indexer so one broken theme never hides the others. State-machine
//! errors (`InvalidTheme`, `UnmetRequirement`, `CannotDisableDefault`, `Hook`)
//! are always returned to the caller.

use crate::about::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for theme discovery and selection.
#[derive(Debug, Error)]
pub enum ThemeError {
    // -----------------------------------------------------------------------
    // Indexing
    // -----------------------------------------------------------------------
    /// A search root or theme candidate is missing or cannot be listed.
    #[error("Not a readable directory: {path}")]
    NotADirectory {
        /// Directory that could not be read.
        path: PathBuf,
        /// Underlying I/O error, if the directory exists but listing failed.
        #[source]
        source: Option<std::io::Error>,
    },

    /// An about file could not be turned into a theme record.
    #[error("Failed to extract theme metadata from '{path}': {source}")]
    Extraction {
        /// About file that failed.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: ExtractError,
    },

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------
    /// The theme is unknown or its folder resolved to an empty string.
    #[error("The theme folder was not properly defined for '{0}'")]
    InvalidTheme(String),

    /// The theme requires applications that are not enabled.
    #[error("Theme '{theme}' requires {kind}(s) that are not enabled: {}", .missing.join(", "))]
    UnmetRequirement {
        /// Identifier of the theme being checked.
        theme: String,
        /// Kind of requirement ("application").
        kind: String,
        /// Required identifiers that are missing, with their constraints.
        missing: Vec<String>,
    },

    /// Disabling was requested while the default theme is active.
    #[error("You cannot disable the default theme")]
    CannotDisableDefault,

    /// A theme's setup or on-disable hook failed.
    #[error("Theme hook '{hook}' failed for '{theme}': {message}")]
    Hook {
        /// Theme folder the hook belongs to.
        theme: String,
        /// `setup` or `on_disable`.
        hook: &'static str,
        /// Message reported by the hook.
        message: String,
    },

    // -----------------------------------------------------------------------
    // Ambient
    // -----------------------------------------------------------------------
    /// Persisting the selection failed.
    #[error("Configuration error: {0}")]
    Config(#[from] theme_manager_config::ConfigError),

    /// Filesystem error outside of indexing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThemeError {
    /// Build a `NotADirectory` error for `path`.
    pub fn not_a_directory(path: impl Into<PathBuf>, source: Option<std::io::Error>) -> Self {
        ThemeError::NotADirectory {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ThemeError>;
