//! Typed error variants for the theme-manager-config crate.
//!
//! Provides structured error types for config I/O and validation operations.
//! Library consumers can match on specific failure modes instead of opaque
//! strings; the `theme-manager` crate wraps these in its own `ThemeError`.

use std::fmt;

/// Errors that can occur when loading, saving or reading configuration.
///
/// # Example
///
/// ```rust,no_run
/// use theme_manager_config::ConfigError;
///
/// fn report(e: &ConfigError) {
///     match e {
///         ConfigError::Io(io) => eprintln!("I/O error: {io}"),
///         ConfigError::Parse(p) => eprintln!("YAML parse error: {p}"),
///         ConfigError::Serialize(s) => eprintln!("YAML serialize error: {s}"),
///         ConfigError::Validation(msg) => eprintln!("Validation: {msg}"),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    Io(std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    Parse(serde_yaml_ng::Error),

    /// The in-memory values could not be serialized back to YAML.
    Serialize(serde_yaml_ng::Error),

    /// A value failed semantic validation.
    ///
    /// The inner string describes which key is invalid and why.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error reading config: {e}"),
            ConfigError::Parse(e) => write!(f, "YAML parse error in config: {e}"),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {e}"),
            ConfigError::Validation(msg) => write!(f, "Config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) | ConfigError::Serialize(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Parse(e)
    }
}
