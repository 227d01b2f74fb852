//! Configuration system for theme-manager.
//!
//! This crate provides the key/value configuration store the theme manager
//! persists its selection in, plus the settings it is started with:
//!
//! - `ConfigStore` trait with in-memory and YAML-file implementations
//! - Configuration key names and defaults
//! - Parsing of configured extra theme search paths
//! - Resolved runtime settings (`ThemeSettings`)

pub mod defaults;
pub mod error;
pub mod keys;
pub mod persistence;
pub mod search_paths;
pub mod settings;
pub mod store;

pub use error::ConfigError;
pub use persistence::{YamlConfigStore, config_dir, config_path};
pub use search_paths::{ALTERNATE_LABEL, ConfiguredSearchPath, parse_search_paths};
pub use settings::{ThemeSettings, expand_home};
pub use store::{ConfigEdit, ConfigStore, ConfigValue, MemoryConfigStore};
