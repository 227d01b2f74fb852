//! YAML-file-backed configuration store.
//!
//! Covers:
//! - `open` / `open_default` (load from YAML, missing file = empty store)
//! - Atomic saves (write to a temp file, then rename)
//! - XDG-compliant path helpers (`config_path`, `config_dir`)

use crate::error::ConfigError;
use crate::store::{ConfigEdit, ConfigStore, ConfigValue};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration store persisted as a flat YAML mapping of dotted keys.
///
/// Values are loaded once on open and written back on every
/// [`ConfigStore::apply`].
#[derive(Debug)]
pub struct YamlConfigStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, ConfigValue>>,
}

impl YamlConfigStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = Self::read_values(&path)?;
        log::info!(
            "Loaded {} config value(s) from {:?}",
            values.len(),
            path
        );
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Open the store at the default location (see [`config_path`]).
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(config_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file, discarding in-memory values.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let values = Self::read_values(&self.path)?;
        *self.values.write() = values;
        Ok(())
    }

    fn read_values(path: &Path) -> Result<BTreeMap<String, ConfigValue>, ConfigError> {
        if !path.exists() {
            log::info!("Config file not found, starting empty: {:?}", path);
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_yaml_ng::from_str::<ConfigValue>(&contents)? {
            ConfigValue::Null => Ok(BTreeMap::new()),
            ConfigValue::Mapping(mapping) => {
                let mut values = BTreeMap::new();
                for (key, value) in mapping {
                    match key {
                        ConfigValue::String(key) => {
                            values.insert(key, value);
                        }
                        other => {
                            return Err(ConfigError::Validation(format!(
                                "config keys must be strings, found {other:?} in {}",
                                path.display()
                            )));
                        }
                    }
                }
                Ok(values)
            }
            _ => Err(ConfigError::Validation(format!(
                "config file {} must contain a mapping at the top level",
                path.display()
            ))),
        }
    }

    /// Atomic save: write to temp file then rename to prevent corruption on crash.
    fn write_values(&self, values: &BTreeMap<String, ConfigValue>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(values).map_err(ConfigError::Serialize)?;

        let temp_path = self.path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl ConfigStore for YamlConfigStore {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.read().get(key).cloned()
    }

    fn apply(&self, edits: &[ConfigEdit]) -> Result<(), ConfigError> {
        let mut values = self.values.write();
        let mut updated = values.clone();
        for edit in edits {
            edit.apply_to(&mut updated);
        }

        // Memory only changes once the file write went through.
        self.write_values(&updated)?;
        *values = updated;
        log::debug!("Saved {} config edit(s) to {:?}", edits.len(), self.path);
        Ok(())
    }
}

/// Get the configuration file path (using XDG convention)
pub fn config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the configuration directory path (using XDG convention)
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("theme-manager")
        } else {
            PathBuf::from(".")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("theme-manager")
        } else {
            PathBuf::from(".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = YamlConfigStore::open(temp.path().join("config.yaml")).unwrap();
        assert!(store.get("themes.enabled").is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_apply_persists_and_reloads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let store = YamlConfigStore::open(&path).unwrap();
        store
            .apply(&[
                ConfigEdit::set_str("themes.enabled", "ocean"),
                ConfigEdit::set_str("themes.options_name", "Ocean"),
            ])
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());

        let reopened = YamlConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get_string("themes.enabled", "default"), "ocean");
        assert_eq!(reopened.get_string("themes.options_name", ""), "Ocean");

        reopened.remove("themes.options_name").unwrap();
        store.reload().unwrap();
        assert!(store.get("themes.options_name").is_none());
    }

    #[test]
    fn test_rejects_non_mapping_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "- just\n- a\n- list\n").unwrap();

        let err = YamlConfigStore::open(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "themes.enabled: [unclosed\n").unwrap();

        let err = YamlConfigStore::open(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
