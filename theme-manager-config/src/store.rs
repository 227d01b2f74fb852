//! Key/value configuration store abstraction.
//!
//! The theme manager only ever needs `get`, `set` and `remove` on flat
//! dotted keys. Writes go through [`ConfigStore::apply`] so a group of edits
//! either lands completely or not at all.

use crate::error::ConfigError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Value type held by a configuration store.
pub type ConfigValue = serde_yaml_ng::Value;

/// A single pending change to a configuration store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEdit {
    /// Set `key` to the given value, replacing any previous value.
    Set(String, ConfigValue),
    /// Remove `key`; removing a missing key is not an error.
    Remove(String),
}

impl ConfigEdit {
    /// Convenience constructor for a string-valued `Set`.
    pub fn set_str(key: &str, value: &str) -> Self {
        ConfigEdit::Set(key.to_string(), ConfigValue::String(value.to_string()))
    }

    /// Convenience constructor for `Remove`.
    pub fn remove(key: &str) -> Self {
        ConfigEdit::Remove(key.to_string())
    }

    /// Apply this edit to an in-memory map.
    pub(crate) fn apply_to(&self, values: &mut BTreeMap<String, ConfigValue>) {
        match self {
            ConfigEdit::Set(key, value) => {
                values.insert(key.clone(), value.clone());
            }
            ConfigEdit::Remove(key) => {
                values.remove(key);
            }
        }
    }
}

/// Persistent key/value configuration.
///
/// Implementations use interior mutability so a store can be shared between
/// threads behind an `Arc`.
pub trait ConfigStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// Apply all `edits` as one unit.
    ///
    /// On error none of the edits may be visible to later reads.
    fn apply(&self, edits: &[ConfigEdit]) -> Result<(), ConfigError>;

    /// Set a single key.
    fn set(&self, key: &str, value: ConfigValue) -> Result<(), ConfigError> {
        self.apply(&[ConfigEdit::Set(key.to_string(), value)])
    }

    /// Remove a single key.
    fn remove(&self, key: &str) -> Result<(), ConfigError> {
        self.apply(&[ConfigEdit::remove(key)])
    }

    /// Read `key` as a string, falling back to `default` when the key is
    /// missing, empty, or not a scalar.
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(ConfigValue::String(s)) if !s.is_empty() => s,
            Some(ConfigValue::Number(n)) => n.to_string(),
            Some(ConfigValue::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Volatile configuration store, used by tests and embedders that persist
/// configuration elsewhere.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, ConfigValue>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with string values.
    pub fn with_strings<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), ConfigValue::String(v.to_string())))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Copy of every stored value.
    pub fn snapshot(&self) -> BTreeMap<String, ConfigValue> {
        self.values.read().clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.read().get(key).cloned()
    }

    fn apply(&self, edits: &[ConfigEdit]) -> Result<(), ConfigError> {
        let mut values = self.values.write();
        for edit in edits {
            edit.apply_to(&mut values);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_string_defaults() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get_string("missing", "default"), "default");

        store.set("empty", ConfigValue::String(String::new())).unwrap();
        assert_eq!(store.get_string("empty", "default"), "default");

        store
            .set("seq", ConfigValue::Sequence(vec![ConfigValue::Null]))
            .unwrap();
        assert_eq!(store.get_string("seq", "fallback"), "fallback");
    }

    #[test]
    fn test_apply_batch() {
        let store = MemoryConfigStore::with_strings([("a", "1"), ("b", "2")]);
        store
            .apply(&[ConfigEdit::set_str("a", "10"), ConfigEdit::remove("b")])
            .unwrap();

        assert_eq!(store.get_string("a", ""), "10");
        assert!(store.get("b").is_none());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = MemoryConfigStore::new();
        assert!(store.remove("never-set").is_ok());
    }
}
