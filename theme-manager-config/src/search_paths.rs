//! Parsing of the extra theme search path setting.
//!
//! The `themes.search_paths` key accepts three shapes:
//!
//! ```yaml
//! themes.search_paths: /srv/themes            # single path, label "alternate"
//! themes.search_paths: [/srv/a, /srv/b]       # list, each labelled "alternate"
//! themes.search_paths:                        # map of path → label
//!   /srv/vendor: vendor
//! ```

use crate::error::ConfigError;
use crate::store::ConfigValue;
use std::path::PathBuf;

/// Label given to configured roots that do not name one.
pub const ALTERNATE_LABEL: &str = "alternate";

/// One configured search root and its origin label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredSearchPath {
    pub root: PathBuf,
    pub label: String,
}

/// Parse a `themes.search_paths` value.
///
/// `Null` means "no extra roots". Existence of the roots is not checked here.
pub fn parse_search_paths(value: &ConfigValue) -> Result<Vec<ConfiguredSearchPath>, ConfigError> {
    match value {
        ConfigValue::Null => Ok(Vec::new()),
        ConfigValue::String(path) => Ok(vec![alternate(path)]),
        ConfigValue::Sequence(items) => items
            .iter()
            .map(|item| match item {
                ConfigValue::String(path) => Ok(alternate(path)),
                other => Err(ConfigError::Validation(format!(
                    "search path entries must be strings, found {other:?}"
                ))),
            })
            .collect(),
        ConfigValue::Mapping(mapping) => mapping
            .iter()
            .map(|(path, label)| match (path, label) {
                (ConfigValue::String(path), ConfigValue::String(label)) => {
                    Ok(ConfiguredSearchPath {
                        root: crate::settings::expand_home(path),
                        label: label.clone(),
                    })
                }
                (ConfigValue::String(path), ConfigValue::Null) => Ok(alternate(path)),
                _ => Err(ConfigError::Validation(format!(
                    "search path map entries must be path: label strings, found {path:?}: {label:?}"
                ))),
            })
            .collect(),
        other => Err(ConfigError::Validation(format!(
            "themes.search_paths must be a path, a list or a map, found {other:?}"
        ))),
    }
}

fn alternate(path: &str) -> ConfiguredSearchPath {
    ConfiguredSearchPath {
        root: crate::settings::expand_home(path),
        label: ALTERNATE_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> ConfigValue {
        serde_yaml_ng::from_str(s).unwrap()
    }

    #[test]
    fn test_single_path() {
        let paths = parse_search_paths(&yaml("/srv/themes")).unwrap();
        assert_eq!(
            paths,
            vec![ConfiguredSearchPath {
                root: PathBuf::from("/srv/themes"),
                label: "alternate".to_string(),
            }]
        );
    }

    #[test]
    fn test_list_of_paths() {
        let paths = parse_search_paths(&yaml("[/srv/a, /srv/b]")).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].root, PathBuf::from("/srv/b"));
        assert!(paths.iter().all(|p| p.label == ALTERNATE_LABEL));
    }

    #[test]
    fn test_map_keeps_order_and_labels() {
        let paths = parse_search_paths(&yaml("/srv/vendor: vendor\n/srv/site: site\n")).unwrap();
        assert_eq!(paths[0].label, "vendor");
        assert_eq!(paths[1].root, PathBuf::from("/srv/site"));
        assert_eq!(paths[1].label, "site");
    }

    #[test]
    fn test_null_is_empty() {
        assert!(parse_search_paths(&ConfigValue::Null).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_numbers() {
        assert!(parse_search_paths(&yaml("42")).is_err());
        assert!(parse_search_paths(&yaml("[/srv/a, 7]")).is_err());
    }
}
