//! Parsed metadata values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value read from a metadata declaration.
///
/// Association lists whose entries are all positional (`array('a', 'b')`)
/// become [`MetaValue::List`]; any explicit key turns the whole list into a
/// [`MetaValue::Map`], positional entries keyed by their decimal index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the map payload, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, MetaValue>> {
        match self {
            MetaValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Scalar rendered as text; `None` for null, lists and maps.
    pub fn to_text(&self) -> Option<String> {
        match self {
            MetaValue::String(s) => Some(s.clone()),
            MetaValue::Integer(i) => Some(i.to_string()),
            MetaValue::Float(f) => Some(f.to_string()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Null | MetaValue::List(_) | MetaValue::Map(_) => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => write!(f, "null"),
            MetaValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            MetaValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            scalar => write!(f, "{}", scalar.to_text().unwrap_or_default()),
        }
    }
}

/// Normalize a declared field name for case- and underscore-insensitive
/// matching (`AuthorEmail`, `author_email` and `authoremail` are equal).
pub fn field_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive lookup in a metadata map.
pub fn get_field<'a>(map: &'a BTreeMap<String, MetaValue>, name: &str) -> Option<&'a MetaValue> {
    let wanted = field_key(name);
    map.iter()
        .find(|(k, _)| field_key(k) == wanted)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_normalization() {
        assert_eq!(field_key("AuthorEmail"), "authoremail");
        assert_eq!(field_key("author_email"), "authoremail");
        assert_eq!(field_key("Required-Applications"), "requiredapplications");
    }

    #[test]
    fn test_get_field_is_case_insensitive() {
        let mut map = BTreeMap::new();
        map.insert("Name".to_string(), MetaValue::String("Foo".into()));
        assert_eq!(get_field(&map, "name").and_then(MetaValue::as_str), Some("Foo"));
        assert!(get_field(&map, "folder").is_none());
    }

    #[test]
    fn test_untagged_json_shape() {
        let value = MetaValue::List(vec![MetaValue::Integer(1), MetaValue::String("a".into())]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
        let back: MetaValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
