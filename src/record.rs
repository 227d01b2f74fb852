//! Theme records built from parsed declarations.
//!
//! A [`ThemeRecord`] is what the indexer caches and the manager consumes.
//! Well-known fields are lifted out of the declaration (field names match
//! case-insensitively); everything else is carried in `extra` untouched.
//! Options are normalized here so readers never deal with the positional
//! shorthand of the declaration format.

use crate::about::{Declaration, ExtractError, MetaValue, field_key};
use crate::collaborators::AssetResolver;
use crate::hooks::{self, HookCapabilities};
use crate::theme_files::ThemeFileSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything known about one installed theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRecord {
    /// Key of the declaration; the registry is keyed by it.
    pub identifier: String,
    pub name: String,
    /// Folder persisted as the enabled theme.
    pub folder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub about_file: PathBuf,
    pub real_about_file: PathBuf,
    /// Directory containing the about file.
    pub theme_root: PathBuf,
    /// Label of the search path the theme was found in.
    #[serde(default)]
    pub origin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_hooks_file: Option<PathBuf>,
    #[serde(default)]
    pub hooks: HookCapabilities,

    /// Application name → version constraint (empty when unconstrained).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_applications: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ThemeOptions>,

    /// Declared fields with no dedicated slot.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetaValue>,
}

/// Style and text variants a theme offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeOptions {
    #[serde(default)]
    pub styles: BTreeMap<String, StyleOption>,
    #[serde(default)]
    pub text: BTreeMap<String, TextOption>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetaValue>,
}

/// One style variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOption {
    /// CSS basename pattern, e.g. `%s_night`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basename: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetaValue>,
}

/// One customizable text slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOption {
    /// Input kind, e.g. `textbox`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetaValue>,
}

/// Where a declaration was found and how to resolve its assets.
pub struct RecordContext<'a> {
    /// Label of that search root.
    pub label: &'a str,
    /// Root that screenshot paths are made relative to.
    pub application_root: &'a Path,
    pub assets: &'a dyn AssetResolver,
}

impl ThemeRecord {
    /// Build a record from a declaration and the files found beside it.
    ///
    /// The theme directory itself may be a symlink into another location.
    /// Fails with [`ExtractError::OutsideRoot`] when the about file resolves
    /// (through its own symlink) outside the resolved theme directory.
    pub fn from_declaration(
        declaration: Declaration,
        files: &ThemeFileSet,
        context: &RecordContext<'_>,
    ) -> Result<Self, ExtractError> {
        let real_about_file = files.about_file.canonicalize()?;
        let theme_dir = files.about_file.parent().unwrap_or_else(|| Path::new("."));
        let real_root = theme_dir.canonicalize()?;
        if !real_about_file.starts_with(&real_root) {
            return Err(ExtractError::OutsideRoot {
                resolved: real_about_file.display().to_string(),
                root: real_root.display().to_string(),
            });
        }

        let Declaration { identifier, fields } = declaration;
        let mut record = ThemeRecord {
            name: identifier.clone(),
            folder: identifier.clone(),
            identifier,
            description: None,
            version: None,
            author: None,
            author_email: None,
            author_url: None,
            url: None,
            theme_root: files
                .about_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            about_file: files.about_file.clone(),
            real_about_file,
            origin: context.label.to_string(),
            screenshot_url: None,
            hooks_file: None,
            real_hooks_file: None,
            hooks: HookCapabilities::default(),
            required_applications: None,
            options: None,
            extra: BTreeMap::new(),
        };

        for (key, value) in fields {
            record.absorb_field(key, value);
        }

        if let Some(screenshot) = &files.screenshot_file {
            let relative = screenshot
                .strip_prefix(context.application_root)
                .unwrap_or(screenshot);
            let relative = relative.to_string_lossy();
            record.screenshot_url = Some(context.assets.asset_url(relative.trim_start_matches('/')));
        }

        if let Some(hooks_file) = &files.hooks_file {
            record.real_hooks_file = hooks_file.canonicalize().ok();
            record.hooks = hooks::detect_capabilities_in_file(hooks_file);
            record.hooks_file = Some(hooks_file.clone());
        }

        Ok(record)
    }

    fn absorb_field(&mut self, key: String, value: MetaValue) {
        let text = || value.to_text().filter(|s| !s.is_empty());
        match field_key(&key).as_str() {
            "name" => {
                if let Some(name) = text() {
                    self.name = name;
                }
            }
            "folder" => {
                // An explicitly empty folder is kept so enabling can reject it.
                self.folder = value.to_text().unwrap_or_default();
            }
            "description" => self.description = text(),
            "version" => self.version = text(),
            "author" => self.author = text(),
            "authoremail" => self.author_email = text(),
            "authorurl" => self.author_url = text(),
            "url" => self.url = text(),
            "requiredapplications" => {
                self.required_applications = required_applications(&self.identifier, value)
            }
            "options" => self.options = Some(ThemeOptions::from_value(&self.identifier, value)),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Whether the theme declares style or text options.
    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }
}

fn required_applications(theme: &str, value: MetaValue) -> Option<BTreeMap<String, String>> {
    match value {
        MetaValue::Map(map) => Some(
            map.into_iter()
                .map(|(app, constraint)| (app, constraint.to_text().unwrap_or_default()))
                .collect(),
        ),
        MetaValue::List(items) => Some(
            items
                .into_iter()
                .filter_map(|item| item.to_text())
                .map(|app| (app, String::new()))
                .collect(),
        ),
        MetaValue::Null => None,
        other => {
            log::warn!("Theme '{theme}' has malformed RequiredApplications: {other}");
            None
        }
    }
}

impl ThemeOptions {
    fn from_value(theme: &str, value: MetaValue) -> Self {
        let mut options = ThemeOptions::default();
        let map = match value {
            MetaValue::Map(map) => map,
            MetaValue::List(items) if items.is_empty() => return options,
            other => {
                log::warn!("Theme '{theme}' has malformed Options: {other}");
                return options;
            }
        };

        for (key, value) in map {
            match field_key(&key).as_str() {
                "styles" => {
                    options.styles = entries(value)
                        .map(|(k, v)| (k, StyleOption::from_value(v)))
                        .collect();
                }
                "text" => {
                    options.text = entries(value)
                        .map(|(k, v)| (k, TextOption::from_value(v)))
                        .collect();
                }
                _ => {
                    options.extra.insert(key, value);
                }
            }
        }
        options
    }
}

/// Keyed entries of a map, or index-keyed entries of a list.
fn entries(value: MetaValue) -> Box<dyn Iterator<Item = (String, MetaValue)>> {
    match value {
        MetaValue::Map(map) => Box::new(map.into_iter()),
        MetaValue::List(items) => Box::new(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v)),
        ),
        _ => Box::new(std::iter::empty()),
    }
}

/// Split an option entry into its primary value and remaining fields.
///
/// Accepts a bare scalar, a list whose first item is the primary value, or a
/// map holding it under `primary` or the positional key `0`.
fn split_primary(value: MetaValue, primary: &str) -> (Option<String>, BTreeMap<String, MetaValue>) {
    match value {
        MetaValue::Map(mut map) => {
            let named = map
                .keys()
                .find(|k| field_key(k) == primary)
                .cloned()
                .and_then(|k| map.remove(&k));
            let positional = map.remove("0");
            let head = named.or(positional).and_then(|v| v.to_text());
            (head, map)
        }
        MetaValue::List(items) => {
            let mut items = items.into_iter();
            let head = items.next().and_then(|v| v.to_text());
            let rest = items
                .enumerate()
                .map(|(i, v)| ((i + 1).to_string(), v))
                .collect();
            (head, rest)
        }
        scalar => (scalar.to_text(), BTreeMap::new()),
    }
}

impl StyleOption {
    fn from_value(value: MetaValue) -> Self {
        let (basename, extra) = split_primary(value, "basename");
        Self { basename, extra }
    }
}

impl TextOption {
    fn from_value(value: MetaValue) -> Self {
        let (kind, extra) = split_primary(value, "type");
        Self { kind, extra }
    }
}
