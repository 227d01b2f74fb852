//! Services the theme manager consumes but does not own.
//!
//! Each concern is a small trait with a straightforward implementation so the
//! crate works on its own; embedders swap in their own implementations.

use crate::error::{Result, ThemeError};
use std::collections::BTreeMap;
use std::sync::Arc;
use theme_manager_config::{ConfigStore, ConfigValue, keys};

// ── Applications ───────────────────────────────────────────────────────────

/// Reports which applications are currently enabled.
pub trait ApplicationRegistry: Send + Sync {
    fn enabled_applications(&self) -> Vec<String>;
}

/// A fixed list of enabled applications.
#[derive(Debug, Clone, Default)]
pub struct StaticApplications(Vec<String>);

impl StaticApplications {
    pub fn new<S: Into<String>>(applications: impl IntoIterator<Item = S>) -> Self {
        Self(applications.into_iter().map(Into::into).collect())
    }
}

impl ApplicationRegistry for StaticApplications {
    fn enabled_applications(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Reads the enabled applications from the `applications.enabled` key.
///
/// The key may hold a list of names or a map whose keys are names.
pub struct ConfiguredApplications {
    store: Arc<dyn ConfigStore>,
}

impl ConfiguredApplications {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }
}

impl ApplicationRegistry for ConfiguredApplications {
    fn enabled_applications(&self) -> Vec<String> {
        match self.store.get(keys::ENABLED_APPLICATIONS) {
            Some(ConfigValue::Sequence(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(ConfigValue::Mapping(map)) => map
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            Some(ConfigValue::String(name)) if !name.is_empty() => vec![name],
            _ => Vec::new(),
        }
    }
}

// ── Requirements ───────────────────────────────────────────────────────────

/// Validates that a theme's declared requirements are satisfied.
pub trait RequirementChecker: Send + Sync {
    /// Fails with [`ThemeError::UnmetRequirement`] when any entry of
    /// `required` is not in `enabled`.
    fn check(
        &self,
        theme: &str,
        required: &BTreeMap<String, String>,
        enabled: &[String],
        kind: &str,
    ) -> Result<()>;
}

/// Presence-only requirement check.
///
/// Names compare case-insensitively. Version constraints are reported in the
/// error but not evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRequirementChecker;

impl RequirementChecker for DefaultRequirementChecker {
    fn check(
        &self,
        theme: &str,
        required: &BTreeMap<String, String>,
        enabled: &[String],
        kind: &str,
    ) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|(name, _)| !enabled.iter().any(|e| e.eq_ignore_ascii_case(name)))
            .map(|(name, constraint)| {
                if constraint.is_empty() {
                    name.clone()
                } else {
                    format!("{name} {constraint}")
                }
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ThemeError::UnmetRequirement {
                theme: theme.to_string(),
                kind: kind.to_string(),
                missing,
            })
        }
    }
}

// ── Locale ─────────────────────────────────────────────────────────────────

/// Notified after the enabled theme changes so translations can be reloaded.
pub trait LocaleRefresher: Send + Sync {
    fn refresh(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLocaleRefresher;

impl LocaleRefresher for NoopLocaleRefresher {
    fn refresh(&self) {
        log::debug!("Locale refresh requested");
    }
}

// ── Assets ─────────────────────────────────────────────────────────────────

/// Maps an application-relative asset path to a URL.
pub trait AssetResolver: Send + Sync {
    fn asset_url(&self, relative_path: &str) -> String;
}

/// Prefixes asset paths with a base URL.
#[derive(Debug, Clone)]
pub struct BaseUrlAssetResolver {
    base_url: String,
}

impl BaseUrlAssetResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for BaseUrlAssetResolver {
    fn default() -> Self {
        Self::new("/")
    }
}

impl AssetResolver for BaseUrlAssetResolver {
    fn asset_url(&self, relative_path: &str) -> String {
        let path = relative_path.replace('\\', "/");
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
