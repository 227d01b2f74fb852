//! Theme selection.
//!
//! [`ThemeManager`] answers which theme is enabled and switches between
//! themes. Enabling is two-phase: [`ThemeManager::test_theme`] validates the
//! candidate and runs lifecycle hooks without touching configuration, then
//! [`ThemeManager::enable_theme`] persists the selection in one batch.

use crate::collaborators::{
    ApplicationRegistry, ConfiguredApplications, DefaultRequirementChecker, LocaleRefresher,
    NoopLocaleRefresher, RequirementChecker,
};
use crate::error::{Result, ThemeError};
use crate::hooks::{HookLoader, NoHooks, ThemeHooks};
use crate::indexer::{ThemeIndexer, ThemeRegistry};
use crate::record::ThemeRecord;
use std::collections::BTreeMap;
use std::sync::Arc;
use theme_manager_config::{ConfigEdit, ConfigStore, keys};

/// Which kind of client the selection applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientContext {
    #[default]
    Desktop,
    /// Alternate (mobile) clients keep their own enabled theme.
    Mobile,
}

impl ClientContext {
    /// Configuration key holding this context's theme folder.
    pub fn theme_key(self) -> &'static str {
        match self {
            ClientContext::Desktop => keys::THEME,
            ClientContext::Mobile => keys::MOBILE_THEME,
        }
    }
}

/// Enabled-theme state machine over an indexer and a configuration store.
pub struct ThemeManager {
    indexer: Arc<ThemeIndexer>,
    config: Arc<dyn ConfigStore>,
    applications: Arc<dyn ApplicationRegistry>,
    requirements: Arc<dyn RequirementChecker>,
    locale: Arc<dyn LocaleRefresher>,
    hooks: Arc<dyn HookLoader>,
    context: ClientContext,
}

impl ThemeManager {
    /// Manager with the default collaborators: applications read from the
    /// configuration, presence-only requirement checks, no locale refresh
    /// and no hooks.
    pub fn new(indexer: Arc<ThemeIndexer>, config: Arc<dyn ConfigStore>) -> Self {
        Self {
            indexer,
            applications: Arc::new(ConfiguredApplications::new(Arc::clone(&config))),
            config,
            requirements: Arc::new(DefaultRequirementChecker),
            locale: Arc::new(NoopLocaleRefresher),
            hooks: Arc::new(NoHooks),
            context: ClientContext::Desktop,
        }
    }

    pub fn with_applications(mut self, applications: Arc<dyn ApplicationRegistry>) -> Self {
        self.applications = applications;
        self
    }

    pub fn with_requirement_checker(mut self, requirements: Arc<dyn RequirementChecker>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_locale_refresher(mut self, locale: Arc<dyn LocaleRefresher>) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_hook_loader(mut self, hooks: Arc<dyn HookLoader>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> ClientContext {
        self.context
    }

    pub fn indexer(&self) -> &ThemeIndexer {
        &self.indexer
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn available_themes(&self, force_refresh: bool) -> Arc<ThemeRegistry> {
        self.indexer.available_themes(force_refresh)
    }

    pub fn theme_info(&self, identifier: &str) -> Option<ThemeRecord> {
        self.indexer.theme_info(identifier)
    }

    /// Folder of the theme enabled for this manager's context.
    pub fn current_theme(&self) -> String {
        self.config
            .get_string(self.context.theme_key(), keys::DEFAULT_THEME)
    }

    /// Folder of the theme enabled for desktop clients.
    pub fn enabled_theme(&self) -> String {
        self.config.get_string(keys::THEME, keys::DEFAULT_THEME)
    }

    /// Record of the current theme, matched by folder.
    pub fn enabled_theme_info(&self) -> Option<ThemeRecord> {
        let folder = self.current_theme();
        self.available_themes(false).find_by_folder(&folder).cloned()
    }

    /// The current theme as a one-entry map keyed by its identifier.
    pub fn enabled_theme_source(&self) -> Option<BTreeMap<String, ThemeRecord>> {
        self.enabled_theme_info()
            .map(|record| BTreeMap::from([(record.identifier.clone(), record)]))
    }

    // ── Transitions ────────────────────────────────────────────────────────

    /// Validate `identifier` and run its setup hook, then the on-disable hook
    /// of the theme being replaced. Configuration is never modified.
    ///
    /// Returns the candidate's record.
    pub fn test_theme(&self, identifier: &str) -> Result<ThemeRecord> {
        let previous = self.enabled_theme_info();

        let candidate = self
            .available_themes(false)
            .get_ignore_case(identifier)
            .cloned()
            .ok_or_else(|| ThemeError::InvalidTheme(identifier.to_string()))?;

        if let Some(required) = &candidate.required_applications {
            let enabled = self.applications.enabled_applications();
            self.requirements
                .check(&candidate.identifier, required, &enabled, "application")?;
        }

        if candidate.hooks_file.is_some() && candidate.hooks.setup {
            self.run_hook(&candidate, "setup", |h| h.setup())?;
        }

        if let Some(previous) = previous
            && previous.hooks_file.is_some()
            && previous.hooks.on_disable
        {
            self.run_hook(&previous, "on_disable", |h| h.on_disable())?;
        }

        Ok(candidate)
    }

    /// Test `identifier` and persist it as the enabled theme.
    pub fn enable_theme(&self, identifier: &str) -> Result<ThemeRecord> {
        let record = self.test_theme(identifier)?;
        if record.folder.is_empty() {
            return Err(ThemeError::InvalidTheme(identifier.to_string()));
        }

        let mut edits = vec![ConfigEdit::set_str(self.context.theme_key(), &record.folder)];
        if record.has_options() {
            edits.push(ConfigEdit::set_str(keys::THEME_OPTIONS_NAME, &record.name));
        } else {
            edits.push(ConfigEdit::remove(keys::THEME_OPTIONS_NAME));
        }
        self.config.apply(&edits)?;

        log::info!(
            "Enabled theme '{}' (folder '{}') for {:?} clients",
            record.identifier,
            record.folder,
            self.context
        );
        self.locale.refresh();
        Ok(record)
    }

    /// Fall back to the default theme by clearing the persisted selection.
    pub fn disable_theme(&self) -> Result<()> {
        let current = self.current_theme();
        if current == keys::DEFAULT_THEME {
            return Err(ThemeError::CannotDisableDefault);
        }
        self.config.remove(self.context.theme_key())?;
        log::info!("Disabled theme '{}' for {:?} clients", current, self.context);
        Ok(())
    }

    /// Index themes and load the current theme's hooks for this request.
    pub fn start(&self, force_refresh: bool) -> Option<Arc<dyn ThemeHooks>> {
        let registry = self.available_themes(force_refresh);
        let current = self.current_theme();
        let Some(record) = registry.find_by_folder(&current) else {
            log::debug!("Current theme '{}' is not installed", current);
            return None;
        };
        if record.hooks_file.is_none() {
            return None;
        }
        let hooks = self.hooks.load(record);
        if hooks.is_some() {
            log::debug!("Loaded hooks for theme '{}'", record.identifier);
        }
        hooks
    }

    fn run_hook(
        &self,
        record: &ThemeRecord,
        hook: &'static str,
        call: impl FnOnce(&dyn ThemeHooks) -> std::result::Result<(), String>,
    ) -> Result<()> {
        let Some(hooks) = self.hooks.load(record) else {
            log::warn!(
                "Theme '{}' declares {} but no hooks were loaded",
                record.identifier,
                hook
            );
            return Ok(());
        };
        log::debug!("Running {} hook for theme '{}'", hook, record.identifier);
        call(hooks.as_ref()).map_err(|message| ThemeError::Hook {
            theme: record.folder.clone(),
            hook,
            message,
        })
    }
}
