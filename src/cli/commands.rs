//! Subcommand implementations.

use super::{Cli, Commands};
use crate::cache::FileCacheStore;
use crate::indexer::ThemeIndexer;
use crate::manager::{ClientContext, ThemeManager};
use crate::record::ThemeRecord;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use theme_manager_config::{ConfigStore, ThemeSettings, YamlConfigStore};

/// Everything a subcommand needs.
pub struct Session {
    pub manager: ThemeManager,
    pub settings: ThemeSettings,
    pub config_path: std::path::PathBuf,
}

impl Session {
    /// Open the configuration named on the command line (or the default one)
    /// and build a manager over it.
    pub fn open(cli: &Cli) -> Result<Self> {
        let store = match &cli.config {
            Some(path) => YamlConfigStore::open(path),
            None => YamlConfigStore::open_default(),
        }
        .context("Failed to load configuration")?;
        let config_path = store.path().to_path_buf();
        let store: Arc<dyn ConfigStore> = Arc::new(store);

        let settings = ThemeSettings::from_store(store.as_ref());
        let cache = Arc::new(FileCacheStore::new(&settings.cache_directory));
        let indexer = Arc::new(ThemeIndexer::from_settings(&settings, cache));
        let context = if cli.mobile {
            ClientContext::Mobile
        } else {
            ClientContext::Desktop
        };

        Ok(Self {
            manager: ThemeManager::new(indexer, store).with_context(context),
            settings,
            config_path,
        })
    }
}

/// Run the parsed command, writing its output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let session = Session::open(cli)?;
    let manager = &session.manager;

    match &cli.command {
        Commands::List { refresh, json } => {
            let registry = manager.available_themes(*refresh);
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&*registry)?)?;
                return Ok(());
            }
            if registry.is_empty() {
                writeln!(out, "No themes found.")?;
                return Ok(());
            }
            let current = manager.current_theme();
            for (_, record) in registry.iter() {
                let marker = if record.folder == current { '*' } else { ' ' };
                writeln!(
                    out,
                    "{} {:<20} {:<28} {:<8} {}",
                    marker,
                    record.identifier,
                    record.name,
                    record.origin,
                    record.version.as_deref().unwrap_or("-")
                )?;
            }
        }
        Commands::Info { id, json } => {
            let registry = manager.available_themes(false);
            let record = registry
                .get_ignore_case(id)
                .with_context(|| format!("Unknown theme '{id}'"))?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
            } else {
                print_record(out, record)?;
            }
        }
        Commands::Current => {
            writeln!(out, "{}", manager.current_theme())?;
        }
        Commands::Enable { id } => {
            let record = manager.enable_theme(id)?;
            writeln!(out, "Enabled theme '{}' ({}).", record.name, record.folder)?;
        }
        Commands::Disable => {
            let previous = manager.current_theme();
            manager.disable_theme()?;
            writeln!(out, "Disabled theme '{previous}'.")?;
        }
        Commands::Test { id } => {
            let record = manager.test_theme(id)?;
            writeln!(out, "Theme '{}' can be enabled.", record.identifier)?;
        }
        Commands::Paths => {
            writeln!(out, "Configuration: {}", session.config_path.display())?;
            writeln!(out, "Cache:         {}", session.settings.cache_directory.display())?;
            writeln!(out, "Search paths (later entries override earlier ones):")?;
            for path in manager.indexer().search_paths() {
                let missing = if path.root.is_dir() { "" } else { " (missing)" };
                writeln!(out, "  {:<10} {}{}", path.label, path.root.display(), missing)?;
            }
        }
        Commands::PurgeCache => {
            manager.indexer().purge_cache()?;
            writeln!(
                out,
                "Purged cache for {} search path(s).",
                manager.indexer().search_paths().len()
            )?;
        }
    }

    Ok(())
}

fn print_record(out: &mut dyn Write, record: &ThemeRecord) -> std::io::Result<()> {
    writeln!(out, "{} ({})", record.name, record.identifier)?;
    writeln!(out, "  Folder:      {}", record.folder)?;
    writeln!(out, "  Origin:      {}", record.origin)?;
    writeln!(out, "  Root:        {}", record.theme_root.display())?;
    let optional = [
        ("Description", &record.description),
        ("Version", &record.version),
        ("Author", &record.author),
        ("Author email", &record.author_email),
        ("Author URL", &record.author_url),
        ("URL", &record.url),
        ("Screenshot", &record.screenshot_url),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            writeln!(out, "  {:<12} {}", format!("{label}:"), value)?;
        }
    }
    if let Some(required) = &record.required_applications {
        let list: Vec<String> = required
            .iter()
            .map(|(app, constraint)| {
                if constraint.is_empty() {
                    app.clone()
                } else {
                    format!("{app} {constraint}")
                }
            })
            .collect();
        writeln!(out, "  Requires:    {}", list.join(", "))?;
    }
    if record.hooks_file.is_some() {
        writeln!(
            out,
            "  Hooks:       setup={} on_disable={}",
            record.hooks.setup, record.hooks.on_disable
        )?;
    }
    if let Some(options) = &record.options {
        let styles: Vec<&str> = options.styles.keys().map(String::as_str).collect();
        let text: Vec<&str> = options.text.keys().map(String::as_str).collect();
        writeln!(out, "  Styles:      {}", styles.join(", "))?;
        writeln!(out, "  Text:        {}", text.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let temp = TempDir::new().unwrap();
        let themes = temp.path().join("app").join("themes").join("ocean");
        fs::create_dir_all(&themes).unwrap();
        fs::write(
            themes.join("about.php"),
            "<?php\n$ThemeInfo['ocean'] = array('Name' => 'Ocean', 'Version' => '1.0');\n",
        )
        .unwrap();
        let config = format!(
            "application.root: {}\nthemes.local_root: {}\ncache.directory: {}\n",
            temp.path().join("app").display(),
            temp.path().join("local").display(),
            temp.path().join("cache").display()
        );
        fs::write(temp.path().join("config.yaml"), config).unwrap();
        temp
    }

    fn run_args(temp: &TempDir, args: &[&str]) -> Result<String> {
        let config = temp.path().join("config.yaml");
        let mut argv = vec!["theme-manager", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run(&cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list_and_enable() {
        let temp = setup();
        let listing = run_args(&temp, &["list"]).unwrap();
        assert!(listing.contains("ocean"));
        assert!(listing.contains("Ocean"));

        assert_eq!(run_args(&temp, &["current"]).unwrap().trim(), "default");
        run_args(&temp, &["enable", "OCEAN"]).unwrap();
        assert_eq!(run_args(&temp, &["current"]).unwrap().trim(), "ocean");

        let saved = fs::read_to_string(temp.path().join("config.yaml")).unwrap();
        assert!(saved.contains("themes.enabled: ocean"));
    }

    #[test]
    fn test_disable_default_fails() {
        let temp = setup();
        let err = run_args(&temp, &["disable"]).unwrap_err();
        assert!(err.to_string().contains("cannot disable the default theme"));
    }

    #[test]
    fn test_info_json() {
        let temp = setup();
        let json = run_args(&temp, &["info", "ocean", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["identifier"], "ocean");
        assert_eq!(value["version"], "1.0");
    }
}
