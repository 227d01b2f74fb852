//! Command-line interface for theme-manager.
//!
//! This module handles argument parsing; the subcommand implementations live
//! in the [`commands`] submodule.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// theme-manager - Discover, inspect and enable themes
#[derive(Debug, Parser)]
#[command(name = "theme-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file to use (default: ~/.config/theme-manager/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Act on the theme selected for mobile clients
    #[arg(long, global = true)]
    pub mobile: bool,

    /// Set debug log level (overrides DEBUG_LEVEL)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every installed theme
    List {
        /// Ignore the in-process memo and re-check every search path
        #[arg(long)]
        refresh: bool,

        /// Print the registry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the metadata of one theme
    Info {
        /// Theme identifier
        id: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the folder of the enabled theme
    Current,

    /// Enable a theme and persist the selection
    Enable {
        /// Theme identifier (case-insensitive)
        id: String,
    },

    /// Disable the enabled theme, falling back to the default
    Disable,

    /// Check that a theme could be enabled, running its hooks
    Test {
        /// Theme identifier (case-insensitive)
        id: String,
    },

    /// Show the search paths, configuration file and cache directory
    Paths,

    /// Empty every search path's cache entry
    PurgeCache,
}
