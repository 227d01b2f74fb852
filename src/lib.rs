// Library exports for the theme-manager binary, tests and embedders.
//
// # Concurrency
//
// The API is synchronous. `ThemeIndexer` keeps its memoized registry in an
// `arc_swap::ArcSwapOption` so readers never block and always see a whole
// registry; refreshes are serialized by a `parking_lot::Mutex`. Config and
// cache stores use `parking_lot` locks internally, so a `ThemeManager` can be
// shared across threads behind an `Arc`.

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod debug;

pub mod about;
pub mod cache;
pub mod cli;
pub mod collaborators;
pub mod error;
pub mod hooks;
pub mod indexer;
pub mod manager;
pub mod record;
pub mod search_paths;
pub mod theme_files;

pub use about::{Declaration, ExtractError, MetaValue};
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore, SearchPathCacheEntry};
pub use collaborators::{
    ApplicationRegistry, AssetResolver, BaseUrlAssetResolver, ConfiguredApplications,
    DefaultRequirementChecker, LocaleRefresher, NoopLocaleRefresher, RequirementChecker,
    StaticApplications,
};
pub use error::{Result, ThemeError};
pub use hooks::{HookCapabilities, HookLoader, HookRegistry, NoHooks, ThemeHooks};
pub use indexer::{IndexStats, ThemeIndexer, ThemeRegistry};
pub use manager::{ClientContext, ThemeManager};
pub use record::{StyleOption, TextOption, ThemeOptions, ThemeRecord};
pub use search_paths::{SearchPath, SearchPaths};
pub use theme_files::{ThemeFileSet, find_theme_files};
