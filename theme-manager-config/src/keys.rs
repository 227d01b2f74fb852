//! Configuration keys read and written by theme-manager.
//!
//! Keys are flat dotted strings; the store does not interpret the dots.

/// Folder of the theme enabled for the desktop context.
pub const THEME: &str = "themes.enabled";

/// Folder of the theme enabled for the mobile (alternate client) context.
pub const MOBILE_THEME: &str = "themes.mobile_enabled";

/// Display name of the enabled theme, present only when it declares options.
pub const THEME_OPTIONS_NAME: &str = "themes.options_name";

/// Extra theme search roots: a path, a list of paths, or a map path → label.
pub const SEARCH_PATHS: &str = "themes.search_paths";

/// Root directory of bundled themes.
pub const CORE_THEMES_ROOT: &str = "themes.core_root";

/// Root directory of locally installed themes.
pub const LOCAL_THEMES_ROOT: &str = "themes.local_root";

/// Application root used to build relative asset paths.
pub const APPLICATION_ROOT: &str = "application.root";

/// Base URL prepended to resolved asset paths.
pub const ASSET_BASE_URL: &str = "assets.base_url";

/// Applications currently enabled, checked against theme requirements.
pub const ENABLED_APPLICATIONS: &str = "applications.enabled";

/// Directory of the file-backed cache store.
pub const CACHE_DIRECTORY: &str = "cache.directory";

/// Theme folder reported when nothing is persisted.
pub const DEFAULT_THEME: &str = "default";
