//! Debug logging for theme-manager.
//!
//! Controlled by the DEBUG_LEVEL environment variable or `--log-level`:
//! - 0 or unset: No debugging
//! - 1: Errors and warnings
//! - 2: Info level (refreshes, enable/disable)
//! - 3: Debug level (cache hits, per-path indexing)
//! - 4: Trace level (every candidate and cache write)
//!
//! Output goes to `theme_manager_debug.log` in the system temp directory so
//! command output on stdout stays machine-readable. When RUST_LOG is set,
//! records are mirrored to stderr as well.

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        match std::env::var("DEBUG_LEVEL") {
            Ok(val) => Self::from_number(val.trim()),
            Err(_) => DebugLevel::Off,
        }
    }

    fn from_number(val: &str) -> Self {
        match val.parse::<u8>() {
            Ok(1) => DebugLevel::Error,
            Ok(2) => DebugLevel::Info,
            Ok(3) => DebugLevel::Debug,
            Ok(4) => DebugLevel::Trace,
            _ => DebugLevel::Off,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            DebugLevel::Off => LevelFilter::Off,
            DebugLevel::Error => LevelFilter::Warn,
            DebugLevel::Info => LevelFilter::Info,
            DebugLevel::Debug => LevelFilter::Debug,
            DebugLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("theme_manager_debug.log")
}

/// Routes `log` records to the debug file and, optionally, stderr.
struct DebugLogger {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn new(level: LevelFilter, mirror_stderr: bool) -> Self {
        let file = if level != LevelFilter::Off {
            // Silently run without a file if it can't be opened.
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
        } else {
            None
        };

        let logger = DebugLogger {
            level,
            file: Mutex::new(file),
            mirror_stderr,
        };
        logger.write_raw(&format!(
            "\n{}\ntheme-manager debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        logger
    }

    fn write_raw(&self, msg: &str) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Install the debug logger as the `log` backend.
///
/// `cli_level` takes precedence over DEBUG_LEVEL. Calling this more than
/// once keeps the first logger.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let level = cli_level.unwrap_or_else(|| DebugLevel::from_env().to_level_filter());
    let mirror_stderr = std::env::var_os("RUST_LOG").is_some();

    let logger = LOGGER.get_or_init(|| DebugLogger::new(level, mirror_stderr));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}
