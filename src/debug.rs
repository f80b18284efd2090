//! Log backend for tabdeck
//!
//! Every `log::info!()` etc. record is appended to `tabdeck_debug.log` in the
//! temp directory (`/tmp/tabdeck_debug.log` on Unix, `%TEMP%\tabdeck_debug.log`
//! on Windows), which keeps diagnostics out of command output. When `RUST_LOG`
//! is set, records are mirrored to stderr as well.
//!
//! Level precedence: the `--log-level` flag, then `RUST_LOG`, then the config
//! file (applied later through [`apply_config_level`]).

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tabdeck_config::LogLevel;

const LOG_FILE_NAME: &str = "tabdeck_debug.log";

/// Path of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    {
        PathBuf::from("/tmp").join(LOG_FILE_NAME)
    }
    #[cfg(not(unix))]
    {
        std::env::temp_dir().join(LOG_FILE_NAME)
    }
}

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
    /// Level came from the CLI or RUST_LOG and must not be overridden by config
    level_locked: AtomicBool,
}

impl LogBridge {
    fn open_file() -> Option<File> {
        let path = log_path();
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .ok()?;
        let rule = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n{}\ntabdeck session started at {}\n{}",
            rule,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            rule
        );
        Some(file)
    }

    fn format(record: &Record) -> String {
        format!(
            "[{}] [{:<5}] [{}] {}\n",
            Local::now().format("%H:%M:%S%.6f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        if let Some(file) = self.file.lock().as_mut() {
            // Logging must never take the process down
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn rust_log_level() -> Option<LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // Directive lists like "tabdeck=debug,tokio=warn" are not parsed; treat as debug
    Some(value.parse().unwrap_or(LevelFilter::Debug))
}

/// Resolve the startup level from the CLI flag and `RUST_LOG`.
///
/// Returns the level and whether it is locked against config overrides.
fn startup_level(cli_level: Option<LogLevel>, rust_log: Option<LevelFilter>) -> (LevelFilter, bool) {
    match (cli_level, rust_log) {
        (Some(level), _) => (level.to_level_filter(), true),
        (None, Some(level)) => (level, true),
        (None, None) => (LogLevel::default().to_level_filter(), false),
    }
}

/// Install the log backend. Safe to call more than once; later calls only
/// adjust the level.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let rust_log = rust_log_level();
    let (level, locked) = startup_level(cli_level, rust_log);

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        file: Mutex::new(if level == LevelFilter::Off {
            None
        } else {
            LogBridge::open_file()
        }),
        mirror_stderr: rust_log.is_some(),
        level_locked: AtomicBool::new(locked),
    });
    bridge.level_locked.store(locked, Ordering::Relaxed);

    if log::set_logger(bridge).is_err() {
        log::debug!("Log backend already installed");
    }
    log::set_max_level(level);
}

/// Apply the level from the config file unless the CLI or `RUST_LOG` chose one
pub fn apply_config_level(level: LogLevel) {
    let locked = BRIDGE
        .get()
        .is_some_and(|bridge| bridge.level_locked.load(Ordering::Relaxed));
    if locked {
        return;
    }
    if let Some(bridge) = BRIDGE.get()
        && level != LogLevel::Off
    {
        let mut file = bridge.file.lock();
        if file.is_none() {
            *file = LogBridge::open_file();
        }
    }
    log::set_max_level(level.to_level_filter());
}
