//! Default value functions for configuration.
//!
//! Each function is used as a `#[serde(default = "crate::defaults::...")]`
//! attribute on a `Config` field so that partially written config files pick up
//! the same values as `Config::default()`.

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_true() -> bool {
    true
}

// ── Session persistence ────────────────────────────────────────────────────

/// Quiet period after the last tab change before the snapshot is written.
pub fn save_debounce_ms() -> u64 {
    1000
}

/// Snapshots older than this are discarded instead of restored.
pub fn max_snapshot_age_hours() -> u64 {
    24 * 7
}

/// Each restored terminal spawns a real process, so restoration is capped.
pub fn max_restored_terminals() -> usize {
    10
}

// ── Logging ────────────────────────────────────────────────────────────────

pub fn log_level() -> crate::types::LogLevel {
    crate::types::LogLevel::Info
}
