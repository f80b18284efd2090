//! Configuration system for tabdeck.
//!
//! This crate provides configuration loading, saving, and default values
//! for the tab/session engine. It includes:
//!
//! - Session persistence tuning (debounce delay, snapshot age, terminal cap)
//! - Logging level selection
//! - YAML persistence under the XDG config directory

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{Config, SessionConfig};
pub use error::ConfigError;
pub use types::LogLevel;
