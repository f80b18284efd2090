// Library exports for embedding and testing
//
// # Concurrency model
//
// All tab transitions run synchronously on the caller's thread through
// `Workbench::dispatch`; only collaborator I/O and the save debounce timer
// run on tokio.
//
//   - `parking_lot::Mutex`    : sync-only state shared with spawned tasks
//                               (pending snapshot job, process table, log file).
//                               Never held across an `.await`.
//
//   - `tokio::sync::watch`    : change notifications to subscribers.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod services;
pub mod session;
pub mod tab;
pub mod workbench;

/// Configuration types from the `tabdeck-config` crate
pub use tabdeck_config as config;

pub use workbench::{Workbench, WorkbenchOptions};
