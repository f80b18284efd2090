//! Session snapshot types for save/restore across restarts
//!
//! The tab arrangement is captured into a [`SessionSnapshot`] after every
//! change (debounced), and rebuilt from it once at startup. Live resources
//! (process handles, buffer contents) are never serialized; restoring asks
//! the collaborators to recreate them.

pub mod capture;
pub mod debounce;
pub mod restore;
pub mod storage;

pub use capture::capture_session;
pub use debounce::{PersistJob, SaveDebouncer};
pub use restore::{RestoreSummary, restore_snapshot};
pub use storage::{MemorySnapshotStore, SnapshotStore, YamlSnapshotStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid snapshot timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Serializable projection of the tab arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Timestamp when the snapshot was taken (RFC 3339, UTC)
    pub saved_at: String,
    /// Tabs in display order
    pub tabs: Vec<SnapshotTab>,
    /// Index into `tabs` of the active tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_index: Option<usize>,
}

/// One saved tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotTab {
    Editor {
        path: PathBuf,
        file_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_path: Option<PathBuf>,
    },
    Terminal {
        cwd: PathBuf,
        name: String,
        /// Whether `name` was chosen by the user
        #[serde(default)]
        user_named: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_name: Option<String>,
    },
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn editor_count(&self) -> usize {
        self.tabs
            .iter()
            .filter(|tab| matches!(tab, SnapshotTab::Editor { .. }))
            .count()
    }

    pub fn terminal_count(&self) -> usize {
        self.tabs.len() - self.editor_count()
    }

    pub fn saved_at_time(&self) -> Result<DateTime<Utc>, SnapshotError> {
        DateTime::parse_from_rfc3339(&self.saved_at)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|e| SnapshotError::InvalidTimestamp {
                value: self.saved_at.clone(),
                reason: e.to_string(),
            })
    }

    /// Whether the snapshot is older than `max_age` at `now`.
    ///
    /// A timestamp that cannot be parsed counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let saved_at = match self.saved_at_time() {
            Ok(time) => time,
            Err(e) => {
                log::warn!("Session snapshot: {}", e);
                return true;
            }
        };
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(saved_at) > max_age,
            // Larger than chrono can represent: nothing is ever that old
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot_at(saved_at: &str) -> SessionSnapshot {
        SessionSnapshot {
            saved_at: saved_at.to_string(),
            tabs: Vec::new(),
            active_index: None,
        }
    }

    #[test]
    fn test_staleness_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let week = Duration::from_secs(7 * 24 * 3600);
        assert!(!snapshot_at("2025-03-03T12:00:00Z").is_stale(now, week));
        assert!(snapshot_at("2025-03-03T11:59:59Z").is_stale(now, week));
        assert!(!snapshot_at("2025-03-10T13:00:00+01:00").is_stale(now, week));
    }

    #[test]
    fn test_unparseable_timestamp_is_stale() {
        let now = Utc::now();
        let snapshot = snapshot_at("yesterday-ish");
        assert!(matches!(
            snapshot.saved_at_time(),
            Err(SnapshotError::InvalidTimestamp { .. })
        ));
        assert!(snapshot.is_stale(now, Duration::from_secs(3600)));
    }

    #[test]
    fn test_tabs_are_tagged_by_kind() {
        let snapshot = SessionSnapshot {
            saved_at: "2025-01-01T00:00:00Z".to_string(),
            tabs: vec![
                SnapshotTab::Editor {
                    path: PathBuf::from("/w/main.rs"),
                    file_name: "main.rs".to_string(),
                    project_path: None,
                },
                SnapshotTab::Terminal {
                    cwd: PathBuf::from("/w"),
                    name: "Terminal 1".to_string(),
                    user_named: false,
                    project_id: Some("p1".to_string()),
                    project_name: None,
                },
            ],
            active_index: Some(1),
        };
        let yaml = serde_yaml_ng::to_string(&snapshot).unwrap();
        assert!(yaml.contains("kind: editor"));
        assert!(yaml.contains("kind: terminal"));
        assert!(!yaml.contains("project_name"));
        assert_eq!(snapshot.editor_count(), 1);
        assert_eq!(snapshot.terminal_count(), 1);
    }
}
