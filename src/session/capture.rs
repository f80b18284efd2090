//! Capture the current tab arrangement into a snapshot

use super::{SessionSnapshot, SnapshotTab};
use crate::tab::{TabEntry, TabWorkspace};
use chrono::{DateTime, SecondsFormat, Utc};

/// Capture the workspace at `now`.
///
/// Only tabs that can be rebuilt from disk are kept: editors need a file path
/// and diff views are skipped. Preview state and buffer contents are dropped.
pub fn capture_session(workspace: &TabWorkspace, now: DateTime<Utc>) -> SessionSnapshot {
    let active = workspace.active();
    let mut tabs = Vec::with_capacity(workspace.len());
    let mut active_index = None;

    for entry in workspace.tabs() {
        let saved = match entry {
            TabEntry::Editor(record) => {
                if record.is_scratchpad || record.is_diff() {
                    continue;
                }
                let Some(path) = &record.file_path else {
                    continue;
                };
                SnapshotTab::Editor {
                    path: path.clone(),
                    file_name: record.file_name.clone(),
                    project_path: record.project_path.clone(),
                }
            }
            TabEntry::Terminal(record) => SnapshotTab::Terminal {
                cwd: record.cwd.clone(),
                name: record.name.clone(),
                user_named: record.user_named,
                project_id: record.project_id.clone(),
                project_name: record.project_name.clone(),
            },
        };
        if active == Some(entry.tab_ref()) {
            active_index = Some(tabs.len());
        }
        tabs.push(saved);
    }

    SessionSnapshot {
        saved_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        tabs,
        active_index,
    }
}
