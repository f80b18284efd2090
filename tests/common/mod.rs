//! Shared integration test helpers for tabdeck.
//!
//! Scripted collaborator fakes plus snapshot builders used across the `tests/`
//! suite.
//!
//! ```ignore
//! mod common;
//! use common::{ScriptedFiles, ScriptedProcesses, workbench_with};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tabdeck::services::{FileService, ProcessService, ServiceError, SessionHandle};
use tabdeck::session::{MemorySnapshotStore, SessionSnapshot, SnapshotTab};
use tabdeck::tab::{TabEntry, TabWorkspace};
use tabdeck::{Workbench, WorkbenchOptions};
use uuid::Uuid;

/// In-memory file service with per-path failures and a read log
#[derive(Debug, Default)]
pub struct ScriptedFiles {
    files: Mutex<HashMap<PathBuf, String>>,
    failing: Mutex<HashSet<PathBuf>>,
    reads: Mutex<Vec<PathBuf>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl ScriptedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.lock().insert(path.into(), content.to_string());
        self
    }

    /// Reads of `path` fail with a permission error
    pub fn failing(self, path: impl Into<PathBuf>) -> Self {
        self.failing.lock().insert(path.into());
        self
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.lock().get(Path::new(path)).cloned()
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().clone()
    }

    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().clone()
    }
}

impl FileService for ScriptedFiles {
    async fn read_file(&self, path: &Path) -> Result<String, ServiceError> {
        self.reads.lock().push(path.to_path_buf());
        if self.failing.lock().contains(path) {
            return Err(ServiceError::io(
                path,
                std::io::ErrorKind::PermissionDenied.into(),
            ));
        }
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ServiceError::io(path, std::io::ErrorKind::NotFound.into()))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), ServiceError> {
        self.writes.lock().push(path.to_path_buf());
        self.files
            .lock()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

/// Process service that hands out sequential handles without spawning anything
#[derive(Debug, Default)]
pub struct ScriptedProcesses {
    next: Mutex<u128>,
    failing: Mutex<HashSet<PathBuf>>,
    created: Mutex<Vec<PathBuf>>,
    terminated: Mutex<Vec<SessionHandle>>,
}

impl ScriptedProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions in `cwd` fail to start
    pub fn failing(self, cwd: impl Into<PathBuf>) -> Self {
        self.failing.lock().insert(cwd.into());
        self
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.created.lock().clone()
    }

    pub fn terminated(&self) -> Vec<SessionHandle> {
        self.terminated.lock().clone()
    }
}

impl ProcessService for ScriptedProcesses {
    async fn create_session(
        &self,
        cwd: &Path,
        _project_id: Option<&str>,
        _project_name: Option<&str>,
    ) -> Result<SessionHandle, ServiceError> {
        self.created.lock().push(cwd.to_path_buf());
        if self.failing.lock().contains(cwd) {
            return Err(ServiceError::Spawn {
                cwd: cwd.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        let mut next = self.next.lock();
        *next += 1;
        Ok(SessionHandle {
            id: Uuid::from_u128(*next),
            pid: None,
        })
    }

    fn terminate(&self, session: &SessionHandle) {
        self.terminated.lock().push(session.clone());
    }
}

pub type TestWorkbench = Workbench<ScriptedFiles, ScriptedProcesses, MemorySnapshotStore>;

/// Options with a 1s debounce, 7 day max age and the given terminal cap
pub fn options(max_terminals: usize) -> WorkbenchOptions {
    WorkbenchOptions {
        restore_on_startup: true,
        save_debounce: Duration::from_millis(1000),
        max_snapshot_age: Duration::from_secs(7 * 24 * 3600),
        max_restored_terminals: max_terminals,
    }
}

/// Workbench over the given fakes; must be called inside a tokio runtime
pub fn workbench_with(
    files: ScriptedFiles,
    processes: ScriptedProcesses,
    store: Arc<MemorySnapshotStore>,
    options: WorkbenchOptions,
) -> TestWorkbench {
    Workbench::new(
        files,
        processes,
        store,
        options,
        tokio::runtime::Handle::current(),
    )
}

pub fn editor_entry(path: &str) -> SnapshotTab {
    let path = PathBuf::from(path);
    SnapshotTab::Editor {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path,
        project_path: None,
    }
}

pub fn terminal_entry(cwd: &str) -> SnapshotTab {
    SnapshotTab::Terminal {
        cwd: PathBuf::from(cwd),
        name: "Terminal".to_string(),
        user_named: false,
        project_id: None,
        project_name: None,
    }
}

pub fn snapshot_at(saved_at: DateTime<Utc>, tabs: Vec<SnapshotTab>) -> SessionSnapshot {
    SessionSnapshot {
        saved_at: saved_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        tabs,
        active_index: None,
    }
}

/// Tab identities in order, ignoring ids: `editor:<path>` / `terminal:<cwd>`
pub fn identities(workspace: &TabWorkspace) -> Vec<String> {
    workspace
        .tabs()
        .map(|entry| match entry {
            TabEntry::Editor(record) => format!(
                "editor:{}",
                record
                    .file_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            TabEntry::Terminal(record) => format!("terminal:{}", record.cwd.display()),
        })
        .collect()
}

/// Same identities, read off a snapshot
pub fn snapshot_identities(snapshot: &SessionSnapshot) -> Vec<String> {
    snapshot
        .tabs
        .iter()
        .map(|tab| match tab {
            SnapshotTab::Editor { path, .. } => format!("editor:{}", path.display()),
            SnapshotTab::Terminal { cwd, .. } => format!("terminal:{}", cwd.display()),
        })
        .collect()
}
