//! Engine facade tying the tab workspace to its collaborators.
//!
//! The [`Workbench`] is what a view layer talks to: it dispatches synchronous
//! [`TabAction`]s, runs the async operations that have to wait on file reads or
//! process spawns, notifies subscribers of every change and keeps the saved
//! session in step through a debounced writer.
//!
//! Two latches guard startup. `restore_started` makes the restore path run at
//! most once per workbench; `restore_completed` keeps every save suppressed
//! until that restore has finished, so the empty bootstrap state never
//! overwrites a real snapshot.

use crate::services::{FileService, ProcessService, ServiceError, SessionHandle};
use crate::session::{
    PersistJob, RestoreSummary, SaveDebouncer, SnapshotStore, capture_session, restore_snapshot,
};
use crate::tab::{
    EditorId, OpenMode, OpenRequest, TabAction, TabEntry, TabRef, TabWorkspace, TerminalId,
    TerminalRequest,
};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabdeck_config::SessionConfig;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Session tuning used by the workbench
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchOptions {
    pub restore_on_startup: bool,
    pub save_debounce: Duration,
    pub max_snapshot_age: Duration,
    pub max_restored_terminals: usize,
}

impl Default for WorkbenchOptions {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for WorkbenchOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            restore_on_startup: config.restore_on_startup,
            save_debounce: config.save_debounce(),
            max_snapshot_age: config.max_snapshot_age(),
            max_restored_terminals: config.max_restored_terminals,
        }
    }
}

pub struct Workbench<F, P, S>
where
    F: FileService,
    P: ProcessService,
    S: SnapshotStore,
{
    workspace: TabWorkspace,
    files: F,
    processes: P,
    store: Arc<S>,
    debouncer: SaveDebouncer<S>,
    options: WorkbenchOptions,
    restore_started: bool,
    restore_completed: bool,
    revision: watch::Sender<u64>,
}

impl<F, P, S> Workbench<F, P, S>
where
    F: FileService,
    P: ProcessService,
    S: SnapshotStore,
{
    /// Create a workbench. The debounce timer runs on `runtime`.
    pub fn new(
        files: F,
        processes: P,
        store: Arc<S>,
        options: WorkbenchOptions,
        runtime: Handle,
    ) -> Self {
        let debouncer = SaveDebouncer::new(Arc::clone(&store), options.save_debounce, runtime);
        let (revision, _) = watch::channel(0);
        Self {
            workspace: TabWorkspace::new(),
            files,
            processes,
            store,
            debouncer,
            options,
            restore_started: false,
            restore_completed: false,
            revision,
        }
    }

    /// Read-only projection for rendering
    pub fn workspace(&self) -> &TabWorkspace {
        &self.workspace
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn processes(&self) -> &P {
        &self.processes
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> &WorkbenchOptions {
        &self.options
    }

    /// Receiver whose value is bumped after every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision number
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn is_restore_completed(&self) -> bool {
        self.restore_completed
    }

    /// Whether a snapshot write or clear is waiting on the debounce delay
    pub fn is_save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Apply one synchronous transition. Returns whether anything changed.
    pub fn dispatch(&mut self, action: TabAction) -> bool {
        let outcome = self.workspace.apply(action);
        for terminal in &outcome.closed_terminals {
            self.processes.terminate(&terminal.session);
        }
        if outcome.changed {
            self.changed();
        }
        outcome.changed
    }

    fn changed(&mut self) {
        self.revision.send_modify(|revision| *revision += 1);
        self.schedule_save();
    }

    /// Arm the debounced writer with the current arrangement
    fn schedule_save(&mut self) {
        if !self.restore_completed {
            log::trace!("Snapshot save suppressed until restore completes");
            return;
        }
        let snapshot = capture_session(&self.workspace, Utc::now());
        let job = if snapshot.is_empty() {
            PersistJob::Clear
        } else {
            PersistJob::Write(snapshot)
        };
        self.debouncer.arm(job);
    }

    /// Read `path` and open it. Files already open skip the read.
    pub async fn open_file(&mut self, path: &Path, mode: OpenMode) -> Result<EditorId, ServiceError> {
        let content = match self.workspace.find_editor(path, None) {
            Some(_) => String::new(),
            None => self.files.read_file(path).await?,
        };
        let (id, changed) = self
            .workspace
            .open_tracked(OpenRequest::new(path, content, mode));
        if changed {
            self.changed();
        }
        Ok(id)
    }

    /// Start a shell and open a terminal tab for it after the active tab
    pub async fn open_terminal(&mut self, request: TerminalRequest) -> Result<TerminalId, ServiceError> {
        let session = self
            .processes
            .create_session(
                &request.cwd,
                request.project_id.as_deref(),
                request.project_name.as_deref(),
            )
            .await?;
        let id = self.workspace.open_terminal_tab(&request, session);
        self.changed();
        Ok(id)
    }

    /// Write an editor's content back to its file and clear the dirty flag
    pub async fn save_editor(&mut self, id: EditorId) -> Result<(), ServiceError> {
        let record = self
            .workspace
            .editor(id)
            .ok_or(ServiceError::UnknownEditor(id))?;
        let path = record
            .file_path
            .clone()
            .ok_or(ServiceError::Untitled(id))?;
        let content = record.content.clone();

        self.files.write_file(&path, &content).await?;
        log::info!("Saved {} to {:?}", TabRef::Editor(id), path);
        self.dispatch(TabAction::MarkSaved(id));
        Ok(())
    }

    /// Run the startup restore
    pub async fn restore(&mut self) -> RestoreSummary {
        self.restore_at(Utc::now()).await
    }

    /// Run the startup restore, judging snapshot age against `now`.
    ///
    /// Runs at most once; later calls return an empty summary.
    pub async fn restore_at(&mut self, now: DateTime<Utc>) -> RestoreSummary {
        if self.restore_started {
            log::debug!("Session restore already ran, ignoring");
            return RestoreSummary::default();
        }
        self.restore_started = true;

        let summary = self.run_restore(now).await;
        self.restore_completed = true;

        if summary.restored() > 0 {
            self.changed();
        } else if !self.workspace.is_empty() {
            // Tabs opened while the gate was closed were never persisted
            self.schedule_save();
        }
        summary
    }

    async fn run_restore(&mut self, now: DateTime<Utc>) -> RestoreSummary {
        if !self.options.restore_on_startup {
            log::info!("Session restore disabled");
            return RestoreSummary::default();
        }

        let snapshot = match self.store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return RestoreSummary::default(),
            Err(e) => {
                log::error!("Failed to load session snapshot: {:#}", e);
                return RestoreSummary::default();
            }
        };

        if snapshot.is_stale(now, self.options.max_snapshot_age) {
            log::info!(
                "Discarding session snapshot saved at {} (older than {:?})",
                snapshot.saved_at,
                self.options.max_snapshot_age
            );
            PersistJob::Clear.run(self.store.as_ref());
            return RestoreSummary {
                discarded_stale: true,
                ..RestoreSummary::default()
            };
        }

        // Clear before rebuilding so a crash mid-restore cannot replay it
        PersistJob::Clear.run(self.store.as_ref());

        restore_snapshot(
            &mut self.workspace,
            &self.files,
            &self.processes,
            &snapshot,
            self.options.max_restored_terminals,
        )
        .await
    }

    /// Write any pending snapshot now
    pub fn flush(&mut self) -> bool {
        self.debouncer.flush()
    }

    /// Close the terminal tab whose process ended on its own
    pub fn session_exited(&mut self, session: &SessionHandle) -> bool {
        let exited = self.workspace.tabs().find_map(|entry| match entry {
            TabEntry::Terminal(record) if record.session.id == session.id => Some(record.id),
            _ => None,
        });
        match exited {
            Some(id) => self.dispatch(TabAction::TerminalExited(id)),
            None => false,
        }
    }
}
