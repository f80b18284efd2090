//! Rebuild a saved arrangement through the collaborators

use super::{SessionSnapshot, SnapshotTab};
use crate::services::{FileService, ProcessService};
use crate::tab::{TabRef, TabWorkspace, TerminalRequest};

/// What a restore pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored_editors: usize,
    pub restored_terminals: usize,
    /// Entries dropped because reconstruction failed or the terminal cap was hit
    pub skipped: usize,
    /// The whole snapshot was discarded as too old
    pub discarded_stale: bool,
}

impl RestoreSummary {
    pub fn restored(&self) -> usize {
        self.restored_editors + self.restored_terminals
    }
}

/// Append the snapshot's tabs to `workspace` in saved order.
///
/// Each entry gets a fresh id. An entry whose file cannot be read or whose
/// shell cannot be started is logged and skipped; the rest still restore.
/// At most `max_terminals` terminals are started.
pub async fn restore_snapshot<F, P>(
    workspace: &mut TabWorkspace,
    files: &F,
    processes: &P,
    snapshot: &SessionSnapshot,
    max_terminals: usize,
) -> RestoreSummary
where
    F: FileService,
    P: ProcessService,
{
    let mut summary = RestoreSummary::default();
    let mut first = None;
    let mut saved_active = None;

    for (index, tab) in snapshot.tabs.iter().enumerate() {
        let restored = match tab {
            SnapshotTab::Editor {
                path, project_path, ..
            } => match files.read_file(path).await {
                Ok(content) => {
                    summary.restored_editors += 1;
                    let id = workspace.restore_editor(path, content, project_path.clone());
                    Some(TabRef::Editor(id))
                }
                Err(e) => {
                    log::warn!("Session restore: skipping editor {:?}: {}", path, e);
                    None
                }
            },
            SnapshotTab::Terminal {
                cwd,
                name,
                user_named,
                project_id,
                project_name,
            } => {
                if summary.restored_terminals >= max_terminals {
                    log::warn!(
                        "Session restore: terminal limit ({}) reached, skipping terminal in {:?}",
                        max_terminals,
                        cwd
                    );
                    None
                } else {
                    match processes
                        .create_session(cwd, project_id.as_deref(), project_name.as_deref())
                        .await
                    {
                        Ok(session) => {
                            summary.restored_terminals += 1;
                            let request = TerminalRequest {
                                cwd: cwd.clone(),
                                project_id: project_id.clone(),
                                project_name: project_name.clone(),
                                name: user_named.then(|| name.clone()),
                            };
                            let id = workspace.append_terminal_tab(&request, session);
                            Some(TabRef::Terminal(id))
                        }
                        Err(e) => {
                            log::warn!("Session restore: skipping terminal in {:?}: {}", cwd, e);
                            None
                        }
                    }
                }
            }
        };

        match restored {
            Some(tab) => {
                first.get_or_insert(tab);
                if snapshot.active_index == Some(index) {
                    saved_active = Some(tab);
                }
            }
            None => summary.skipped += 1,
        }
    }

    let fallback = first.filter(|_| workspace.active().is_none());
    if let Some(tab) = saved_active.or(fallback) {
        workspace.activate(tab);
    }

    log::info!(
        "Session restore: {} editors, {} terminals restored, {} skipped",
        summary.restored_editors,
        summary.restored_terminals,
        summary.skipped
    );
    summary
}
