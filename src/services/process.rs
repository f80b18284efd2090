//! Shell processes backing terminal tabs

use super::{ProcessService, ServiceError, SessionHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use uuid::Uuid;

/// Environment variables exported to every shell started for a project
pub const PROJECT_ID_ENV: &str = "TABDECK_PROJECT_ID";
pub const PROJECT_NAME_ENV: &str = "TABDECK_PROJECT_NAME";

/// Use `cwd` if it still exists, else fall back to the home directory
pub fn validate_cwd(cwd: &Path) -> PathBuf {
    if cwd.is_dir() {
        return cwd.to_path_buf();
    }
    log::warn!(
        "Directory {:?} no longer exists, falling back to home",
        cwd
    );
    dirs::home_dir().unwrap_or_else(|| cwd.to_path_buf())
}

/// [`ProcessService`] that starts the user's login shell per terminal.
///
/// The children are owned here and killed when the service is dropped.
#[derive(Debug, Default)]
pub struct ShellProcessService {
    shell: Option<String>,
    children: Mutex<HashMap<Uuid, Child>>,
}

impl ShellProcessService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific shell binary instead of `$SHELL`
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: Some(shell.into()),
            children: Mutex::new(HashMap::new()),
        }
    }

    fn shell_program(&self) -> String {
        if let Some(shell) = &self.shell {
            return shell.clone();
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
        }
    }

    /// Number of sessions still owned by the service
    pub fn session_count(&self) -> usize {
        self.children.lock().len()
    }

    /// Reap sessions whose process has ended and return their handles
    pub fn poll_exited(&self) -> Vec<SessionHandle> {
        let mut children = self.children.lock();
        let exited: Vec<SessionHandle> = children
            .iter_mut()
            .filter_map(|(id, child)| match child.try_wait() {
                Ok(Some(status)) => {
                    log::info!("Session {} exited with {}", id, status);
                    Some(SessionHandle {
                        id: *id,
                        pid: child.id(),
                    })
                }
                Ok(None) => None,
                Err(e) => {
                    log::warn!("Failed to poll session {}: {}", id, e);
                    None
                }
            })
            .collect();
        for handle in &exited {
            children.remove(&handle.id);
        }
        exited
    }

    /// Kill every remaining session
    pub fn terminate_all(&self) {
        let mut children = self.children.lock();
        for (id, mut child) in children.drain() {
            if let Err(e) = child.start_kill() {
                log::warn!("Failed to kill session {}: {}", id, e);
            }
        }
    }
}

impl ProcessService for ShellProcessService {
    async fn create_session(
        &self,
        cwd: &Path,
        project_id: Option<&str>,
        project_name: Option<&str>,
    ) -> Result<SessionHandle, ServiceError> {
        let program = self.shell_program();
        let mut command = Command::new(&program);
        command
            .current_dir(validate_cwd(cwd))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(project_id) = project_id {
            command.env(PROJECT_ID_ENV, project_id);
        }
        if let Some(project_name) = project_name {
            command.env(PROJECT_NAME_ENV, project_name);
        }

        let child = command.spawn().map_err(|source| ServiceError::Spawn {
            cwd: cwd.to_path_buf(),
            source,
        })?;
        let handle = SessionHandle {
            id: Uuid::new_v4(),
            pid: child.id(),
        };
        log::info!(
            "Started {} (pid {:?}) in {:?} as session {}",
            program,
            handle.pid,
            cwd,
            handle.id
        );
        self.children.lock().insert(handle.id, child);
        Ok(handle)
    }

    fn terminate(&self, session: &SessionHandle) {
        let Some(mut child) = self.children.lock().remove(&session.id) else {
            log::debug!("terminate: session {} already gone", session.id);
            return;
        };
        match child.start_kill() {
            Ok(()) => log::info!("Terminated session {}", session.id),
            Err(e) => log::warn!("Failed to terminate session {}: {}", session.id, e),
        }
    }
}

impl Drop for ShellProcessService {
    fn drop(&mut self) {
        self.terminate_all();
    }
}
