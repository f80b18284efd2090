//! Collaborator contracts consumed by the workbench
//!
//! The tab engine never touches the filesystem or spawns processes itself. It
//! issues requests through these traits and feeds the results back in as
//! ordinary transitions.

mod fs;
mod process;

pub use fs::LocalFileService;
pub use process::{ShellProcessService, validate_cwd};

use crate::tab::EditorId;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Failures reported by collaborators
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start a shell in {cwd:?}: {source}")]
    Spawn {
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown terminal session {0}")]
    UnknownSession(Uuid),

    #[error("{0} has no file path")]
    Untitled(EditorId),

    #[error("{0} is not open")]
    UnknownEditor(EditorId),
}

impl ServiceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ServiceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Opaque reference to a terminal process owned by a [`ProcessService`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub id: Uuid,
    /// OS process id, when the service exposes one
    pub pid: Option<u32>,
}

/// File content reads and writes
pub trait FileService: Send + Sync {
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String, ServiceError>> + Send;

    fn write_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Terminal process lifecycle.
///
/// Handles are owned exclusively by the service; callers only pass them back
/// to address the process.
pub trait ProcessService: Send + Sync {
    fn create_session(
        &self,
        cwd: &Path,
        project_id: Option<&str>,
        project_name: Option<&str>,
    ) -> impl Future<Output = Result<SessionHandle, ServiceError>> + Send;

    /// Ask the process behind `session` to stop. Unknown handles are ignored.
    fn terminate(&self, session: &SessionHandle);
}
