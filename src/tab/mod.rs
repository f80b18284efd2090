//! Tab model for the unified editor + terminal tab strip
//!
//! This module provides the core tab infrastructure including:
//! - `TabRef`: kind-tagged pointer into the tab order (editor or terminal)
//! - `EditorTabRecord` / `TerminalRecord`: the live records behind each tab
//! - `TabWorkspace`: the ordered tab index with selection, reordering,
//!   preview-tab lifecycle and active-tab resolution
//! - `TabAction`: every synchronous transition the view layer can dispatch

mod action;
mod ids;
mod preview;
mod reorder;
mod selection;
pub(crate) mod workspace;

pub use action::{Outcome, TabAction};
pub use ids::{IdGenerator, TAB_COLOR_PALETTE};
pub use preview::{OpenMode, OpenRequest};
pub use reorder::{DropTarget, MoveDirection, move_batch_in, move_one_in};
pub use selection::{ClickModifiers, Selection};
pub use workspace::{ClosedTab, InvariantViolation, TabWorkspace};

use crate::services::SessionHandle;
use std::fmt;
use std::path::{Path, PathBuf};

/// RGB tab color
pub type TabColor = [u8; 3];

/// Unique identifier for an editor tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

/// Unique identifier for a terminal tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId(pub u64);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminal#{}", self.0)
    }
}

/// The kind of work surface a tab holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    Editor,
    Terminal,
}

/// A reference to one entry of the tab order.
///
/// Holds only the discriminant and the id; the record itself lives in the
/// workspace's per-kind tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabRef {
    Editor(EditorId),
    Terminal(TerminalId),
}

impl TabRef {
    pub fn kind(&self) -> TabKind {
        match self {
            TabRef::Editor(_) => TabKind::Editor,
            TabRef::Terminal(_) => TabKind::Terminal,
        }
    }

    pub fn as_editor(&self) -> Option<EditorId> {
        match self {
            TabRef::Editor(id) => Some(*id),
            TabRef::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<TerminalId> {
        match self {
            TabRef::Terminal(id) => Some(*id),
            TabRef::Editor(_) => None,
        }
    }
}

impl From<EditorId> for TabRef {
    fn from(id: EditorId) -> Self {
        TabRef::Editor(id)
    }
}

impl From<TerminalId> for TabRef {
    fn from(id: TerminalId) -> Self {
        TabRef::Terminal(id)
    }
}

impl fmt::Display for TabRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabRef::Editor(id) => id.fmt(f),
            TabRef::Terminal(id) => id.fmt(f),
        }
    }
}

/// How an editor tab's content should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Text,
    Markdown,
    Image,
    Diff,
}

impl ContentType {
    /// Detect content type from a file path based on extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md" | "markdown") => ContentType::Markdown,
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp") => ContentType::Image,
            Some("diff" | "patch") => ContentType::Diff,
            _ => ContentType::Text,
        }
    }
}

/// Commit the diff payload was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub summary: String,
    pub author: String,
}

/// Both sides of a diff view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPayload {
    pub original: String,
    pub modified: String,
    pub commit: Option<CommitInfo>,
}

impl DiffPayload {
    /// Key distinguishing diff variants of the same file
    pub fn commit_key(&self) -> Option<&str> {
        self.commit.as_ref().map(|c| c.hash.as_str())
    }
}

/// A file-editor tab
#[derive(Debug, Clone, PartialEq)]
pub struct EditorTabRecord {
    pub id: EditorId,
    /// `None` for untitled and scratchpad tabs
    pub file_path: Option<PathBuf>,
    pub file_name: String,
    pub content_type: ContentType,
    pub content: String,
    pub dirty: bool,
    pub is_preview: bool,
    pub is_scratchpad: bool,
    pub diff: Option<DiffPayload>,
    pub project_path: Option<PathBuf>,
}

impl EditorTabRecord {
    /// Whether this record is the tab for `path` in the given diff variant.
    ///
    /// Plain file tabs use `commit == None`; a diff tab without commit metadata
    /// still differs from the plain tab of the same file.
    pub fn matches(&self, path: &Path, diff: Option<&DiffPayload>) -> bool {
        if self.is_scratchpad || self.file_path.as_deref() != Some(path) {
            return false;
        }
        match (&self.diff, diff) {
            (None, None) => true,
            (Some(mine), Some(theirs)) => mine.commit_key() == theirs.commit_key(),
            _ => false,
        }
    }

    pub fn is_diff(&self) -> bool {
        self.diff.is_some()
    }
}

/// Parameters for a new terminal session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalRequest {
    pub cwd: PathBuf,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    /// User-chosen name; `None` gets the default "Terminal N"
    pub name: Option<String>,
}

impl TerminalRequest {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    pub fn in_project(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self.project_name = Some(name.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A terminal tab.
///
/// The process behind it is owned by the process service; this record only
/// carries the opaque session handle used to address it.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalRecord {
    pub id: TerminalId,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub name: String,
    /// Whether `name` was chosen by the user (not renumbered)
    pub user_named: bool,
    pub cwd: PathBuf,
    pub color: TabColor,
    pub session: SessionHandle,
}

/// Borrowed view of one tab, in tab order
#[derive(Debug, Clone, Copy)]
pub enum TabEntry<'a> {
    Editor(&'a EditorTabRecord),
    Terminal(&'a TerminalRecord),
}

impl TabEntry<'_> {
    pub fn tab_ref(&self) -> TabRef {
        match self {
            TabEntry::Editor(record) => TabRef::Editor(record.id),
            TabEntry::Terminal(record) => TabRef::Terminal(record.id),
        }
    }

    /// Label shown in the tab strip
    pub fn title(&self) -> &str {
        match self {
            TabEntry::Editor(record) => &record.file_name,
            TabEntry::Terminal(record) => &record.name,
        }
    }
}
