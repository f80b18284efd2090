//! Editor tab opening and the preview-tab lifecycle.
//!
//! At most one editor tab is in preview state. Opening another file in preview
//! mode reuses that tab's slot in the order; editing or an explicit promote
//! turns a preview tab into a pinned one, and pinned tabs never go back.

use super::workspace::TabWorkspace;
use super::{ContentType, DiffPayload, EditorId, EditorTabRecord, TabRef};
use std::path::{Path, PathBuf};

/// How a file should be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Ephemeral tab, replaced by the next preview open
    #[default]
    Preview,
    /// Permanent tab
    Pinned,
}

/// Request to open a file in an editor tab
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    pub path: PathBuf,
    /// File content as read by the caller
    pub content: String,
    pub mode: OpenMode,
    pub diff: Option<DiffPayload>,
    pub project_path: Option<PathBuf>,
}

impl OpenRequest {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, mode: OpenMode) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode,
            diff: None,
            project_path: None,
        }
    }

    pub fn pinned(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, OpenMode::Pinned)
    }

    pub fn preview(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, OpenMode::Preview)
    }

    pub fn with_diff(mut self, diff: DiffPayload) -> Self {
        self.diff = Some(diff);
        self
    }

    pub fn in_project(mut self, project_path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(project_path.into());
        self
    }

    fn into_record(self, id: EditorId) -> EditorTabRecord {
        let content_type = if self.diff.is_some() {
            ContentType::Diff
        } else {
            ContentType::from_path(&self.path)
        };
        EditorTabRecord {
            id,
            file_name: display_name(&self.path),
            file_path: Some(self.path),
            content_type,
            content: self.content,
            dirty: false,
            is_preview: self.mode == OpenMode::Preview,
            is_scratchpad: false,
            diff: self.diff,
            project_path: self.project_path,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl TabWorkspace {
    /// Open a file, reusing an existing tab for the same file and diff variant.
    ///
    /// The opened tab always ends up active.
    pub fn open(&mut self, request: OpenRequest) -> EditorId {
        self.open_tracked(request).0
    }

    /// Like [`open`](Self::open), also reporting whether anything changed
    pub fn open_tracked(&mut self, request: OpenRequest) -> (EditorId, bool) {
        if let Some(id) = self.find_editor(&request.path, request.diff.as_ref()) {
            let promoted = request.mode == OpenMode::Pinned && self.promote(id);
            let activated = self.activate(TabRef::Editor(id));
            return (id, promoted || activated);
        }

        let id = self.ids.next_editor_id();
        let record = request.into_record(id);
        let tab = match self.preview_editor_id() {
            Some(old) if record.is_preview => self.replace_preview(old, record),
            _ => self.insert_editor_after_active(record),
        };
        self.activate(tab);
        self.debug_check();
        (id, true)
    }

    /// Swap the current preview record for `record`, keeping its index
    fn replace_preview(&mut self, old: EditorId, record: EditorTabRecord) -> TabRef {
        let old_tab = TabRef::Editor(old);
        let Some(index) = self.position(old_tab) else {
            return self.insert_editor_after_active(record);
        };
        let tab = TabRef::Editor(record.id);
        self.editors.remove(&old);
        self.editors.insert(record.id, record);
        self.order[index] = tab;
        self.selection.prune(old_tab);
        if self.active == Some(old_tab) {
            self.active = None;
        }
        log::info!("Replaced preview {} with {} at index {}", old_tab, tab, index);
        tab
    }

    /// Open an empty scratch buffer next to the active tab
    pub fn new_scratchpad(&mut self) -> EditorId {
        let number = self
            .editors
            .values()
            .filter(|record| record.is_scratchpad)
            .filter_map(|record| record.file_name.strip_prefix("Untitled-"))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = self.ids.next_editor_id();
        let record = EditorTabRecord {
            id,
            file_path: None,
            file_name: format!("Untitled-{number}"),
            content_type: ContentType::Text,
            content: String::new(),
            dirty: false,
            is_preview: false,
            is_scratchpad: true,
            diff: None,
            project_path: None,
        };
        let tab = self.insert_editor_after_active(record);
        self.activate(tab);
        self.debug_check();
        id
    }

    /// Replace an editor's content. Marks it dirty and pins a preview tab.
    pub fn edit(&mut self, id: EditorId, content: impl Into<String>) -> bool {
        let Some(record) = self.editors.get_mut(&id) else {
            return false;
        };
        let content = content.into();
        if record.content == content && record.dirty && !record.is_preview {
            return false;
        }
        record.content = content;
        record.dirty = true;
        if record.is_preview {
            record.is_preview = false;
            log::debug!("Edit promoted preview {}", TabRef::Editor(id));
        }
        true
    }

    /// Turn a preview tab into a pinned tab without touching its content
    pub fn promote(&mut self, id: EditorId) -> bool {
        match self.editors.get_mut(&id) {
            Some(record) if record.is_preview => {
                record.is_preview = false;
                log::debug!("Promoted {} to pinned", TabRef::Editor(id));
                true
            }
            _ => false,
        }
    }

    /// Clear the dirty flag after the content was written out
    pub fn mark_saved(&mut self, id: EditorId) -> bool {
        match self.editors.get_mut(&id) {
            Some(record) if record.dirty => {
                record.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// Append a pinned editor tab at the end without activating it.
    ///
    /// Used when rebuilding a saved arrangement, where order comes from the
    /// snapshot rather than from the active tab.
    pub fn restore_editor(
        &mut self,
        path: &Path,
        content: String,
        project_path: Option<PathBuf>,
    ) -> EditorId {
        let id = self.ids.next_editor_id();
        let mut request = OpenRequest::pinned(path, content);
        request.project_path = project_path;
        let index = self.order.len();
        self.insert_editor_at(request.into_record(id), index);
        self.debug_check();
        id
    }
}
