//! Ordered tab index for a workspace mixing editor and terminal tabs

use super::ids::IdGenerator;
use super::selection::Selection;
use super::{
    EditorId, EditorTabRecord, TabEntry, TabRef, TerminalId, TerminalRecord, TerminalRequest,
};
use crate::services::SessionHandle;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// A record removed from the workspace, returned to the caller so it can
/// release the underlying resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ClosedTab {
    Editor(EditorTabRecord),
    Terminal(TerminalRecord),
}

impl ClosedTab {
    pub fn tab_ref(&self) -> TabRef {
        match self {
            ClosedTab::Editor(record) => TabRef::Editor(record.id),
            ClosedTab::Terminal(record) => TabRef::Terminal(record.id),
        }
    }
}

/// A broken structural invariant, reported by [`TabWorkspace::check_invariants`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{0} appears more than once in the tab order")]
    DuplicateTab(TabRef),
    #[error("{0} is in the tab order but has no record")]
    OrphanTab(TabRef),
    #[error("{0} has a record but is missing from the tab order")]
    UnorderedRecord(TabRef),
    #[error("{count} editor tabs are in preview state")]
    MultiplePreviews { count: usize },
    #[error("active tab {0} is not in the tab order")]
    DanglingActive(TabRef),
    #[error("selected tab {0} is not in the tab order")]
    DanglingSelection(TabRef),
}

/// The authoritative tab order plus the per-kind record tables.
///
/// Every mutation keeps the order and the record tables in bijection within a
/// single method call, so no caller ever observes an orphan or a duplicate.
#[derive(Debug, Clone, Default)]
pub struct TabWorkspace {
    /// All tabs, in display order
    pub(super) order: Vec<TabRef>,
    pub(super) editors: HashMap<EditorId, EditorTabRecord>,
    pub(super) terminals: HashMap<TerminalId, TerminalRecord>,
    /// Currently active tab (editor or terminal, never both)
    pub(super) active: Option<TabRef>,
    pub(super) selection: Selection,
    pub(super) ids: IdGenerator,
}

impl TabWorkspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::new())
    }

    /// Create an empty workspace drawing ids from `ids`
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            order: Vec::new(),
            editors: HashMap::new(),
            terminals: HashMap::new(),
            active: None,
            selection: Selection::default(),
            ids,
        }
    }

    // ── Read-only projection ────────────────────────────────────────────────

    /// The tab order
    pub fn order(&self) -> &[TabRef] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Index of `tab` in the order
    pub fn position(&self, tab: TabRef) -> Option<usize> {
        self.order.iter().position(|t| *t == tab)
    }

    pub fn contains(&self, tab: TabRef) -> bool {
        match tab {
            TabRef::Editor(id) => self.editors.contains_key(&id),
            TabRef::Terminal(id) => self.terminals.contains_key(&id),
        }
    }

    pub fn editor(&self, id: EditorId) -> Option<&EditorTabRecord> {
        self.editors.get(&id)
    }

    pub fn terminal(&self, id: TerminalId) -> Option<&TerminalRecord> {
        self.terminals.get(&id)
    }

    /// Look up the record behind `tab`
    pub fn entry(&self, tab: TabRef) -> Option<TabEntry<'_>> {
        match tab {
            TabRef::Editor(id) => self.editors.get(&id).map(TabEntry::Editor),
            TabRef::Terminal(id) => self.terminals.get(&id).map(TabEntry::Terminal),
        }
    }

    /// All tabs with their records, in display order
    pub fn tabs(&self) -> impl Iterator<Item = TabEntry<'_>> + '_ {
        self.order.iter().filter_map(|tab| self.entry(*tab))
    }

    /// Find the editor tab for `path` (plain variant when `diff` is `None`)
    pub fn find_editor(&self, path: &Path, diff: Option<&super::DiffPayload>) -> Option<EditorId> {
        self.order
            .iter()
            .filter_map(|tab| tab.as_editor())
            .find(|id| {
                self.editors
                    .get(id)
                    .is_some_and(|record| record.matches(path, diff))
            })
    }

    /// The single editor currently in preview state, if any
    pub fn preview_editor_id(&self) -> Option<EditorId> {
        self.editors
            .values()
            .find(|record| record.is_preview)
            .map(|record| record.id)
    }

    /// Currently active tab
    pub fn active(&self) -> Option<TabRef> {
        self.active
    }

    pub fn active_editor_id(&self) -> Option<EditorId> {
        self.active.and_then(|tab| tab.as_editor())
    }

    pub fn active_terminal_id(&self) -> Option<TerminalId> {
        self.active.and_then(|tab| tab.as_terminal())
    }

    /// Get index of active tab (0-based)
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|tab| self.position(tab))
    }

    // ── Insertion ───────────────────────────────────────────────────────────

    /// Index right after the active tab, or the end when nothing is active
    fn after_active_index(&self) -> usize {
        self.active_index()
            .map(|idx| idx + 1)
            .unwrap_or(self.order.len())
    }

    /// Insert an editor record immediately after the active tab (or append)
    pub(super) fn insert_editor_after_active(&mut self, record: EditorTabRecord) -> TabRef {
        let index = self.after_active_index();
        self.insert_editor_at(record, index)
    }

    pub(super) fn insert_editor_at(&mut self, record: EditorTabRecord, index: usize) -> TabRef {
        let tab = TabRef::Editor(record.id);
        let index = index.min(self.order.len());
        self.editors.insert(record.id, record);
        self.order.insert(index, tab);
        log::info!("Inserted {} at index {} (total: {})", tab, index, self.order.len());
        tab
    }

    /// Open a terminal tab right after the active tab and activate it
    pub fn open_terminal_tab(
        &mut self,
        request: &TerminalRequest,
        session: SessionHandle,
    ) -> TerminalId {
        let index = self.after_active_index();
        let id = self.insert_terminal_at(request, session, index);
        self.activate(TabRef::Terminal(id));
        id
    }

    /// Append a terminal tab at the end without changing the active tab
    pub fn append_terminal_tab(
        &mut self,
        request: &TerminalRequest,
        session: SessionHandle,
    ) -> TerminalId {
        let index = self.order.len();
        self.insert_terminal_at(request, session, index)
    }

    fn insert_terminal_at(
        &mut self,
        request: &TerminalRequest,
        session: SessionHandle,
        index: usize,
    ) -> TerminalId {
        let id = self.ids.next_terminal_id();
        let color = self.ids.color_for_project(request.project_id.as_deref());
        let (name, user_named) = match &request.name {
            Some(name) => (name.clone(), true),
            None => (String::new(), false),
        };
        let record = TerminalRecord {
            id,
            project_id: request.project_id.clone(),
            project_name: request.project_name.clone(),
            name,
            user_named,
            cwd: request.cwd.clone(),
            color,
            session,
        };
        let tab = TabRef::Terminal(id);
        let index = index.min(self.order.len());
        self.terminals.insert(id, record);
        self.order.insert(index, tab);
        self.renumber_default_terminals();
        log::info!(
            "Created {} in {:?} at index {} (total: {})",
            tab,
            request.cwd,
            index,
            self.order.len()
        );
        id
    }

    /// Give a terminal a user-chosen name; an empty name restores the default
    pub fn rename_terminal(&mut self, id: TerminalId, name: &str) -> bool {
        let Some(record) = self.terminals.get_mut(&id) else {
            return false;
        };
        let name = name.trim();
        if name.is_empty() {
            record.user_named = false;
        } else {
            record.user_named = true;
            record.name = name.to_string();
        }
        self.renumber_default_terminals();
        true
    }

    /// Renumber terminals that still have default names based on their position
    pub(super) fn renumber_default_terminals(&mut self) {
        let mut number = 0;
        for tab in &self.order {
            if let TabRef::Terminal(id) = tab {
                number += 1;
                if let Some(record) = self.terminals.get_mut(id)
                    && !record.user_named
                {
                    record.name = format!("Terminal {number}");
                }
            }
        }
    }

    // ── Removal and active-tab resolution ───────────────────────────────────

    /// Remove a tab from the order and its record table in one step.
    ///
    /// If the removed tab was active, the tab that followed it becomes active,
    /// else the one before it, else nothing.
    pub fn remove(&mut self, tab: TabRef) -> Option<ClosedTab> {
        let index = self.position(tab)?;

        let closed = match tab {
            TabRef::Editor(id) => ClosedTab::Editor(self.editors.remove(&id)?),
            TabRef::Terminal(id) => ClosedTab::Terminal(self.terminals.remove(&id)?),
        };
        self.order.remove(index);
        self.selection.prune(tab);

        log::info!("Closed {} (index {})", tab, index);

        if self.active == Some(tab) {
            self.active = self
                .order
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|prev| self.order.get(prev)))
                .copied();
            if let Some(next) = self.active {
                log::debug!("Active tab moved to {}", next);
            }
        }
        if self.selection.is_empty()
            && let Some(active) = self.active
        {
            self.selection.collapse_to(active);
        }

        if matches!(closed, ClosedTab::Terminal(_)) {
            self.renumber_default_terminals();
        }
        self.debug_check();
        Some(closed)
    }

    /// Close every selected tab
    pub fn close_selected(&mut self) -> Vec<ClosedTab> {
        let selected = self.selected_in_order();
        self.remove_all(selected)
    }

    /// Close every tab except `keep`, which becomes active
    pub fn close_others(&mut self, keep: TabRef) -> Vec<ClosedTab> {
        if !self.contains(keep) {
            return Vec::new();
        }
        self.activate(keep);
        let others: Vec<TabRef> = self.order.iter().copied().filter(|t| *t != keep).collect();
        self.remove_all(others)
    }

    /// Close every tab after `tab` in the order
    pub fn close_to_the_right(&mut self, tab: TabRef) -> Vec<ClosedTab> {
        let Some(index) = self.position(tab) else {
            return Vec::new();
        };
        let right = self.order[index + 1..].to_vec();
        self.remove_all(right)
    }

    fn remove_all(&mut self, tabs: Vec<TabRef>) -> Vec<ClosedTab> {
        tabs.into_iter().filter_map(|tab| self.remove(tab)).collect()
    }

    // ── Keyboard navigation ─────────────────────────────────────────────────

    /// Activate the next tab (wraps around)
    pub fn activate_next(&mut self) -> bool {
        self.activate_offset(1)
    }

    /// Activate the previous tab (wraps around)
    pub fn activate_previous(&mut self) -> bool {
        self.activate_offset(-1)
    }

    fn activate_offset(&mut self, offset: isize) -> bool {
        let len = self.order.len();
        if len <= 1 {
            return false;
        }
        let Some(current) = self.active_index() else {
            return false;
        };
        let next = (current as isize + offset).rem_euclid(len as isize) as usize;
        let tab = self.order[next];
        self.activate(tab)
    }

    // ── Invariants ──────────────────────────────────────────────────────────

    /// Verify the structural invariants of the workspace
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(self.order.len());
        for tab in &self.order {
            if !seen.insert(*tab) {
                return Err(InvariantViolation::DuplicateTab(*tab));
            }
            if !self.contains(*tab) {
                return Err(InvariantViolation::OrphanTab(*tab));
            }
        }
        let records = self
            .editors
            .keys()
            .map(|id| TabRef::Editor(*id))
            .chain(self.terminals.keys().map(|id| TabRef::Terminal(*id)));
        for tab in records {
            if !seen.contains(&tab) {
                return Err(InvariantViolation::UnorderedRecord(tab));
            }
        }

        let previews = self.editors.values().filter(|r| r.is_preview).count();
        if previews > 1 {
            return Err(InvariantViolation::MultiplePreviews { count: previews });
        }

        if let Some(active) = self.active
            && !seen.contains(&active)
        {
            return Err(InvariantViolation::DanglingActive(active));
        }
        if let Some(stray) = self.selection.iter().find(|tab| !seen.contains(tab)) {
            return Err(InvariantViolation::DanglingSelection(stray));
        }
        Ok(())
    }

    pub(super) fn debug_check(&self) {
        if cfg!(debug_assertions)
            && let Err(violation) = self.check_invariants()
        {
            panic!("tab workspace invariant violated: {violation}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tab::{OpenRequest, TabKind};
    use std::path::PathBuf;

    pub(crate) fn handle(n: u128) -> SessionHandle {
        SessionHandle {
            id: uuid::Uuid::from_u128(n),
            pid: None,
        }
    }

    /// Workspace with editors/terminals created from a pattern like "etete"
    pub(crate) fn workspace_with(pattern: &str) -> (TabWorkspace, Vec<TabRef>) {
        let mut ws = TabWorkspace::new();
        let mut tabs = Vec::new();
        for (i, kind) in pattern.chars().enumerate() {
            let tab = match kind {
                'e' => {
                    let id = ws.open(OpenRequest::pinned(format!("/w/file{i}.rs"), format!("{i}")));
                    TabRef::Editor(id)
                }
                't' => TabRef::Terminal(ws.append_terminal_tab(
                    &TerminalRequest::new(format!("/w/dir{i}")),
                    handle(i as u128),
                )),
                _ => unreachable!("unknown tab kind {kind}"),
            };
            tabs.push(tab);
        }
        // `open` inserts after the active tab; rebuild a predictable order
        ws.order = tabs.clone();
        ws.renumber_default_terminals();
        ws.activate(*tabs.last().unwrap());
        (ws, tabs)
    }

    #[test]
    fn test_remove_active_each_position_of_five() {
        for removed in 0..5 {
            let (mut ws, tabs) = workspace_with("etete");
            ws.activate(tabs[removed]);

            let closed = ws.remove(tabs[removed]).unwrap();
            assert_eq!(closed.tab_ref(), tabs[removed]);

            let expected = if removed + 1 < tabs.len() {
                tabs[removed + 1]
            } else {
                tabs[removed - 1]
            };
            assert_eq!(ws.active(), Some(expected), "removing index {removed}");
            assert_eq!(ws.len(), 4);
            ws.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_remove_last_tab_clears_active() {
        let (mut ws, tabs) = workspace_with("t");
        ws.remove(tabs[0]).unwrap();
        assert_eq!(ws.active(), None);
        assert_eq!(ws.active_editor_id(), None);
        assert_eq!(ws.active_terminal_id(), None);
        assert!(ws.is_empty());
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let (mut ws, tabs) = workspace_with("eee");
        ws.activate(tabs[2]);
        ws.remove(tabs[0]).unwrap();
        assert_eq!(ws.active(), Some(tabs[2]));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut ws, tabs) = workspace_with("et");
        assert!(ws.remove(TabRef::Editor(EditorId(999))).is_none());
        assert_eq!(ws.order(), tabs.as_slice());
    }

    #[test]
    fn test_active_kind_follows_resolved_tab() {
        let (mut ws, tabs) = workspace_with("et");
        ws.activate(tabs[0]);
        assert_eq!(ws.active_editor_id(), tabs[0].as_editor());
        ws.remove(tabs[0]).unwrap();
        assert_eq!(ws.active_editor_id(), None);
        assert_eq!(ws.active_terminal_id(), tabs[1].as_terminal());
    }

    #[test]
    fn test_insert_after_active() {
        let (mut ws, tabs) = workspace_with("eee");
        ws.activate(tabs[0]);
        let id = ws.open(OpenRequest::pinned("/w/new.rs", ""));
        assert_eq!(ws.position(TabRef::Editor(id)), Some(1));
        assert_eq!(ws.active(), Some(TabRef::Editor(id)));
    }

    #[test]
    fn test_insert_without_active_appends() {
        let mut ws = TabWorkspace::new();
        let first = ws.append_terminal_tab(&TerminalRequest::new("/a"), handle(1));
        assert_eq!(ws.active(), None);
        let id = ws.open(OpenRequest::pinned("/w/new.rs", ""));
        assert_eq!(
            ws.order(),
            &[TabRef::Terminal(first), TabRef::Editor(id)][..]
        );
    }

    #[test]
    fn test_terminals_renumbered_by_position() {
        let (mut ws, tabs) = workspace_with("ttt");
        let name = |ws: &TabWorkspace, tab: TabRef| {
            ws.terminal(tab.as_terminal().unwrap()).unwrap().name.clone()
        };
        assert_eq!(name(&ws, tabs[2]), "Terminal 3");

        ws.rename_terminal(tabs[1].as_terminal().unwrap(), "server");
        ws.remove(tabs[0]).unwrap();
        assert_eq!(name(&ws, tabs[1]), "server");
        assert_eq!(name(&ws, tabs[2]), "Terminal 2");

        ws.rename_terminal(tabs[1].as_terminal().unwrap(), "  ");
        assert_eq!(name(&ws, tabs[1]), "Terminal 1");
    }

    #[test]
    fn test_close_others_and_to_the_right() {
        let (mut ws, tabs) = workspace_with("etete");
        let closed = ws.close_to_the_right(tabs[2]);
        assert_eq!(closed.len(), 2);
        assert_eq!(ws.order(), &tabs[..3]);

        let closed = ws.close_others(tabs[1]);
        assert_eq!(closed.len(), 2);
        assert_eq!(ws.order(), &[tabs[1]][..]);
        assert_eq!(ws.active(), Some(tabs[1]));
        ws.check_invariants().unwrap();
    }

    #[test]
    fn test_activate_next_and_previous_wrap() {
        let (mut ws, tabs) = workspace_with("ete");
        ws.activate(tabs[2]);
        assert!(ws.activate_next());
        assert_eq!(ws.active(), Some(tabs[0]));
        assert!(ws.activate_previous());
        assert_eq!(ws.active(), Some(tabs[2]));
    }

    #[test]
    fn test_tabs_projection_in_order() {
        let (ws, tabs) = workspace_with("tee");
        let kinds: Vec<TabKind> = ws.tabs().map(|entry| entry.tab_ref().kind()).collect();
        assert_eq!(kinds, vec![TabKind::Terminal, TabKind::Editor, TabKind::Editor]);
        let refs: Vec<TabRef> = ws.tabs().map(|entry| entry.tab_ref()).collect();
        assert_eq!(refs, tabs);
        assert_eq!(
            ws.editor(tabs[1].as_editor().unwrap()).unwrap().file_path,
            Some(PathBuf::from("/w/file1.rs"))
        );
    }

    #[test]
    fn test_check_invariants_detects_orphan() {
        let (mut ws, _) = workspace_with("ee");
        ws.order.push(TabRef::Terminal(TerminalId(77)));
        assert_eq!(
            ws.check_invariants(),
            Err(InvariantViolation::OrphanTab(TabRef::Terminal(TerminalId(77))))
        );
    }

    #[test]
    fn test_check_invariants_detects_duplicate() {
        let (mut ws, tabs) = workspace_with("ee");
        ws.order.push(tabs[0]);
        assert_eq!(
            ws.check_invariants(),
            Err(InvariantViolation::DuplicateTab(tabs[0]))
        );
    }
}
