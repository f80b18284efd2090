//! Synchronous transitions dispatched by the view layer

use super::workspace::{ClosedTab, TabWorkspace};
use super::{
    ClickModifiers, DropTarget, EditorId, MoveDirection, OpenRequest, TabRef, TerminalId,
    TerminalRecord,
};

/// Every synchronous transition on a [`TabWorkspace`]
#[derive(Debug, Clone, PartialEq)]
pub enum TabAction {
    /// Open a file whose content has already been read
    Open(OpenRequest),
    NewScratchpad,
    Edit { id: EditorId, content: String },
    /// Pin a preview tab (double-click on the tab)
    Promote(EditorId),
    MarkSaved(EditorId),
    Activate(TabRef),
    Select { tab: TabRef, modifiers: ClickModifiers },
    SelectAll,
    ActivateNext,
    ActivatePrevious,
    MoveOne { tab: TabRef, target: TabRef },
    MoveBatch { tabs: Vec<TabRef>, target_index: usize },
    MoveActive(MoveDirection),
    BeginDrag(TabRef),
    Drop { dragged: TabRef, target: DropTarget },
    Close(TabRef),
    CloseSelected,
    CloseOthers(TabRef),
    CloseToTheRight(TabRef),
    /// The terminal's process already ended on its own
    TerminalExited(TerminalId),
    RenameTerminal { id: TerminalId, name: String },
}

/// Result of applying a [`TabAction`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Whether any observable state changed
    pub changed: bool,
    /// Terminals closed by this action whose processes must be terminated
    pub closed_terminals: Vec<TerminalRecord>,
    /// Tab created by this action, if any
    pub opened: Option<TabRef>,
}

impl Outcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    fn from_changed(changed: bool) -> Self {
        Self {
            changed,
            ..Self::default()
        }
    }

    fn opened(tab: TabRef, changed: bool) -> Self {
        Self {
            changed,
            opened: Some(tab),
            ..Self::default()
        }
    }

    fn closed(closed: Vec<ClosedTab>) -> Self {
        let changed = !closed.is_empty();
        let closed_terminals = closed
            .into_iter()
            .filter_map(|tab| match tab {
                ClosedTab::Terminal(record) => Some(record),
                ClosedTab::Editor(_) => None,
            })
            .collect();
        Self {
            changed,
            closed_terminals,
            opened: None,
        }
    }
}

impl TabWorkspace {
    /// Apply one transition. Requests naming tabs that no longer exist are
    /// no-ops and return [`Outcome::unchanged`].
    pub fn apply(&mut self, action: TabAction) -> Outcome {
        match action {
            TabAction::Open(request) => {
                let (id, changed) = self.open_tracked(request);
                Outcome::opened(TabRef::Editor(id), changed)
            }
            TabAction::NewScratchpad => Outcome::opened(TabRef::Editor(self.new_scratchpad()), true),
            TabAction::Edit { id, content } => Outcome::from_changed(self.edit(id, content)),
            TabAction::Promote(id) => Outcome::from_changed(self.promote(id)),
            TabAction::MarkSaved(id) => Outcome::from_changed(self.mark_saved(id)),
            TabAction::Activate(tab) => Outcome::from_changed(self.activate(tab)),
            TabAction::Select { tab, modifiers } => {
                Outcome::from_changed(self.select(tab, modifiers))
            }
            TabAction::SelectAll => Outcome::from_changed(self.select_all()),
            TabAction::ActivateNext => Outcome::from_changed(self.activate_next()),
            TabAction::ActivatePrevious => Outcome::from_changed(self.activate_previous()),
            TabAction::MoveOne { tab, target } => Outcome::from_changed(self.move_one(tab, target)),
            TabAction::MoveBatch { tabs, target_index } => {
                Outcome::from_changed(self.move_batch(&tabs, target_index))
            }
            TabAction::MoveActive(direction) => Outcome::from_changed(self.move_active(direction)),
            TabAction::BeginDrag(tab) => Outcome::from_changed(self.begin_drag(tab)),
            TabAction::Drop { dragged, target } => {
                Outcome::from_changed(self.drop_dragged(dragged, target))
            }
            TabAction::Close(tab) => Outcome::closed(self.remove(tab).into_iter().collect()),
            TabAction::CloseSelected => Outcome::closed(self.close_selected()),
            TabAction::CloseOthers(keep) => Outcome::closed(self.close_others(keep)),
            TabAction::CloseToTheRight(tab) => Outcome::closed(self.close_to_the_right(tab)),
            TabAction::TerminalExited(id) => {
                let removed = self.remove(TabRef::Terminal(id)).is_some();
                if removed {
                    log::info!("{} exited, tab closed", TabRef::Terminal(id));
                }
                Outcome::from_changed(removed)
            }
            TabAction::RenameTerminal { id, name } => {
                Outcome::from_changed(self.rename_terminal(id, &name))
            }
        }
    }
}
