//! Id generation and terminal color assignment.
//!
//! One generator instance is owned by each `TabWorkspace`. Tests seed it with
//! `IdGenerator::starting_at` to get deterministic ids.

use super::{EditorId, TabColor, TerminalId};
use std::collections::HashMap;

/// Colors handed out to terminal tabs, one slot per project
pub const TAB_COLOR_PALETTE: [TabColor; 8] = [
    [0x4e, 0x9a, 0xf1],
    [0x5c, 0xb8, 0x5c],
    [0xe0, 0x9f, 0x3e],
    [0xc7, 0x5a, 0xd6],
    [0xe0, 0x5c, 0x5c],
    [0x3e, 0xb8, 0xb0],
    [0xd6, 0xc2, 0x4a],
    [0x8a, 0x8f, 0x98],
];

/// Monotonic id source. Ids are never handed out twice.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_editor: u64,
    next_terminal: u64,
    next_color: usize,
    project_colors: HashMap<String, usize>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start both id sequences at `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_editor: first,
            next_terminal: first,
            next_color: 0,
            project_colors: HashMap::new(),
        }
    }

    pub fn next_editor_id(&mut self) -> EditorId {
        let id = EditorId(self.next_editor);
        self.next_editor += 1;
        id
    }

    pub fn next_terminal_id(&mut self) -> TerminalId {
        let id = TerminalId(self.next_terminal);
        self.next_terminal += 1;
        id
    }

    /// Color for a terminal in `project_id`.
    ///
    /// Terminals of the same project share a slot; terminals without a project
    /// each take the next slot in rotation.
    pub fn color_for_project(&mut self, project_id: Option<&str>) -> TabColor {
        let slot = match project_id {
            Some(project) => {
                if let Some(&slot) = self.project_colors.get(project) {
                    slot
                } else {
                    let slot = self.take_color_slot();
                    self.project_colors.insert(project.to_string(), slot);
                    slot
                }
            }
            None => self.take_color_slot(),
        };
        TAB_COLOR_PALETTE[slot]
    }

    fn take_color_slot(&mut self) -> usize {
        let slot = self.next_color;
        self.next_color = (self.next_color + 1) % TAB_COLOR_PALETTE.len();
        slot
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
