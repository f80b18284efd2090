//! Multi-tab selection driven by click modifiers.
//!
//! A plain click selects one tab and makes it active. The toggle modifier
//! (ctrl/cmd) adds or removes a single tab. Shift selects the contiguous range
//! between the anchor and the clicked tab. Neither modifier moves the anchor
//! or changes the active tab.

use super::workspace::TabWorkspace;
use super::TabRef;
use std::collections::HashSet;

/// Modifier keys held during a tab click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    pub shift: bool,
    /// ctrl on Linux/Windows, cmd on macOS
    pub toggle: bool,
}

impl ClickModifiers {
    pub const NONE: Self = Self {
        shift: false,
        toggle: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        toggle: false,
    };
    pub const TOGGLE: Self = Self {
        shift: false,
        toggle: true,
    };
}

/// Set of selected tabs plus the anchor used for range selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    tabs: HashSet<TabRef>,
    anchor: Option<TabRef>,
}

impl Selection {
    pub fn contains(&self, tab: TabRef) -> bool {
        self.tabs.contains(&tab)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Anchor for shift-click ranges
    pub fn anchor(&self) -> Option<TabRef> {
        self.anchor
    }

    /// Selected tabs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = TabRef> + '_ {
        self.tabs.iter().copied()
    }

    pub(super) fn collapse_to(&mut self, tab: TabRef) {
        self.tabs.clear();
        self.tabs.insert(tab);
        self.anchor = Some(tab);
    }

    pub(super) fn toggle(&mut self, tab: TabRef) {
        if !self.tabs.remove(&tab) {
            self.tabs.insert(tab);
        }
    }

    /// Replace the selected set, keeping the anchor
    pub(super) fn replace_with(&mut self, tabs: impl IntoIterator<Item = TabRef>) {
        self.tabs = tabs.into_iter().collect();
    }

    /// Drop a tab that left the order
    pub(super) fn prune(&mut self, tab: TabRef) {
        self.tabs.remove(&tab);
        if self.anchor == Some(tab) {
            self.anchor = None;
        }
    }
}

impl TabWorkspace {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, tab: TabRef) -> bool {
        self.selection.contains(tab)
    }

    /// Selected tabs, in tab order
    pub fn selected_in_order(&self) -> Vec<TabRef> {
        self.order
            .iter()
            .copied()
            .filter(|tab| self.selection.contains(*tab))
            .collect()
    }

    /// Make `tab` the active tab and the only selected tab.
    ///
    /// Returns `false` if the tab is unknown or already the sole active selection.
    pub fn activate(&mut self, tab: TabRef) -> bool {
        if !self.contains(tab) {
            return false;
        }
        let unchanged = self.active == Some(tab)
            && self.selection.len() == 1
            && self.selection.contains(tab)
            && self.selection.anchor == Some(tab);
        if unchanged {
            return false;
        }
        self.active = Some(tab);
        self.selection.collapse_to(tab);
        log::debug!("Switched to {}", tab);
        true
    }

    /// Apply a click on `tab` with the given modifiers
    pub fn select(&mut self, tab: TabRef, modifiers: ClickModifiers) -> bool {
        if !self.contains(tab) {
            return false;
        }

        if modifiers.shift {
            let range = self
                .selection
                .anchor
                .and_then(|anchor| self.position(anchor))
                .zip(self.position(tab));
            let Some((from, to)) = range else {
                // Anchor gone: behave like a plain click
                return self.activate(tab);
            };
            let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
            let before = self.selection.clone();
            let slice = self.order[lo..=hi].to_vec();
            self.selection.replace_with(slice);
            return self.selection != before;
        }

        if modifiers.toggle {
            self.selection.toggle(tab);
            return true;
        }

        self.activate(tab)
    }

    /// Select every tab without changing the active tab or the anchor
    pub fn select_all(&mut self) -> bool {
        if self.selection.len() == self.order.len() {
            return false;
        }
        let all = self.order.clone();
        self.selection.replace_with(all);
        true
    }
}
