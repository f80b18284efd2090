//! Drag-and-drop and keyboard reordering of the tab order.
//!
//! The order algorithms are plain functions over a slice of ids so they can be
//! exercised independently of the record tables.

use super::workspace::TabWorkspace;
use super::TabRef;

/// Where a dragged tab (or group of tabs) was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto another tab: the group lands at that tab's position
    Tab(TabRef),
    /// Onto the empty area after the last tab
    End,
}

/// Direction for keyboard tab moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

/// Move `item` to the position currently held by `target`.
///
/// The target index is taken after `item` has been removed, so moving right
/// lands the item just before `target`. Returns `false` (order untouched) when
/// either element is missing, they are equal, or nothing would change.
pub fn move_one_in<T: Copy + PartialEq>(order: &mut Vec<T>, item: T, target: T) -> bool {
    if item == target {
        return false;
    }
    let Some(from) = order.iter().position(|t| *t == item) else {
        return false;
    };
    let Some(target_idx) = order.iter().position(|t| *t == target) else {
        return false;
    };
    let to = if from < target_idx {
        target_idx - 1
    } else {
        target_idx
    };
    if to == from {
        return false;
    }
    let moved = order.remove(from);
    order.insert(to, moved);
    true
}

/// Move every element of `items` to `target_index` as one contiguous group.
///
/// The group keeps the relative order the elements had in `order` (not the
/// order of `items`). `target_index` refers to the order before the move and is
/// shifted left by the number of moved elements that sat before it. Dropping on
/// a member of the group is a no-op.
pub fn move_batch_in<T: Copy + PartialEq>(order: &mut Vec<T>, items: &[T], target_index: usize) -> bool {
    let target_index = target_index.min(order.len());
    if order
        .get(target_index)
        .is_some_and(|target| items.contains(target))
    {
        return false;
    }
    splice_group(order, items, target_index)
}

/// Group splice without the drop-on-member guard
fn splice_group<T: Copy + PartialEq>(order: &mut Vec<T>, items: &[T], target_index: usize) -> bool {
    let target_index = target_index.min(order.len());
    let group: Vec<T> = order.iter().copied().filter(|t| items.contains(t)).collect();
    if group.is_empty() {
        return false;
    }
    let removed_before = order[..target_index]
        .iter()
        .filter(|t| items.contains(t))
        .count();

    let before = order.clone();
    order.retain(|t| !items.contains(t));
    let insert_at = (target_index - removed_before).min(order.len());
    order.splice(insert_at..insert_at, group);
    *order != before
}

impl TabWorkspace {
    /// Move one tab onto another tab's position
    pub fn move_one(&mut self, tab: TabRef, target: TabRef) -> bool {
        let moved = move_one_in(&mut self.order, tab, target);
        if moved {
            log::debug!("Moved {} onto {}", tab, target);
            self.after_reorder();
        }
        moved
    }

    /// Move a group of tabs to `target_index`, keeping their relative order
    pub fn move_batch(&mut self, tabs: &[TabRef], target_index: usize) -> bool {
        let moved = move_batch_in(&mut self.order, tabs, target_index);
        if moved {
            log::debug!("Moved {} tabs to index {}", tabs.len(), target_index);
            self.after_reorder();
        }
        moved
    }

    /// Prepare a drag starting on `tab`.
    ///
    /// An unselected tab collapses the selection to itself. A tab that is part
    /// of a multi-selection pulls the other selected tabs next to it, at its
    /// current index, so the whole group travels together.
    pub fn begin_drag(&mut self, tab: TabRef) -> bool {
        if !self.contains(tab) {
            return false;
        }
        if !self.is_selected(tab) {
            return self.activate(tab);
        }
        if self.selection.len() < 2 {
            return false;
        }
        let Some(index) = self.position(tab) else {
            return false;
        };
        let group = self.selected_in_order();
        let regrouped = splice_group(&mut self.order, &group, index);
        if regrouped {
            log::debug!("Regrouped {} selected tabs at index {}", group.len(), index);
            self.after_reorder();
        }
        regrouped
    }

    /// Finish a drag of `dragged` by dropping it on `target`
    pub fn drop_dragged(&mut self, dragged: TabRef, target: DropTarget) -> bool {
        if !self.contains(dragged) {
            return false;
        }
        let mut changed = false;
        if !self.is_selected(dragged) {
            changed = self.activate(dragged);
        }
        let group = self.selected_in_order();
        let moved = match target {
            DropTarget::Tab(target) if group.len() == 1 => self.move_one(dragged, target),
            DropTarget::Tab(target) => match self.position(target) {
                Some(index) => self.move_batch(&group, index),
                None => false,
            },
            DropTarget::End => {
                let end = self.order.len();
                self.move_batch(&group, end)
            }
        };
        changed || moved
    }

    /// Swap the active tab with its neighbour (no wrap-around)
    pub fn move_active(&mut self, direction: MoveDirection) -> bool {
        let Some(index) = self.active_index() else {
            return false;
        };
        let neighbour = match direction {
            MoveDirection::Left => index.checked_sub(1),
            MoveDirection::Right => Some(index + 1).filter(|i| *i < self.order.len()),
        };
        let Some(neighbour) = neighbour else {
            return false;
        };
        self.order.swap(index, neighbour);
        log::debug!("Moved active tab from index {} to {}", index, neighbour);
        self.after_reorder();
        true
    }

    fn after_reorder(&mut self) {
        self.renumber_default_terminals();
        self.debug_check();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::ClickModifiers;
    use crate::tab::workspace::tests::workspace_with;

    #[test]
    fn test_move_one_forward() {
        let mut order = vec![1, 2, 3, 4];
        // Target index is post-removal: 1 lands just before 3
        assert!(move_one_in(&mut order, 1, 3));
        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_move_one_backward() {
        let mut order = vec![1, 2, 3, 4];
        assert!(move_one_in(&mut order, 4, 2));
        assert_eq!(order, vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_move_one_noops() {
        let mut order = vec![1, 2, 3];
        assert!(!move_one_in(&mut order, 2, 2));
        assert!(!move_one_in(&mut order, 9, 1));
        assert!(!move_one_in(&mut order, 1, 9));
        // Dropping onto the right neighbour leaves it in place
        assert!(!move_one_in(&mut order, 1, 2));
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_batch_keeps_order_relative_not_caller_order() {
        let mut order = vec![1, 2, 3, 4, 5, 6];
        assert!(move_batch_in(&mut order, &[5, 2], 0));
        assert_eq!(order, vec![2, 5, 1, 3, 4, 6]);
    }

    #[test]
    fn test_move_batch_target_adjusted_for_removed_before() {
        let mut order = vec![1, 2, 3, 4, 5, 6];
        // Index 4 holds 5; two moved tabs sit before it, so the group lands at 2
        assert!(move_batch_in(&mut order, &[1, 3], 4));
        assert_eq!(order, vec![2, 4, 1, 3, 5, 6]);
    }

    #[test]
    fn test_move_batch_to_end() {
        let mut order = vec![1, 2, 3, 4];
        assert!(move_batch_in(&mut order, &[2, 1], 4));
        assert_eq!(order, vec![3, 4, 1, 2]);
        // Past-the-end indices clamp to the end
        assert!(move_batch_in(&mut order, &[3], 100));
        assert_eq!(order, vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_move_batch_noops() {
        let mut order = vec![1, 2, 3, 4];
        // Target is itself part of the batch
        assert!(!move_batch_in(&mut order, &[2, 3], 2));
        // Nothing in the batch is in the order
        assert!(!move_batch_in(&mut order, &[8, 9], 0));
        // Already in place
        assert!(!move_batch_in(&mut order, &[3, 4], 4));
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_drag_unselected_tab_collapses_selection() {
        let (mut ws, tabs) = workspace_with("etete");
        ws.select(tabs[0], ClickModifiers::NONE);
        ws.select(tabs[1], ClickModifiers::TOGGLE);

        assert!(ws.begin_drag(tabs[3]));
        assert_eq!(ws.selected_in_order(), vec![tabs[3]]);
        assert_eq!(ws.active(), Some(tabs[3]));

        assert!(ws.drop_dragged(tabs[3], DropTarget::Tab(tabs[0])));
        assert_eq!(
            ws.order(),
            &[tabs[3], tabs[0], tabs[1], tabs[2], tabs[4]][..]
        );
    }

    #[test]
    fn test_drag_selected_group_regroups_then_drops() {
        let (mut ws, tabs) = workspace_with("etete");
        ws.select(tabs[1], ClickModifiers::NONE);
        ws.select(tabs[3], ClickModifiers::TOGGLE);

        // Regroup at the dragged tab's index (3): the group becomes contiguous
        assert!(ws.begin_drag(tabs[3]));
        assert_eq!(
            ws.order(),
            &[tabs[0], tabs[2], tabs[1], tabs[3], tabs[4]][..]
        );

        assert!(ws.drop_dragged(tabs[3], DropTarget::End));
        assert_eq!(
            ws.order(),
            &[tabs[0], tabs[2], tabs[4], tabs[1], tabs[3]][..]
        );
        assert_eq!(ws.active(), Some(tabs[1]));
        ws.check_invariants().unwrap();
    }

    #[test]
    fn test_drop_group_on_tab() {
        let (mut ws, tabs) = workspace_with("etete");
        ws.select(tabs[3], ClickModifiers::NONE);
        ws.select(tabs[4], ClickModifiers::SHIFT);
        assert!(ws.drop_dragged(tabs[4], DropTarget::Tab(tabs[1])));
        assert_eq!(
            ws.order(),
            &[tabs[0], tabs[3], tabs[4], tabs[1], tabs[2]][..]
        );
        // Dropping onto a member of the group does nothing
        assert!(!ws.drop_dragged(tabs[4], DropTarget::Tab(tabs[3])));
    }

    #[test]
    fn test_move_active_left_right_without_wrap() {
        let (mut ws, tabs) = workspace_with("ete");
        ws.activate(tabs[0]);
        assert!(!ws.move_active(MoveDirection::Left));
        assert!(ws.move_active(MoveDirection::Right));
        assert_eq!(ws.order(), &[tabs[1], tabs[0], tabs[2]][..]);
        assert!(ws.move_active(MoveDirection::Right));
        assert!(!ws.move_active(MoveDirection::Right));
        assert_eq!(ws.order(), &[tabs[1], tabs[2], tabs[0]][..]);
    }

    #[test]
    fn test_reorder_renumbers_default_terminal_names() {
        let (mut ws, tabs) = workspace_with("tt");
        assert!(ws.move_one(tabs[1], tabs[0]));
        let first = ws.terminal(tabs[1].as_terminal().unwrap()).unwrap();
        assert_eq!(first.name, "Terminal 1");
    }
}
