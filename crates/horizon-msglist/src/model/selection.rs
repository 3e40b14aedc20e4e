//! Selection tracking for a grouped message list.
//!
//! [`SelectionTracker`] keeps two separate identifier sets: selected rows and
//! selected groups. A group is identified by the row id of its first row, so
//! the same number can appear in both sets without ambiguity.
//!
//! Selecting a group selects every row in it, hidden or not, and expands the
//! group so the selection is visible. Selecting every row of a group does not
//! select the group.
//!
//! # Example
//!
//! ```
//! use horizon_msglist::model::{GroupedCursor, MemoryRowStore, MessageRow, SelectionTracker, SortOrder};
//! use horizon_msglist::FixedClock;
//!
//! let store = MemoryRowStore::new(vec![
//!     MessageRow::new(1, 0).with_subject("Hi"),
//!     MessageRow::new(2, 0).with_subject("Hi"),
//! ]);
//! let mut cursor =
//!     GroupedCursor::new(store, SortOrder::Subject, &FixedClock::from_millis_utc(0)).unwrap();
//! let mut selection = SelectionTracker::new();
//!
//! selection.selection_changed.connect(|count| println!("{count} selected"));
//! selection.set_group_selected(&mut cursor, 0, true).unwrap();
//!
//! assert!(selection.is_selected(1, true));
//! assert_eq!(selection.selected_count(), 2);
//! ```

use std::collections::HashSet;

use horizon_msglist_core::logging::{PerfSpan, span_names, targets};
use horizon_msglist_core::{Result, Signal};

use super::cursor::GroupedCursor;
use super::row_store::RowStore;

/// Outcome of a bulk group selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSelection {
    /// Identifier of the group.
    pub group_id: i64,
    /// Number of rows in the group.
    pub items_affected: usize,
    /// `true` if the group was collapsed and had to be expanded.
    pub layout_changed: bool,
}

/// Selected rows and groups of a message list.
///
/// Identifiers are kept across reloads; ids that no longer exist in the
/// store stay selected until cleared.
///
/// # Signals
///
/// - `selection_changed`: emitted after every change, with the number of
///   selected rows
pub struct SelectionTracker {
    selected_items: HashSet<i64>,
    selected_groups: HashSet<i64>,

    /// Emitted when the selection changes. Args: selected row count.
    pub selection_changed: Signal<usize>,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            selected_items: HashSet::new(),
            selected_groups: HashSet::new(),
            selection_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Selects or deselects the group headed at `visible` and all of its rows.
    ///
    /// The group is expanded first if it is collapsed. Rows are reached by
    /// flat position, so hidden rows are included. Returns `Ok(None)` if
    /// `visible` is not a header. The cursor's position is unchanged
    /// afterwards.
    ///
    /// The row ids are read before any set is touched, so a failed read
    /// leaves the selection as it was.
    pub fn set_group_selected<S: RowStore>(
        &mut self,
        cursor: &mut GroupedCursor<S>,
        visible: usize,
        selected: bool,
    ) -> Result<Option<GroupSelection>> {
        let _span = PerfSpan::new(span_names::SELECT_GROUP);

        let Some(group_id) = cursor.group_identifier(visible)? else {
            return Ok(None);
        };
        let Some(children) = cursor.child_row_ids(visible)? else {
            return Ok(None);
        };

        let mut changed = if selected {
            self.selected_groups.insert(group_id)
        } else {
            self.selected_groups.remove(&group_id)
        };
        let layout_changed = cursor.show_group(visible)?;
        for id in &children {
            changed |= if selected {
                self.selected_items.insert(*id)
            } else {
                self.selected_items.remove(id)
            };
        }

        tracing::debug!(
            target: targets::SELECTION,
            group_id,
            items = children.len(),
            selected,
            layout_changed,
            "group selection"
        );
        if changed {
            self.emit_changed();
        }

        Ok(Some(GroupSelection {
            group_id,
            items_affected: children.len(),
            layout_changed,
        }))
    }

    /// Flips the selection of the group headed at `visible`.
    pub fn toggle_group<S: RowStore>(
        &mut self,
        cursor: &mut GroupedCursor<S>,
        visible: usize,
    ) -> Result<Option<GroupSelection>> {
        let Some(group_id) = cursor.group_identifier(visible)? else {
            return Ok(None);
        };
        let selected = !self.selected_groups.contains(&group_id);
        self.set_group_selected(cursor, visible, selected)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Selects or deselects a single row. Returns `true` if anything changed.
    pub fn set_item_selected(&mut self, id: i64, selected: bool) -> bool {
        let changed = if selected {
            self.selected_items.insert(id)
        } else {
            self.selected_items.remove(&id)
        };
        if changed {
            self.emit_changed();
        }
        changed
    }

    /// Flips the selection of a single row and returns the new state.
    pub fn toggle_item(&mut self, id: i64) -> bool {
        let selected = !self.selected_items.contains(&id);
        self.set_item_selected(id, selected);
        selected
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if `id` is in the group set (`is_group`) or the row set.
    pub fn is_selected(&self, id: i64, is_group: bool) -> bool {
        if is_group {
            self.selected_groups.contains(&id)
        } else {
            self.selected_items.contains(&id)
        }
    }

    /// Number of selected rows.
    pub fn selected_count(&self) -> usize {
        self.selected_items.len()
    }

    /// Number of selected groups.
    pub fn selected_group_count(&self) -> usize {
        self.selected_groups.len()
    }

    /// Returns `true` if any row or group is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected_items.is_empty() || !self.selected_groups.is_empty()
    }

    /// Selected row ids, in no particular order.
    pub fn selected_items(&self) -> impl Iterator<Item = i64> + '_ {
        self.selected_items.iter().copied()
    }

    /// Selected group ids, in no particular order.
    pub fn selected_groups(&self) -> impl Iterator<Item = i64> + '_ {
        self.selected_groups.iter().copied()
    }

    // =========================================================================
    // Clearing
    // =========================================================================

    /// Empties both sets.
    ///
    /// Returns `true` and emits `selection_changed` only if something was
    /// selected.
    pub fn clear(&mut self) -> bool {
        if !self.has_selection() {
            return false;
        }
        self.selected_items.clear();
        self.selected_groups.clear();
        tracing::debug!(target: targets::SELECTION, "selection cleared");
        self.emit_changed();
        true
    }

    fn emit_changed(&self) {
        self.selection_changed.emit(self.selected_items.len());
    }
}
