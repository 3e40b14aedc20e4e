//! Grouped cursor over a row store.
//!
//! [`GroupedCursor`] owns a [`RowStore`] and the [`GroupTable`] built for it,
//! and exposes the list in *visible* coordinates: headers plus the children
//! of expanded groups. All navigation goes through the position translator
//! and then seeks the store, so column reads always see the row under the
//! current visible position. A header shares its row with its first child.
//!
//! # Example
//!
//! ```
//! use horizon_msglist::model::{GroupedCursor, MemoryRowStore, MessageRow, RowKind, SortOrder};
//! use horizon_msglist::FixedClock;
//!
//! let store = MemoryRowStore::new(vec![
//!     MessageRow::new(1, 0).with_subject("Hi"),
//!     MessageRow::new(2, 0).with_subject("Hi"),
//! ]);
//! let clock = FixedClock::from_millis_utc(0);
//! let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock).unwrap();
//!
//! assert_eq!(cursor.count(), 3);
//! assert_eq!(cursor.entry_kind(0), Some(RowKind::Header { item_count: 2 }));
//!
//! cursor.toggle_group(0).unwrap();
//! assert_eq!(cursor.count(), 1);
//! ```

use horizon_msglist_core::{Clock, Result, Signal, cursor_trace};

use super::classifier::SortOrder;
use super::group_table::{GroupEntry, GroupTable, RowKind};
use super::row_store::{BEFORE_FIRST, RowStore};
use super::translator;
use crate::config::GroupingConfig;
use crate::loader::LoadedGroups;

/// Signals emitted by a [`GroupedCursor`].
pub struct CursorSignals {
    /// Emitted after a group is collapsed or expanded.
    pub layout_changed: Signal<()>,
    /// Emitted after the store and table are replaced, or grouping is
    /// switched on or off.
    pub model_reset: Signal<()>,
}

impl Default for CursorSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorSignals {
    /// Creates a new set of cursor signals.
    pub fn new() -> Self {
        Self {
            layout_changed: Signal::new(),
            model_reset: Signal::new(),
        }
    }
}

/// A two-level, collapsible view over a flat row store.
pub struct GroupedCursor<S: RowStore> {
    store: S,
    table: GroupTable,
    grouping_enabled: bool,
    /// Last visible position reached through navigation.
    last_visible: isize,
    signals: CursorSignals,
}

impl<S: RowStore> GroupedCursor<S> {
    /// Groups `store` by `sort_order` with every group expanded.
    pub fn new(mut store: S, sort_order: SortOrder, clock: &dyn Clock) -> Result<Self> {
        let table = GroupTable::build(&mut store, sort_order, clock)?;
        Ok(Self::from_parts(store, table))
    }

    /// Groups `store` as described by `config`.
    ///
    /// The table is always built so groups keep their state if grouping is
    /// switched on later.
    pub fn with_config(mut store: S, config: &GroupingConfig, clock: &dyn Clock) -> Result<Self> {
        let table = GroupTable::build_with_state(
            &mut store,
            config.sort_order,
            clock,
            config.expanded_by_default,
        )?;
        let mut cursor = Self::from_parts(store, table);
        cursor.grouping_enabled = config.enabled;
        Ok(cursor)
    }

    /// Wraps a store and a table already built for it.
    ///
    /// The store should be positioned before its first row.
    pub fn from_parts(store: S, table: GroupTable) -> Self {
        Self {
            store,
            table,
            grouping_enabled: true,
            last_visible: BEFORE_FIRST,
            signals: CursorSignals::new(),
        }
    }

    /// Wraps the result of a background load.
    ///
    /// Grouping is enabled as the load's config asked, matching
    /// [`GroupedCursor::with_config`].
    pub fn from_loaded(loaded: LoadedGroups<S>) -> Self {
        let grouping_enabled = loaded.is_grouping_enabled();
        let (store, table) = loaded.into_parts();
        let mut cursor = Self::from_parts(store, table);
        cursor.grouping_enabled = grouping_enabled;
        cursor
    }

    /// Swaps in a freshly loaded store and table and returns the old store.
    ///
    /// Takes the grouping mode from the load, resets the position to "before
    /// first" and emits `model_reset`. Connections to the signals are kept.
    pub fn replace_load(&mut self, loaded: LoadedGroups<S>) -> S {
        let generation = loaded.generation();
        self.grouping_enabled = loaded.is_grouping_enabled();
        let (store, table) = loaded.into_parts();
        self.table = table;
        self.last_visible = BEFORE_FIRST;
        let old = std::mem::replace(&mut self.store, store);
        cursor_trace!(generation, rows = self.store.row_count(), "installed load");
        self.signals.model_reset.emit(());
        old
    }

    /// The cursor's signals.
    pub fn signals(&self) -> &CursorSignals {
        &self.signals
    }

    /// The group table.
    pub fn table(&self) -> &GroupTable {
        &self.table
    }

    /// The underlying row store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the cursor and returns the row store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// The sort order the table was built for.
    pub fn sort_order(&self) -> Option<SortOrder> {
        self.table.sort_order()
    }

    /// Returns `true` if the grouped view is active.
    pub fn is_grouping_enabled(&self) -> bool {
        self.grouping_enabled
    }

    /// Switches between the grouped view and a passthrough over the flat
    /// store.
    ///
    /// Rewinds to "before first" and emits `model_reset` when the mode
    /// changes. Collapse state is kept.
    pub fn set_grouping_enabled(&mut self, enabled: bool) -> Result<bool> {
        if self.grouping_enabled == enabled {
            return Ok(false);
        }
        self.grouping_enabled = enabled;
        self.store.seek(BEFORE_FIRST)?;
        self.last_visible = BEFORE_FIRST;
        self.signals.model_reset.emit(());
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Counts and entries
    // -------------------------------------------------------------------------

    /// Number of rows in the visible list.
    pub fn count(&self) -> usize {
        if self.grouping_enabled {
            self.table.visible_count()
        } else {
            self.store.row_count()
        }
    }

    /// Number of groups; `0` while grouping is disabled.
    pub fn group_count(&self) -> usize {
        if self.grouping_enabled {
            self.table.group_count()
        } else {
            0
        }
    }

    /// Table index of the entry at a visible position.
    fn entry_index(&self, visible: usize) -> Option<usize> {
        if !self.grouping_enabled {
            return None;
        }
        let index = translator::entry_index_for_visible(self.table.entries(), visible as isize);
        usize::try_from(index).ok().filter(|&i| i < self.table.len())
    }

    /// The table entry at a visible position.
    pub fn entry_at(&self, visible: usize) -> Option<&GroupEntry> {
        self.entry_index(visible).and_then(|i| self.table.entry(i))
    }

    /// Whether the row at `visible` renders as a header or an item.
    ///
    /// Returns `None` past the end of the list.
    pub fn entry_kind(&self, visible: usize) -> Option<RowKind> {
        if self.grouping_enabled {
            self.entry_at(visible).map(GroupEntry::kind)
        } else {
            (visible < self.store.row_count()).then_some(RowKind::Item)
        }
    }

    /// Number of rows in the group headed at `visible`; `0` if not a header.
    pub fn item_count_label(&self, visible: usize) -> usize {
        self.item_count_for_group(visible)
    }

    /// Render kind at the current position.
    pub fn current_kind(&self) -> Option<RowKind> {
        usize::try_from(self.last_visible)
            .ok()
            .and_then(|v| self.entry_kind(v))
    }

    /// Returns `true` if the current position is a group header.
    pub fn is_group_header(&self) -> bool {
        self.current_kind().is_some_and(|k| k.is_header())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Last visible position reached by navigation.
    ///
    /// `-1` before the first row and `count()` after the last. Collapsing or
    /// expanding a group earlier in the list does not adjust it.
    pub fn position(&self) -> isize {
        self.last_visible
    }

    fn flat_for_visible(&self, visible: isize) -> isize {
        if self.grouping_enabled {
            // An empty table passes positions through; cap at the after-last row.
            translator::flat_position_for_visible(self.table.entries(), visible)
                .min(self.store.row_count() as isize)
        } else {
            visible
        }
    }

    /// Moves to a visible position and seeks the store to its row.
    ///
    /// Returns `Ok(true)` on a row and `Ok(false)` on the before-first or
    /// after-last sentinel. With grouping enabled, positions past the end
    /// land on the after-last sentinel. Positions below `-1` fail with
    /// [`Error::OutOfRange`](horizon_msglist_core::Error::OutOfRange) and
    /// leave the cursor unchanged.
    pub fn move_to_visible(&mut self, visible: isize) -> Result<bool> {
        let flat = self.flat_for_visible(visible);
        let on_row = self.store.seek(flat)?;
        self.last_visible = if on_row {
            visible
        } else if flat < 0 {
            BEFORE_FIRST
        } else {
            self.count() as isize
        };
        cursor_trace!(visible, flat, on_row, "moved");
        Ok(on_row)
    }

    /// Moves to the next visible row, stopping at the after-last sentinel.
    pub fn move_next(&mut self) -> Result<bool> {
        let target = (self.last_visible + 1).min(self.count() as isize);
        self.move_to_visible(target)
    }

    /// Moves to the previous visible row, stopping at the before-first
    /// sentinel.
    pub fn move_previous(&mut self) -> Result<bool> {
        let target = (self.last_visible - 1).max(BEFORE_FIRST);
        self.move_to_visible(target)
    }

    /// Moves by `offset` visible rows from the current position.
    pub fn move_by(&mut self, offset: isize) -> Result<bool> {
        self.move_to_visible(self.last_visible + offset)
    }

    /// Moves to the first visible row.
    pub fn move_to_first(&mut self) -> Result<bool> {
        self.move_to_visible(0)
    }

    /// Moves to the last visible row.
    pub fn move_to_last(&mut self) -> Result<bool> {
        self.move_to_visible(self.count() as isize - 1)
    }

    /// Returns `true` if the cursor is before the first row.
    pub fn is_before_first(&self) -> bool {
        self.last_visible < 0
    }

    /// Returns `true` if the cursor is after the last row.
    pub fn is_after_last(&self) -> bool {
        self.last_visible >= self.count() as isize
    }

    // -------------------------------------------------------------------------
    // Column access
    // -------------------------------------------------------------------------

    /// Identifier of the row under the cursor.
    pub fn row_id(&self) -> Result<i64> {
        self.store.row_id()
    }

    /// Timestamp of the row under the cursor.
    pub fn timestamp(&self) -> Result<i64> {
        self.store.timestamp()
    }

    /// Subject of the row under the cursor.
    pub fn subject(&self) -> Result<Option<&str>> {
        self.store.subject()
    }

    /// Sender of the row under the cursor.
    pub fn sender(&self) -> Result<Option<&str>> {
        self.store.sender()
    }

    // -------------------------------------------------------------------------
    // Collapse / expand
    // -------------------------------------------------------------------------

    /// Flips the group headed at `visible`.
    ///
    /// Returns `false` if `visible` is not a header. Emits `layout_changed`
    /// otherwise.
    pub fn toggle_group(&mut self, visible: usize) -> Result<bool> {
        let Some(index) = self.entry_index(visible) else {
            return Ok(false);
        };
        if !self.table.toggle_group(index) {
            return Ok(false);
        }
        self.signals.layout_changed.emit(());
        Ok(true)
    }

    /// Expands the group headed at `visible` if it is collapsed.
    ///
    /// Returns `true` only if the group was expanded by this call.
    pub fn show_group(&mut self, visible: usize) -> Result<bool> {
        match self.is_group_expanded(visible) {
            Some(false) => self.toggle_group(visible),
            _ => Ok(false),
        }
    }

    /// Number of rows in the group headed at `visible`; `0` if not a header.
    pub fn item_count_for_group(&self, visible: usize) -> usize {
        self.entry_index(visible)
            .map_or(0, |i| self.table.item_count_for_group(i))
    }

    /// Expanded flag of the group headed at `visible`; `None` if not a header.
    pub fn is_group_expanded(&self, visible: usize) -> Option<bool> {
        self.entry_at(visible)
            .filter(|e| e.is_group_header())
            .map(GroupEntry::is_expanded)
    }

    /// Expands every group. Emits `layout_changed` if anything changed.
    pub fn expand_all(&mut self) -> bool {
        self.set_all_expanded(true)
    }

    /// Collapses every group. Emits `layout_changed` if anything changed.
    pub fn collapse_all(&mut self) -> bool {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> bool {
        if !self.grouping_enabled || !self.table.set_all_expanded(expanded) {
            return false;
        }
        self.signals.layout_changed.emit(());
        true
    }

    // -------------------------------------------------------------------------
    // Group membership
    // -------------------------------------------------------------------------

    /// Identifier of the group headed at `visible`: the row id of its first
    /// row. `None` if not a header.
    ///
    /// The store position is restored before returning.
    pub fn group_identifier(&mut self, visible: usize) -> Result<Option<i64>> {
        let Some(entry) = self.entry_at(visible).filter(|e| e.is_group_header()).copied() else {
            return Ok(None);
        };
        self.with_saved_position(|store| {
            store.seek(entry.flat_position() as isize)?;
            store.row_id().map(Some)
        })
    }

    /// Row ids of every row in the group headed at `visible`, hidden or not.
    ///
    /// `None` if not a header. The store position is restored before
    /// returning.
    pub fn child_row_ids(&mut self, visible: usize) -> Result<Option<Vec<i64>>> {
        let Some(span) = self
            .entry_index(visible)
            .and_then(|i| self.table.group_span(i))
        else {
            return Ok(None);
        };
        let positions: Vec<isize> = self.table.entries()[span.children]
            .iter()
            .map(|e| e.flat_position() as isize)
            .collect();

        self.with_saved_position(|store| {
            let mut ids = Vec::with_capacity(positions.len());
            for position in positions {
                store.seek(position)?;
                ids.push(store.row_id()?);
            }
            Ok(Some(ids))
        })
    }

    fn with_saved_position<T>(&mut self, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
        let saved = self.store.position();
        let result = f(&mut self.store);
        self.store.seek(saved)?;
        result
    }
}
