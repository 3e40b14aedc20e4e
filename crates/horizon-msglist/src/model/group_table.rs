//! Group table: the two-level view over a flat row store.
//!
//! A [`GroupTable`] holds one [`GroupEntry`] per row plus one synthetic header
//! entry per group, in construction order. It never copies row data; entries
//! only carry the flat position of the row they stand for. A header carries
//! the flat position of its first child.
//!
//! ```text
//! flat rows:   0      1      2      3
//! entries:   [H0] [C0] [C1] [H2] [C2] [C3]
//!             |          |
//!             item_count 2   item_count 2
//! ```
//!
//! The table is built once per load. Afterwards only the collapse/expand
//! flags change.

use std::ops::Range;

use horizon_msglist_core::logging::{PerfSpan, span_names};
use horizon_msglist_core::{Clock, Result, grouping_debug};

use super::classifier::{RowKey, SortOrder, starts_new_group};
use super::row_store::{BEFORE_FIRST, RowStore};
use super::translator;

/// What an entry renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A group header, with the number of rows in its group.
    Header {
        /// Number of child rows in the group.
        item_count: usize,
    },
    /// A regular message row.
    Item,
}

impl RowKind {
    /// Returns `true` for [`RowKind::Header`].
    pub fn is_header(&self) -> bool {
        matches!(self, RowKind::Header { .. })
    }
}

/// One entry of a [`GroupTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupEntry {
    flat_position: usize,
    is_group_header: bool,
    /// Children: visible flag. Headers: expanded flag.
    shown: bool,
    item_count: usize,
}

impl GroupEntry {
    fn header(flat_position: usize, expanded: bool) -> Self {
        Self {
            flat_position,
            is_group_header: true,
            shown: expanded,
            item_count: 0,
        }
    }

    fn child(flat_position: usize, shown: bool) -> Self {
        Self {
            flat_position,
            is_group_header: false,
            shown,
            item_count: 0,
        }
    }

    /// Index into the backing row store.
    #[inline]
    pub fn flat_position(&self) -> usize {
        self.flat_position
    }

    /// Returns `true` for the synthetic entry that opens a group.
    #[inline]
    pub fn is_group_header(&self) -> bool {
        self.is_group_header
    }

    /// Returns `true` if the entry contributes to the visible list.
    ///
    /// Headers are always visible.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.is_group_header || self.shown
    }

    /// Returns `true` for a header whose children are shown.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.is_group_header && self.shown
    }

    /// Number of children of a header; `0` for children.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the render kind of this entry.
    pub fn kind(&self) -> RowKind {
        if self.is_group_header {
            RowKind::Header {
                item_count: self.item_count,
            }
        } else {
            RowKind::Item
        }
    }
}

/// The table indices covered by one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpan {
    /// Table index of the header entry.
    pub header: usize,
    /// Table indices of the child entries.
    pub children: Range<usize>,
}

impl GroupSpan {
    /// Number of children in the group.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered header and child entries over a row store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    entries: Vec<GroupEntry>,
    sort_order: Option<SortOrder>,
    group_count: usize,
}

impl GroupTable {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table with every group expanded.
    ///
    /// See [`GroupTable::build_with_state`].
    pub fn build<S>(store: &mut S, sort_order: SortOrder, clock: &dyn Clock) -> Result<Self>
    where
        S: RowStore + ?Sized,
    {
        Self::build_with_state(store, sort_order, clock, true)
    }

    /// Builds a table in one forward pass over `store`.
    ///
    /// Reads "now" once from `clock`, so the result is deterministic for a
    /// given store, sort order and clock reading. The store is left before
    /// the first row on success.
    pub fn build_with_state<S>(
        store: &mut S,
        sort_order: SortOrder,
        clock: &dyn Clock,
        expanded: bool,
    ) -> Result<Self>
    where
        S: RowStore + ?Sized,
    {
        let _span = PerfSpan::new(span_names::BUILD_GROUPS);
        let now = clock.now_millis();
        let row_count = store.row_count();

        let mut entries = Vec::with_capacity(row_count + row_count / 4 + 1);
        let mut group_count = 0;
        let mut header: Option<usize> = None;
        let mut previous: Option<RowKey> = None;

        store.seek(BEFORE_FIRST)?;
        for position in 0..row_count {
            store.seek(position as isize)?;
            let key = store.key()?;

            if starts_new_group(sort_order, previous.as_ref(), &key, now, clock) {
                header = Some(entries.len());
                entries.push(GroupEntry::header(position, expanded));
                group_count += 1;
            }
            entries.push(GroupEntry::child(position, expanded));
            if let Some(index) = header {
                entries[index].item_count += 1;
            }
            previous = Some(key);
        }
        store.seek(BEFORE_FIRST)?;

        grouping_debug!(rows = row_count, groups = group_count, ?sort_order, "built group table");

        Ok(Self {
            entries,
            sort_order: Some(sort_order),
            group_count,
        })
    }

    /// All entries in order.
    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// The entry at a table index.
    pub fn entry(&self, index: usize) -> Option<&GroupEntry> {
        self.entries.get(index)
    }

    /// Number of entries (rows plus headers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of groups (header entries).
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// The sort order the table was built for; `None` for [`GroupTable::empty`].
    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    /// Number of entries that are headers or shown.
    pub fn visible_count(&self) -> usize {
        translator::visible_count(&self.entries)
    }

    /// Flips the group whose header is at `index`.
    ///
    /// Returns `false` without changing anything if `index` is not a header.
    /// The header itself stays visible; the new flag is copied onto every
    /// child up to the next header.
    pub fn toggle_group(&mut self, index: usize) -> bool {
        let Some(header) = self.entries.get_mut(index) else {
            return false;
        };
        if !header.is_group_header {
            return false;
        }

        let show = !header.shown;
        header.shown = show;
        for entry in self.entries[index + 1..]
            .iter_mut()
            .take_while(|e| !e.is_group_header)
        {
            entry.shown = show;
        }

        grouping_debug!(header = index, expanded = show, "toggled group");
        true
    }

    /// Expands the group at `index` if it is collapsed.
    ///
    /// Returns `true` only if the group was collapsed and is now expanded.
    pub fn show_group(&mut self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) if entry.is_group_header && !entry.shown => self.toggle_group(index),
            _ => false,
        }
    }

    /// Number of children of the header at `index`; `0` if not a header.
    pub fn item_count_for_group(&self, index: usize) -> usize {
        self.entries
            .get(index)
            .filter(|e| e.is_group_header)
            .map_or(0, |e| e.item_count)
    }

    /// Sets every group to `expanded`.
    ///
    /// Returns `true` if any group changed.
    pub fn set_all_expanded(&mut self, expanded: bool) -> bool {
        let mut changed = false;
        let mut in_group = false;
        for entry in &mut self.entries {
            if entry.is_group_header {
                changed |= entry.shown != expanded;
                in_group = true;
            }
            if in_group {
                entry.shown = expanded;
            }
        }
        if changed {
            grouping_debug!(expanded, "set all groups");
        }
        changed
    }

    /// The span of the group whose header is at `index`.
    pub fn group_span(&self, index: usize) -> Option<GroupSpan> {
        let header = self.entries.get(index)?;
        if !header.is_group_header {
            return None;
        }
        let start = index + 1;
        let end = start
            + self.entries[start..]
                .iter()
                .take_while(|e| !e.is_group_header)
                .count();
        Some(GroupSpan {
            header: index,
            children: start..end,
        })
    }

    /// Iterates over all groups in order.
    pub fn groups(&self) -> impl Iterator<Item = GroupSpan> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_group_header)
            .filter_map(|(index, _)| self.group_span(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row_store::{MemoryRowStore, MessageRow};
    use horizon_msglist_core::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::from_millis_utc(1_792_324_800_000)
    }

    fn subjects(subjects: &[Option<&str>]) -> MemoryRowStore {
        subjects
            .iter()
            .enumerate()
            .map(|(i, s)| MessageRow {
                id: 100 + i as i64,
                timestamp: 0,
                subject: s.map(str::to_owned),
                sender: None,
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn build(subjects_list: &[Option<&str>]) -> GroupTable {
        let mut store = subjects(subjects_list);
        GroupTable::build(&mut store, SortOrder::Subject, &clock()).unwrap()
    }

    #[test]
    fn test_build_interleaves_headers() {
        let table = build(&[Some("a"), Some("a"), Some("b")]);

        let shape: Vec<_> = table
            .entries()
            .iter()
            .map(|e| (e.is_group_header(), e.flat_position()))
            .collect();
        assert_eq!(
            shape,
            vec![(true, 0), (false, 0), (false, 1), (true, 2), (false, 2)]
        );
        assert_eq!(table.group_count(), 2);
        assert_eq!(table.len(), 3 + 2);
        assert_eq!(table.sort_order(), Some(SortOrder::Subject));
    }

    #[test]
    fn test_build_counts_items() {
        let table = build(&[Some("a"), Some("a"), Some("b")]);
        assert_eq!(table.item_count_for_group(0), 2);
        assert_eq!(table.item_count_for_group(3), 1);
        assert_eq!(table.item_count_for_group(1), 0);
        assert_eq!(table.item_count_for_group(99), 0);
    }

    #[test]
    fn test_build_rewinds_store() {
        let mut store = subjects(&[Some("a"), Some("b")]);
        GroupTable::build(&mut store, SortOrder::Subject, &clock()).unwrap();
        assert_eq!(store.position(), BEFORE_FIRST);
    }

    #[test]
    fn test_build_empty_store() {
        let mut store = MemoryRowStore::default();
        let table = GroupTable::build(&mut store, SortOrder::DateDesc, &clock()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.visible_count(), 0);
        assert_eq!(table.groups().count(), 0);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rows = [Some("a"), None, None, Some("b"), Some("b")];
        assert_eq!(build(&rows), build(&rows));
    }

    #[test]
    fn test_build_collapsed() {
        let mut store = subjects(&[Some("a"), Some("a"), Some("b")]);
        let table =
            GroupTable::build_with_state(&mut store, SortOrder::Subject, &clock(), false).unwrap();
        assert_eq!(table.visible_count(), 2);
        assert!(!table.entry(0).unwrap().is_expanded());
    }

    #[test]
    fn test_toggle_non_header_is_noop() {
        let mut table = build(&[Some("a"), Some("a")]);
        let before = table.clone();
        assert!(!table.toggle_group(1));
        assert!(!table.toggle_group(42));
        assert_eq!(table, before);
    }

    #[test]
    fn test_toggle_only_touches_own_group() {
        let mut table = build(&[Some("a"), Some("a"), Some("b")]);
        assert!(table.toggle_group(0));

        let visible: Vec<_> = table.entries().iter().map(|e| e.is_visible()).collect();
        assert_eq!(visible, vec![true, false, false, true, true]);
        assert!(!table.entry(0).unwrap().is_expanded());
        assert!(table.entry(3).unwrap().is_expanded());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut table = build(&[Some("a"), Some("a"), Some("b"), Some("b")]);
        let before = table.clone();
        table.toggle_group(3);
        assert_ne!(table, before);
        table.toggle_group(3);
        assert_eq!(table, before);
    }

    #[test]
    fn test_show_group() {
        let mut table = build(&[Some("a"), Some("a")]);
        assert!(!table.show_group(0));
        table.toggle_group(0);
        assert!(table.show_group(0));
        assert!(table.entry(0).unwrap().is_expanded());
        assert!(!table.show_group(1));
    }

    #[test]
    fn test_set_all_expanded() {
        let mut table = build(&[Some("a"), Some("b"), Some("c")]);
        assert!(table.set_all_expanded(false));
        assert_eq!(table.visible_count(), 3);
        assert!(!table.set_all_expanded(false));
        assert!(table.set_all_expanded(true));
        assert_eq!(table.visible_count(), 6);
    }

    #[test]
    fn test_groups_iterator() {
        let table = build(&[Some("a"), Some("a"), None, Some("b")]);
        let spans: Vec<_> = table.groups().collect();
        assert_eq!(
            spans,
            vec![
                GroupSpan { header: 0, children: 1..3 },
                GroupSpan { header: 3, children: 4..5 },
                GroupSpan { header: 5, children: 6..7 },
            ]
        );
        assert!(table.group_span(1).is_none());
    }

    #[test]
    fn test_build_extreme_timestamps() {
        let mut store = MemoryRowStore::new(vec![
            MessageRow::new(1, i64::MAX),
            MessageRow::new(2, i64::MIN),
            MessageRow::new(3, i64::MIN),
        ]);
        let table = GroupTable::build(&mut store, SortOrder::DateDesc, &clock()).unwrap();
        assert_eq!(table.group_count(), 1);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_row_kind() {
        let table = build(&[Some("a"), Some("a")]);
        assert_eq!(table.entry(0).unwrap().kind(), RowKind::Header { item_count: 2 });
        assert!(table.entry(0).unwrap().kind().is_header());
        assert_eq!(table.entry(2).unwrap().kind(), RowKind::Item);
    }
}
