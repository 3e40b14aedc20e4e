//! Grouped message list model.
//!
//! This module turns a flat, ordered [`RowStore`] into a two-level list of
//! group headers and message rows:
//!
//! - [`classifier`]: decides where groups start for a [`SortOrder`]
//! - [`group_table`]: the [`GroupTable`] built in one pass over the store
//! - [`translator`]: visible position to flat position mapping
//! - [`cursor`]: [`GroupedCursor`], navigation and collapse/expand
//! - [`selection`]: [`SelectionTracker`] for rows and whole groups
//! - [`delegate`]: [`RowDelegate`] and date labels for rendering
//!
//! The store is never copied or modified. The table is rebuilt on every load
//! and only its collapse/expand flags change in between.

pub mod classifier;
pub mod cursor;
pub mod delegate;
pub mod group_table;
pub mod row_store;
pub mod selection;
pub mod translator;

pub use classifier::{GroupCriterion, RowKey, SortOrder, starts_new_group};
pub use cursor::{CursorSignals, GroupedCursor};
pub use delegate::{DateLabelFormat, DateLabelMemo, RowDelegate, RowDisplay, relative_date_label};
pub use group_table::{GroupEntry, GroupSpan, GroupTable, RowKind};
pub use row_store::{BEFORE_FIRST, Column, ColumnValue, MemoryRowStore, MessageRow, RowStore};
pub use selection::{GroupSelection, SelectionTracker};
