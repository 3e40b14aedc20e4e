//! Horizon MsgList - a grouped, collapsible view over a flat message store.
//!
//! This is the main crate. It re-exports the core infrastructure
//! (errors, signals, logging, clocks) and adds:
//!
//! - [`model`]: grouping, position translation, collapse/expand, selection
//!   and row presentation
//! - [`config`]: [`GroupingConfig`](config::GroupingConfig) read from TOML
//!   or JSON
//! - [`loader`]: background group table builds
//!
//! # Example
//!
//! ```
//! use horizon_msglist::model::{GroupedCursor, MemoryRowStore, MessageRow, SortOrder};
//! use horizon_msglist::FixedClock;
//!
//! let store = MemoryRowStore::new(vec![
//!     MessageRow::new(1, 0).with_sender("Ann"),
//!     MessageRow::new(2, 0).with_sender("Ann"),
//!     MessageRow::new(3, 0).with_sender("Bob"),
//! ]);
//! let mut cursor =
//!     GroupedCursor::new(store, SortOrder::Sender, &FixedClock::from_millis_utc(0)).unwrap();
//!
//! assert_eq!(cursor.group_count(), 2);
//! while cursor.move_next().unwrap() {
//!     println!("{:?} {}", cursor.current_kind(), cursor.row_id().unwrap());
//! }
//! ```

pub use horizon_msglist_core::*;

pub mod config;
pub mod loader;
pub mod model;
