//! Core systems for Horizon MsgList.
//!
//! This crate provides the ambient infrastructure shared by the grouped
//! message list engine:
//!
//! - **Errors**: [`Error`] and the crate-wide [`Result`] alias
//! - **Signals**: [`Signal`] for change notifications to the presentation layer
//! - **Logging**: `tracing` targets, span names and [`PerfSpan`]
//! - **Clocks**: the [`Clock`] trait so "now" can be injected
//!
//! # Signal Example
//!
//! ```
//! use horizon_msglist_core::Signal;
//!
//! let selection_changed = Signal::<usize>::new();
//! selection_changed.connect(|count| println!("{count} selected"));
//! selection_changed.emit(3);
//! ```

pub mod clock;
mod error;
pub mod logging;
pub mod signal;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
