//! Logging facilities for Horizon MsgList.
//!
//! Horizon MsgList uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_msglist::grouping=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_msglist_core";
    /// Signal emission target.
    pub const SIGNAL: &str = "horizon_msglist_core::signal";
    /// Group table construction and collapse/expand.
    pub const GROUPING: &str = "horizon_msglist::grouping";
    /// Cursor navigation.
    pub const CURSOR: &str = "horizon_msglist::cursor";
    /// Selection tracking.
    pub const SELECTION: &str = "horizon_msglist::selection";
    /// Background loading.
    pub const LOADER: &str = "horizon_msglist::loader";
}

/// Span names used for performance tracing.
pub mod span_names {
    /// Group table build span.
    pub const BUILD_GROUPS: &str = "build_groups";
    /// Bulk group selection span.
    pub const SELECT_GROUP: &str = "select_group";
}

/// A guard that records the duration of an operation as a tracing span.
///
/// # Example
///
/// ```
/// use horizon_msglist_core::logging::{span_names, PerfSpan};
///
/// {
///     let _span = PerfSpan::new(span_names::BUILD_GROUPS);
///     // ... expensive work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span, active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_msglist::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Debug-level event under the grouping target.
#[macro_export]
macro_rules! grouping_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::GROUPING, $($arg)*)
    };
}

/// Trace-level event under the cursor target.
#[macro_export]
macro_rules! cursor_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CURSOR, $($arg)*)
    };
}
