//! Error types for Horizon MsgList.

use std::path::PathBuf;

/// Result type alias for message list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while grouping, navigating, or loading a message list.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A seek landed outside the rows and outside both sentinels.
    ///
    /// Positions `-1` (before first) and `row_count` (after last) are
    /// boundary states and never produce this error.
    #[error("position {position} is out of range for a store of {row_count} rows")]
    OutOfRange { position: isize, row_count: usize },

    /// A column was read while the store cursor sat on a sentinel.
    #[error("no current row: the store cursor is before the first or after the last row")]
    NoCurrentRow,

    /// Invalid configuration contents.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Failed to read a configuration file.
    #[error("failed to read configuration '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background loader thread exited before delivering a result.
    #[error("the background loader disconnected before delivering a result")]
    LoaderDisconnected,

    /// The background loader thread could not be started.
    #[error("failed to spawn the loader thread: {source}")]
    LoaderSpawn {
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an out-of-range error.
    pub fn out_of_range(position: isize, row_count: usize) -> Self {
        Self::OutOfRange {
            position,
            row_count,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a configuration I/O error.
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for [`Error::OutOfRange`].
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
