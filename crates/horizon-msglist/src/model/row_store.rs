//! Row store abstraction.
//!
//! A [`RowStore`] is an ordered, randomly seekable sequence of message rows
//! with stable positions. The grouping engine only reads it: it seeks to a
//! flat position and reads the columns of the row under the store cursor.
//!
//! Two positions outside the rows are valid boundary states:
//!
//! - `-1`: before the first row
//! - `row_count`: after the last row
//!
//! Seeking to either succeeds with `Ok(false)`. Any other position outside
//! `[0, row_count)` fails with [`Error::OutOfRange`].

use horizon_msglist_core::{Error, Result};

use super::classifier::RowKey;

/// The "before first" sentinel position.
pub const BEFORE_FIRST: isize = -1;

/// Columns the grouping engine reads from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Unique row identifier.
    Id,
    /// Message timestamp in milliseconds since the Unix epoch.
    Timestamp,
    /// Subject text, nullable.
    Subject,
    /// Sender display name, nullable.
    Sender,
}

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// An integer column (identifier or timestamp).
    Integer(i64),
    /// A nullable text column.
    Text(Option<String>),
}

impl ColumnValue {
    /// Returns the integer value, if this is an integer column.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(v) => Some(*v),
            ColumnValue::Text(_) => None,
        }
    }

    /// Returns the text value, if this is a non-null text column.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(v) => v.as_deref(),
            ColumnValue::Integer(_) => None,
        }
    }
}

/// An ordered, seekable sequence of message rows.
///
/// Column accessors read the row under the store cursor and fail with
/// [`Error::NoCurrentRow`] while the cursor sits on a sentinel.
pub trait RowStore {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Moves the store cursor to `position`.
    ///
    /// Returns `Ok(true)` on a row, `Ok(false)` on one of the two sentinels.
    fn seek(&mut self, position: isize) -> Result<bool>;

    /// Returns the current store cursor position, `-1` through `row_count`.
    fn position(&self) -> isize;

    /// Unique identifier of the current row.
    fn row_id(&self) -> Result<i64>;

    /// Timestamp of the current row in epoch milliseconds.
    fn timestamp(&self) -> Result<i64>;

    /// Subject of the current row.
    fn subject(&self) -> Result<Option<&str>>;

    /// Sender display name of the current row.
    fn sender(&self) -> Result<Option<&str>>;

    /// Reads a column of the current row as a typed value.
    fn column(&self, column: Column) -> Result<ColumnValue> {
        Ok(match column {
            Column::Id => ColumnValue::Integer(self.row_id()?),
            Column::Timestamp => ColumnValue::Integer(self.timestamp()?),
            Column::Subject => ColumnValue::Text(self.subject()?.map(str::to_owned)),
            Column::Sender => ColumnValue::Text(self.sender()?.map(str::to_owned)),
        })
    }

    /// Captures the grouping-relevant columns of the current row.
    fn key(&self) -> Result<RowKey> {
        Ok(RowKey {
            timestamp: self.timestamp()?,
            subject: self.subject()?.map(str::to_owned),
            sender: self.sender()?.map(str::to_owned),
        })
    }

    /// Returns `true` if the cursor is before the first row.
    fn is_before_first(&self) -> bool {
        self.position() < 0
    }

    /// Returns `true` if the cursor is after the last row.
    fn is_after_last(&self) -> bool {
        self.position() >= self.row_count() as isize
    }
}

/// A message row held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    /// Unique row identifier.
    pub id: i64,
    /// Timestamp in epoch milliseconds.
    pub timestamp: i64,
    /// Subject, if any.
    pub subject: Option<String>,
    /// Sender display name, if any.
    pub sender: Option<String>,
}

impl MessageRow {
    /// Creates a row with no subject or sender.
    pub fn new(id: i64, timestamp: i64) -> Self {
        Self {
            id,
            timestamp,
            subject: None,
            sender: None,
        }
    }

    /// Sets the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the sender display name.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// A [`RowStore`] over a vector of [`MessageRow`]s.
#[derive(Debug, Clone)]
pub struct MemoryRowStore {
    rows: Vec<MessageRow>,
    position: isize,
}

impl Default for MemoryRowStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryRowStore {
    /// Creates a store positioned before the first row.
    pub fn new(rows: Vec<MessageRow>) -> Self {
        Self {
            rows,
            position: BEFORE_FIRST,
        }
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[MessageRow] {
        &self.rows
    }

    fn current(&self) -> Result<&MessageRow> {
        usize::try_from(self.position)
            .ok()
            .and_then(|p| self.rows.get(p))
            .ok_or(Error::NoCurrentRow)
    }
}

impl From<Vec<MessageRow>> for MemoryRowStore {
    fn from(rows: Vec<MessageRow>) -> Self {
        Self::new(rows)
    }
}

impl RowStore for MemoryRowStore {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn seek(&mut self, position: isize) -> Result<bool> {
        let count = self.rows.len() as isize;
        if position < BEFORE_FIRST || position > count {
            return Err(Error::out_of_range(position, self.rows.len()));
        }
        self.position = position;
        Ok(position != BEFORE_FIRST && position != count)
    }

    fn position(&self) -> isize {
        self.position
    }

    fn row_id(&self) -> Result<i64> {
        Ok(self.current()?.id)
    }

    fn timestamp(&self) -> Result<i64> {
        Ok(self.current()?.timestamp)
    }

    fn subject(&self) -> Result<Option<&str>> {
        Ok(self.current()?.subject.as_deref())
    }

    fn sender(&self) -> Result<Option<&str>> {
        Ok(self.current()?.sender.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryRowStore {
        MemoryRowStore::new(vec![
            MessageRow::new(10, 1_000).with_subject("Hi"),
            MessageRow::new(11, 2_000).with_sender("Alice"),
        ])
    }

    #[test]
    fn test_starts_before_first() {
        let store = store();
        assert_eq!(store.position(), BEFORE_FIRST);
        assert!(store.is_before_first());
        assert!(matches!(store.row_id(), Err(Error::NoCurrentRow)));
    }

    #[test]
    fn test_seek_rows_and_sentinels() {
        let mut store = store();
        assert!(store.seek(0).unwrap());
        assert_eq!(store.row_id().unwrap(), 10);
        assert_eq!(store.subject().unwrap(), Some("Hi"));

        assert!(!store.seek(2).unwrap());
        assert!(store.is_after_last());

        assert!(!store.seek(-1).unwrap());
        assert!(store.is_before_first());
    }

    #[test]
    fn test_seek_out_of_range() {
        let mut store = store();
        store.seek(1).unwrap();

        let err = store.seek(3).unwrap_err();
        assert!(err.is_out_of_range());
        assert!(store.seek(-2).unwrap_err().is_out_of_range());

        // A failed seek leaves the cursor where it was.
        assert_eq!(store.position(), 1);
    }

    #[test]
    fn test_empty_store_sentinels() {
        let mut store = MemoryRowStore::default();
        assert!(!store.seek(-1).unwrap());
        assert!(!store.seek(0).unwrap());
        assert!(store.seek(1).is_err());
    }

    #[test]
    fn test_column_values() {
        let mut store = store();
        store.seek(1).unwrap();
        assert_eq!(store.column(Column::Id).unwrap().as_integer(), Some(11));
        assert_eq!(store.column(Column::Timestamp).unwrap(), ColumnValue::Integer(2_000));
        assert_eq!(store.column(Column::Subject).unwrap(), ColumnValue::Text(None));
        assert_eq!(store.column(Column::Sender).unwrap().as_text(), Some("Alice"));

        let key = store.key().unwrap();
        assert_eq!(key.timestamp, 2_000);
        assert_eq!(key.sender.as_deref(), Some("Alice"));
    }
}
