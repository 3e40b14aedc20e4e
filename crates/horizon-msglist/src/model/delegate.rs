//! Row presentation.
//!
//! [`RowDelegate::describe`] turns a visible position into a [`RowDisplay`]
//! for the rendering layer, branching once on [`RowKind`]. Group headers are
//! titled by the grouping criterion: a relative date label for date sorts,
//! the subject or sender otherwise.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate};
use horizon_msglist_core::{Clock, Error, Result};

use super::classifier::GroupCriterion;
use super::cursor::GroupedCursor;
use super::group_table::RowKind;
use super::row_store::RowStore;
use super::selection::SelectionTracker;

/// Default `strftime` pattern for a plain date.
pub const DEFAULT_DATE_FORMAT: &str = "%b %-d, %Y";
/// Default `strftime` pattern for a date with weekday.
pub const DEFAULT_WEEKDAY_FORMAT: &str = "%a, %b %-d, %Y";

/// Validated `strftime` patterns for date labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLabelFormat {
    date: String,
    weekday: String,
}

impl Default for DateLabelFormat {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_FORMAT.to_owned(),
            weekday: DEFAULT_WEEKDAY_FORMAT.to_owned(),
        }
    }
}

impl DateLabelFormat {
    /// Creates a format from a date pattern and a weekday pattern.
    ///
    /// Fails with [`Error::Config`] if either pattern has an unknown
    /// specifier.
    pub fn new(date: impl Into<String>, weekday: impl Into<String>) -> Result<Self> {
        let date = date.into();
        let weekday = weekday.into();
        check_pattern(&date)?;
        check_pattern(&weekday)?;
        Ok(Self { date, weekday })
    }

    /// The plain date pattern.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The weekday pattern.
    pub fn weekday(&self) -> &str {
        &self.weekday
    }
}

/// Fails if `pattern` contains a specifier chrono cannot format.
pub fn check_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(Error::config(format!("invalid date format '{pattern}'")));
    }
    Ok(())
}

/// Relative label for a group of messages around `timestamp`.
///
/// Day distance is `(year_today * 365 + ordinal_today) - (year * 365 + ordinal)`,
/// each date taken in the local time of `clock` at that instant:
///
/// | days      | label                  |
/// |-----------|------------------------|
/// | 0         | `Today, <date>`        |
/// | 1         | `Yesterday, <date>`    |
/// | < 7       | weekday and date       |
/// | < 14      | `1 week ago`           |
/// | < 28      | `<days / 7> weeks ago` |
/// | < 61      | `1 month ago`          |
/// | otherwise | `<floor(days / 30.5)> months ago` |
pub fn relative_date_label(timestamp: i64, clock: &dyn Clock, format: &DateLabelFormat) -> String {
    let now = clock.now();
    let date = clock.to_local(timestamp);
    let days = day_number(now.date_naive()) - day_number(date.date_naive());

    match days {
        0 => format!("Today, {}", now.format(&format.date)),
        1 => format!("Yesterday, {}", (now - Duration::days(1)).format(&format.date)),
        d if d < 7 => date.format(&format.weekday).to_string(),
        d if d < 14 => "1 week ago".to_owned(),
        d if d < 28 => format!("{} weeks ago", d / 7),
        d if d < 61 => "1 month ago".to_owned(),
        d => format!("{} months ago", (d as f64 / 30.5).floor() as i64),
    }
}

fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 365 + i64::from(date.ordinal())
}

/// Remembers the last date label so repeated draws of the same header skip
/// formatting.
///
/// Keyed on the timestamp and today's date, so the label refreshes after
/// midnight.
#[derive(Debug, Clone, Default)]
pub struct DateLabelMemo {
    format: DateLabelFormat,
    key: Option<(i64, NaiveDate, FixedOffset)>,
    label: String,
}

impl DateLabelMemo {
    /// Creates an empty memo.
    pub fn new(format: DateLabelFormat) -> Self {
        Self {
            format,
            key: None,
            label: String::new(),
        }
    }

    /// The label for `timestamp`, formatted only if the key changed.
    pub fn label(&mut self, timestamp: i64, clock: &dyn Clock) -> &str {
        let now = clock.now();
        let key = (timestamp, now.date_naive(), *now.offset());
        if self.key != Some(key) {
            self.label = relative_date_label(timestamp, clock, &self.format);
            self.key = Some(key);
        }
        &self.label
    }

    /// The format this memo renders with.
    pub fn format(&self) -> &DateLabelFormat {
        &self.format
    }
}

/// Everything the rendering layer needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDisplay {
    /// A group header.
    Header {
        /// Identifier of the group.
        group_id: i64,
        /// Criterion label: date label, subject or sender.
        title: String,
        /// Row count, formatted as `"(n)"`.
        count_label: String,
        /// Number of rows in the group.
        item_count: usize,
        /// Whether the group's rows are shown.
        expanded: bool,
        /// Whether the group is selected.
        selected: bool,
    },
    /// A message row.
    Item {
        /// Row identifier.
        id: i64,
        /// Subject, if any.
        subject: Option<String>,
        /// Sender display name, if any.
        sender: Option<String>,
        /// Timestamp in epoch milliseconds.
        timestamp: i64,
        /// Whether the row is selected.
        selected: bool,
    },
}

/// Builds [`RowDisplay`] values for a grouped cursor.
pub struct RowDelegate<C: Clock> {
    clock: C,
    memo: DateLabelMemo,
}

impl<C: Clock> RowDelegate<C> {
    /// Creates a delegate reading "now" from `clock`.
    pub fn new(clock: C, format: DateLabelFormat) -> Self {
        Self {
            clock,
            memo: DateLabelMemo::new(format),
        }
    }

    /// Describes the row at `visible`, moving the cursor there.
    ///
    /// Returns `Ok(None)` past the end of the list.
    pub fn describe<S: RowStore>(
        &mut self,
        cursor: &mut GroupedCursor<S>,
        selection: &SelectionTracker,
        visible: usize,
    ) -> Result<Option<RowDisplay>> {
        if !cursor.move_to_visible(visible as isize)? {
            return Ok(None);
        }
        let Some(kind) = cursor.current_kind() else {
            return Ok(None);
        };
        let id = cursor.row_id()?;

        let display = match kind {
            RowKind::Header { item_count } => {
                let criterion = cursor.sort_order().unwrap_or_default().criterion();
                let title = match criterion {
                    GroupCriterion::Date => {
                        self.memo.label(cursor.timestamp()?, &self.clock).to_owned()
                    }
                    GroupCriterion::Subject => cursor.subject()?.unwrap_or_default().to_owned(),
                    GroupCriterion::Sender => cursor.sender()?.unwrap_or_default().to_owned(),
                };
                RowDisplay::Header {
                    group_id: id,
                    title,
                    count_label: format!("({item_count})"),
                    item_count,
                    expanded: cursor.is_group_expanded(visible).unwrap_or(true),
                    selected: selection.is_selected(id, true),
                }
            }
            RowKind::Item => RowDisplay::Item {
                id,
                subject: cursor.subject()?.map(str::to_owned),
                sender: cursor.sender()?.map(str::to_owned),
                timestamp: cursor.timestamp()?,
                selected: selection.is_selected(id, false),
            },
        };
        Ok(Some(display))
    }
}
