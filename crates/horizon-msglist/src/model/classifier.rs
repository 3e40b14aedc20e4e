//! Grouping key classifier.
//!
//! Decides whether a row opens a new group, given the sort order, the
//! previous row and "now".
//!
//! Date grouping is graduated: rows near "now" are bucketed by calendar day,
//! older rows by week-sized buckets within four weeks, and anything older by
//! 30.5-day buckets. The three checks overlap and are evaluated together, so
//! the thresholds below are load-bearing:
//!
//! | check        | always true when                              | otherwise                            |
//! |--------------|-----------------------------------------------|--------------------------------------|
//! | `same_day`   | previous is older than one week               | same calendar date                   |
//! | `same_week`  | previous older than four weeks, or within one | same `age / WEEK` bucket             |
//! | `same_month` | previous within four weeks, or both < 61 days | same `floor(age / 30.5 days)` bucket |
//!
//! Ages are `now - timestamp` with wrapping arithmetic, so any timestamp a
//! store returns is classified without overflow.

use horizon_msglist_core::Clock;
use serde::{Deserialize, Serialize};

/// One day in milliseconds.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
/// One week in milliseconds.
pub const WEEK_MILLIS: i64 = 7 * DAY_MILLIS;
/// Length of a month bucket in days.
const MONTH_BUCKET_DAYS: f64 = 30.5;
/// Rows younger than this (in days) share one month bucket.
const FIRST_MONTH_DAYS: i64 = 61;

/// Sort orders a message list can be loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Oldest first.
    Date,
    /// Newest first.
    #[default]
    DateDesc,
    /// Subject A to Z.
    Subject,
    /// Subject Z to A.
    SubjectDesc,
    /// Sender A to Z.
    Sender,
    /// Sender Z to A.
    SenderDesc,
}

impl SortOrder {
    /// Returns the key this sort order groups by.
    pub fn criterion(self) -> GroupCriterion {
        match self {
            SortOrder::Date | SortOrder::DateDesc => GroupCriterion::Date,
            SortOrder::Subject | SortOrder::SubjectDesc => GroupCriterion::Subject,
            SortOrder::Sender | SortOrder::SenderDesc => GroupCriterion::Sender,
        }
    }

    /// Returns `true` for the descending variants.
    pub fn is_descending(self) -> bool {
        matches!(
            self,
            SortOrder::DateDesc | SortOrder::SubjectDesc | SortOrder::SenderDesc
        )
    }
}

/// The row attribute that defines group boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupCriterion {
    /// Graduated day/week/month buckets of the timestamp.
    Date,
    /// Exact subject text.
    Subject,
    /// Exact sender display name.
    Sender,
}

/// The grouping-relevant columns of a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowKey {
    /// Timestamp in epoch milliseconds.
    pub timestamp: i64,
    /// Subject, if any.
    pub subject: Option<String>,
    /// Sender display name, if any.
    pub sender: Option<String>,
}

/// Returns `true` if `current` starts a new group.
///
/// `previous` is `None` for the first row, which always starts a group.
/// `now` is in epoch milliseconds; `clock` supplies local calendar dates.
pub fn starts_new_group(
    sort_order: SortOrder,
    previous: Option<&RowKey>,
    current: &RowKey,
    now: i64,
    clock: &dyn Clock,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    match sort_order.criterion() {
        GroupCriterion::Date => {
            let previous_age = now.wrapping_sub(previous.timestamp);
            let current_age = now.wrapping_sub(current.timestamp);
            !same_day(previous_age, previous.timestamp, current.timestamp, clock)
                || !same_week(previous_age, current_age)
                || !same_month(previous_age, current_age)
        }
        GroupCriterion::Subject => text_breaks(previous.subject.as_deref(), current.subject.as_deref()),
        GroupCriterion::Sender => text_breaks(previous.sender.as_deref(), current.sender.as_deref()),
    }
}

// A null current value always breaks, even after another null.
// TODO: revisit with product whether consecutive null subjects should merge.
fn text_breaks(previous: Option<&str>, current: Option<&str>) -> bool {
    match current {
        None => true,
        Some(current) => previous != Some(current),
    }
}

fn same_day(previous_age: i64, previous: i64, current: i64, clock: &dyn Clock) -> bool {
    if previous_age > WEEK_MILLIS {
        return true;
    }
    clock.local_date(previous) == clock.local_date(current)
}

fn same_week(previous_age: i64, current_age: i64) -> bool {
    if previous_age > 4 * WEEK_MILLIS || previous_age <= WEEK_MILLIS {
        return true;
    }
    previous_age / WEEK_MILLIS == current_age / WEEK_MILLIS
}

fn same_month(previous_age: i64, current_age: i64) -> bool {
    if previous_age <= 4 * WEEK_MILLIS {
        return true;
    }
    let first_month = FIRST_MONTH_DAYS * DAY_MILLIS;
    if previous_age < first_month && current_age < first_month {
        return true;
    }
    month_bucket(previous_age) == month_bucket(current_age)
}

fn month_bucket(age: i64) -> i64 {
    (age as f64 / (MONTH_BUCKET_DAYS * DAY_MILLIS as f64)).floor() as i64
}
