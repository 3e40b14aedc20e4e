//! Injectable wall-clock time.
//!
//! Date grouping depends on "now". Components never read the system time
//! directly; they take a [`Clock`], so tests can pin the time.
//!
//! A clock also owns the time zone used for calendar days. Each timestamp is
//! converted with the offset in effect at that instant, so a message sent
//! before a daylight saving change keeps its own calendar day.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// Source of the current time and of local calendar dates.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Converts epoch milliseconds to local time.
    ///
    /// The default uses the offset of [`Clock::now`] for every instant.
    fn to_local(&self, millis: i64) -> DateTime<FixedOffset> {
        in_offset(millis, self.now().offset())
    }

    /// Local calendar date of epoch milliseconds.
    fn local_date(&self, millis: i64) -> NaiveDate {
        self.to_local(millis).date_naive()
    }
}

/// The system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn to_local(&self, millis: i64) -> DateTime<FixedOffset> {
        match Local.timestamp_millis_opt(millis).single() {
            Some(local) => local.fixed_offset(),
            None => DateTime::<Utc>::default().fixed_offset(),
        }
    }
}

/// A clock frozen at a single instant, with one fixed offset for all dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Creates a clock frozen at `millis` since the epoch, in UTC.
    ///
    /// Out-of-range values clamp to the epoch.
    pub fn from_millis_utc(millis: i64) -> Self {
        let now = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
            .fixed_offset();
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}

/// Converts epoch milliseconds into the clock's offset.
///
/// Timestamps that chrono cannot represent clamp to the epoch.
pub fn in_offset(millis: i64, offset: &FixedOffset) -> DateTime<FixedOffset> {
    offset
        .timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::default().with_timezone(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::from_millis_utc(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now().offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_in_offset_keeps_instant() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = in_offset(0, &plus_two);
        assert_eq!(dt.timestamp_millis(), 0);
        assert_eq!(dt.format("%H").to_string(), "02");
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.now_millis() > 1_600_000_000_000);
    }

    #[test]
    fn test_fixed_clock_local_date_uses_its_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock = FixedClock::new(in_offset(0, &plus_two));
        // 1970-01-01T23:30:00Z is already Jan 2 at +02:00.
        let late = 23 * 3_600_000 + 30 * 60_000;
        assert_eq!(clock.local_date(late), NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
        assert_eq!(clock.to_local(late).offset(), &plus_two);
    }

    #[test]
    fn test_system_clock_converts_each_instant() {
        let millis = 1_774_647_000_000;
        let expected = Local.timestamp_millis_opt(millis).unwrap().date_naive();
        assert_eq!(SystemClock.local_date(millis), expected);
        // Unrepresentable instants clamp instead of panicking.
        assert_eq!(SystemClock.local_date(i64::MIN).to_string(), "1970-01-01");
    }
}
