//! Calendar-date ranges a digest covers.
//!
//! A [`DateRange`] is inclusive on both ends.  Weekly digests run Monday
//! through Sunday.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

/// An inclusive `[start, end]` interval of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build an arbitrary range; `None` when `start > end`.
    ///
    /// Runs only ever cover whole weeks, so this is a fixture helper.
    #[cfg(test)]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The Monday..Sunday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The full week before the one containing `today`.
    pub fn last_week(today: NaiveDate) -> Self {
        Self::week_of(today - Duration::days(7))
    }

    /// First day covered.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day covered; the digest is dated by it.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls on or between the two ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
