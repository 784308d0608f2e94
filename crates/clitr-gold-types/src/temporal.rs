//! Date parsing and calendar arithmetic
//!
//! Every rule in the measures reduces to one of three questions:
//! - how old was the patient on the index date (`calculate_age`)
//! - how many days before the index date did something happen (`days_between`,
//!   `LookbackWindow`)
//! - did it happen inside the measurement year (`MeasurementPeriod`)
//!
//! The arithmetic is exact calendar arithmetic on `NaiveDate`; leap days count.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Parse a source date
///
/// Accepts `YYYY-MM-DD` and any longer ISO timestamp whose first ten
/// characters are such a date. Returns `None` for anything else so callers can
/// skip the row.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let prefix = s.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Age in whole years on `index_date`
///
/// The year difference, minus one when the birthday has not yet occurred in
/// the index year.
pub fn calculate_age(date_of_birth: NaiveDate, index_date: NaiveDate) -> i32 {
    let before_birthday =
        (index_date.month(), index_date.day()) < (date_of_birth.month(), date_of_birth.day());
    index_date.year() - date_of_birth.year() - i32::from(before_birthday)
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Trailing window of whole days ending at the index date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookbackWindow {
    pub days: i64,
}

impl LookbackWindow {
    pub const fn days(days: i64) -> Self {
        Self { days }
    }

    /// `0 <= index_date - date <= days`
    pub fn contains(&self, date: NaiveDate, index_date: NaiveDate) -> bool {
        let diff = days_between(date, index_date);
        (0..=self.days).contains(&diff)
    }

    /// Earliest date that still falls inside the window
    pub fn earliest(&self, index_date: NaiveDate) -> Option<NaiveDate> {
        index_date.checked_sub_days(chrono::Days::new(self.days.unsigned_abs()))
    }
}

/// January 1 of the index year through the index date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MeasurementPeriod {
    pub fn ending(index_date: NaiveDate) -> Self {
        let start = index_date.with_ordinal(1).unwrap_or(index_date);
        Self {
            start,
            end: index_date,
        }
    }

    pub fn index_date(&self) -> NaiveDate {
        self.end
    }

    pub fn year(&self) -> i32 {
        self.end.year()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar year of `date` equals the index year
    pub fn in_index_year(&self, date: NaiveDate) -> bool {
        date.year() == self.year()
    }

    /// Calendar year of `date` is the index year or earlier
    pub fn not_after_index_year(&self, date: NaiveDate) -> bool {
        date.year() <= self.year()
    }

    /// June 30 of the index year
    pub fn mid_year_cutoff(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year(), 6, 30).unwrap_or(self.end)
    }
}
