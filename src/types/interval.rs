//! Inclusive calendar-day intervals.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire format of a day: `YYYY-MM-DD`.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Errors from parsing an interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// The text is not shaped like `YYYY-MM-DD`.
    #[error("date must be in YYYY-MM-DD format: {0:?}")]
    Format(String),

    /// The text is shaped correctly but names no real day (e.g. `2025-02-30`).
    #[error("not a calendar date: {0:?}")]
    InvalidDate(String),
}

/// Parses one `YYYY-MM-DD` day.
pub fn parse_day(text: &str) -> Result<NaiveDate, IntervalError> {
    if !is_day_shaped(text) {
        return Err(IntervalError::Format(text.to_string()));
    }
    NaiveDate::parse_from_str(text, DAY_FORMAT)
        .map_err(|_| IntervalError::InvalidDate(text.to_string()))
}

/// Checks the literal `dddd-dd-dd` shape; chrono alone accepts single-digit
/// months and days.
fn is_day_shaped(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// An inclusive interval of calendar days.
///
/// `start <= end` is expected but not enforced: a reversed interval simply
/// contains no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateInterval { start, end }
    }

    /// Parses both endpoints from `YYYY-MM-DD` text.
    pub fn parse(start: &str, end: &str) -> Result<Self, IntervalError> {
        Ok(DateInterval {
            start: parse_day(start)?,
            end: parse_day(end)?,
        })
    }

    /// Whole days between `start` and `end`. Negative for a reversed interval.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every day of the interval in ascending order, both endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let span = u64::try_from(self.span_days()).ok();
        span.into_iter()
            .flat_map(|n| 0..=n)
            .filter_map(|offset| self.start.checked_add_days(Days::new(offset)))
    }

    /// Returns true if `day` lies inside the interval (inclusive).
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}
