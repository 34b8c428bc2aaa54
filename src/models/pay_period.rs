//! Monthly pay period model.
//!
//! This module contains the [`PayPeriod`] type used to define the calendar
//! month a payroll calculation covers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month with its inclusive date boundaries.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::month(2026, 2).unwrap();
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The calendar year.
    pub year: i32,
    /// The calendar month (1-12).
    pub month: u32,
    /// The first day of the month.
    pub start_date: NaiveDate,
    /// The last day of the month.
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Builds the period for a year and month.
    ///
    /// Returns [`EngineError::InvalidPeriod`] if the month is not 1-12 or the
    /// year is outside chrono's range.
    pub fn month(year: i32, month: u32) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod { year, month };

        let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_month_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let end_date = next_month_start.pred_opt().ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            start_date,
            end_date,
        })
    }

    /// The period containing the given date.
    pub fn containing(date: NaiveDate) -> EngineResult<Self> {
        Self::month(date.year(), date.month())
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Every calendar day of the period, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |date| *date <= self.end_date)
    }

    /// Number of calendar days in the period.
    pub fn day_count(&self) -> u32 {
        self.end_date.day()
    }
}
