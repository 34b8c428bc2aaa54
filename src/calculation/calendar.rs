//! Calendar and work-day model.
//!
//! This module answers "is this a work day?" and derives daily and hourly
//! rates from a monthly salary. Holidays come from an injectable
//! [`HolidayCalendar`]: a fixed (month, day) table plus dated entries for
//! holidays that move from year to year. Moving holidays are never computed,
//! they must be supplied per year.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::config::{DatedHoliday, FixedHoliday};
use crate::error::EngineResult;
use crate::models::PayPeriod;

/// Work days per month assumed when no month-specific count is given.
pub const STANDARD_WORK_DAYS: u32 = 22;

/// Hours in a standard work day (3 h morning + 4 h afternoon).
pub const STANDARD_DAILY_HOURS: Decimal = Decimal::from_parts(7, 0, 0, false, 0);

/// The built-in fixed holiday table.
const DEFAULT_FIXED_HOLIDAYS: [(u32, u32, &str); 10] = [
    (1, 1, "New Year's Day"),
    (1, 11, "Independence Manifesto Day"),
    (1, 14, "Amazigh New Year"),
    (5, 1, "Labour Day"),
    (7, 30, "Throne Day"),
    (8, 14, "Oued Ed-Dahab Day"),
    (8, 20, "Revolution of the King and the People"),
    (8, 21, "Youth Day"),
    (11, 6, "Green March"),
    (11, 18, "Independence Day"),
];

/// Public holidays known to the engine.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::default();
/// assert!(calendar.is_public_holiday(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()));
/// assert!(!calendar.is_work_day(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap())); // Saturday
/// assert!(calendar.is_work_day(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()));
/// assert_eq!(calendar.count_work_days_in_month(2026, 9).unwrap(), 22);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    fixed: HashSet<(u32, u32)>,
    dated: BTreeMap<NaiveDate, String>,
    names: BTreeMap<(u32, u32), String>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        let fixed = DEFAULT_FIXED_HOLIDAYS
            .iter()
            .map(|(month, day, name)| FixedHoliday {
                month: *month,
                day: *day,
                name: name.to_string(),
            })
            .collect::<Vec<_>>();
        Self::new(&fixed, &[])
    }
}

impl HolidayCalendar {
    /// Builds a calendar from fixed and dated holidays.
    pub fn new(fixed: &[FixedHoliday], dated: &[DatedHoliday]) -> Self {
        Self {
            fixed: fixed.iter().map(|h| (h.month, h.day)).collect(),
            names: fixed
                .iter()
                .map(|h| ((h.month, h.day), h.name.clone()))
                .collect(),
            dated: dated.iter().map(|h| (h.date, h.name.clone())).collect(),
        }
    }

    /// A calendar with no holidays at all (weekends only).
    pub fn empty() -> Self {
        Self::new(&[], &[])
    }

    /// Adds dated holidays, e.g. from a year-scoped configuration file.
    pub fn with_dated(mut self, dated: &[DatedHoliday]) -> Self {
        self.dated
            .extend(dated.iter().map(|h| (h.date, h.name.clone())));
        self
    }

    /// True iff the date is a Saturday or Sunday.
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        is_weekend(date)
    }

    /// True iff the date is in the fixed table or in the dated list.
    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.fixed.contains(&(date.month(), date.day())) || self.dated.contains_key(&date)
    }

    /// Name of the holiday on this date, if any.
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.dated
            .get(&date)
            .or_else(|| self.names.get(&(date.month(), date.day())))
            .map(String::as_str)
    }

    /// A work day is neither a weekend day nor a public holiday.
    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_public_holiday(date)
    }

    /// All work days of a month, in order.
    pub fn work_dates_in_month(&self, year: i32, month: u32) -> EngineResult<Vec<NaiveDate>> {
        let period = PayPeriod::month(year, month)?;
        Ok(period.days().filter(|d| self.is_work_day(*d)).collect())
    }

    /// Number of work days in a month.
    pub fn count_work_days_in_month(&self, year: i32, month: u32) -> EngineResult<u32> {
        Ok(self.work_dates_in_month(year, month)?.len() as u32)
    }

    /// Number of work days in the inclusive range `[start, end]`.
    pub fn count_work_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            return 0;
        }
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_work_day(*d))
            .count() as u32
    }
}

/// True iff the date is a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Daily rate from a monthly salary.
///
/// Uses `work_days` when given and non-zero, otherwise [`STANDARD_WORK_DAYS`].
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::calculate_daily_rate;
/// use rust_decimal::Decimal;
///
/// assert_eq!(calculate_daily_rate(Decimal::new(1100, 0), Some(22)), Decimal::new(50, 0));
/// assert_eq!(calculate_daily_rate(Decimal::new(2200, 0), None), Decimal::new(100, 0));
/// ```
pub fn calculate_daily_rate(monthly_salary: Decimal, work_days: Option<u32>) -> Decimal {
    let days = match work_days {
        Some(days) if days > 0 => days,
        _ => STANDARD_WORK_DAYS,
    };
    monthly_salary / Decimal::from(days)
}

/// Hourly rate from a daily rate.
///
/// Falls back to [`STANDARD_DAILY_HOURS`] when `daily_hours` is zero or negative.
pub fn calculate_hourly_rate(daily_rate: Decimal, daily_hours: Decimal) -> Decimal {
    let hours = if daily_hours > Decimal::ZERO {
        daily_hours
    } else {
        STANDARD_DAILY_HOURS
    };
    daily_rate / hours
}
