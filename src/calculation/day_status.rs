//! Day-status reduction.
//!
//! Collapses a day's two session statuses into a single [`DayStatus`].

use chrono::NaiveDate;

use crate::models::{DayStatus, SessionStatus};

use super::calendar::{HolidayCalendar, is_weekend};

/// Status of a non-work day, or `None` for a work day.
pub fn off_day_status(date: NaiveDate, calendar: &HolidayCalendar) -> Option<DayStatus> {
    if is_weekend(date) {
        Some(DayStatus::Weekend)
    } else if calendar.is_public_holiday(date) {
        Some(DayStatus::Holiday)
    } else {
        None
    }
}

/// Reduces the morning and afternoon session statuses to a day status.
///
/// Precedence, highest first:
/// 1. non-work day → [`DayStatus::Weekend`] / [`DayStatus::Holiday`]
/// 2. a reward marker on either slot → [`DayStatus::Reward`]
/// 3. a full-day leave marker on either slot → [`DayStatus::LeaveFull`]
/// 4. a half-day leave marker → [`DayStatus::LeaveHalfAm`] / [`DayStatus::LeaveHalfPm`]
/// 5. worked slots (`Full` or `Partial`) → full day, half day or absent
///
/// A missing session is `None` and never counts as worked.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::{reduce_day_status, HolidayCalendar};
/// use attendance_payroll_engine::models::{DayStatus, SessionStatus};
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2026, 9, 14).unwrap();
/// let calendar = HolidayCalendar::default();
///
/// let status = reduce_day_status(monday, Some(SessionStatus::Full), None, &calendar);
/// assert_eq!(status, DayStatus::HalfDayAm);
/// ```
pub fn reduce_day_status(
    date: NaiveDate,
    morning: Option<SessionStatus>,
    afternoon: Option<SessionStatus>,
    calendar: &HolidayCalendar,
) -> DayStatus {
    if let Some(status) = off_day_status(date, calendar) {
        return status;
    }

    let either = |wanted: SessionStatus| morning == Some(wanted) || afternoon == Some(wanted);

    if either(SessionStatus::Reward) {
        return DayStatus::Reward;
    }
    if either(SessionStatus::LeaveFull) {
        return DayStatus::LeaveFull;
    }
    if morning == Some(SessionStatus::LeaveHalf) {
        return DayStatus::LeaveHalfAm;
    }
    if afternoon == Some(SessionStatus::LeaveHalf) {
        return DayStatus::LeaveHalfPm;
    }

    let worked_morning = morning.is_some_and(SessionStatus::is_worked);
    let worked_afternoon = afternoon.is_some_and(SessionStatus::is_worked);

    match (worked_morning, worked_afternoon) {
        (true, true) => DayStatus::FullDay,
        (true, false) => DayStatus::HalfDayAm,
        (false, true) => DayStatus::HalfDayPm,
        (false, false) => DayStatus::Absent,
    }
}
