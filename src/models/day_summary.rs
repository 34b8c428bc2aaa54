//! Derived per-day and per-month attendance views.
//!
//! None of these types are persisted: they are recomputed from sessions,
//! leave and reward records every time they are requested.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AttendanceSession, LeaveType};

/// Classification of one calendar day for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Both slots worked.
    FullDay,
    /// Only the morning slot worked.
    HalfDayAm,
    /// Only the afternoon slot worked.
    HalfDayPm,
    /// A work day with no worked slot.
    Absent,
    /// Covered by a full-day leave.
    LeaveFull,
    /// Morning covered by a half-day leave.
    LeaveHalfAm,
    /// Afternoon covered by a half-day leave.
    LeaveHalfPm,
    /// Covered by an approved reward day.
    Reward,
    /// Saturday or Sunday.
    Weekend,
    /// A public holiday.
    Holiday,
}

impl DayStatus {
    /// Returns true for statuses produced by a leave record.
    pub fn is_leave(self) -> bool {
        matches!(
            self,
            DayStatus::LeaveFull | DayStatus::LeaveHalfAm | DayStatus::LeaveHalfPm
        )
    }
}

/// The attendance picture of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAttendanceSummary {
    /// The calendar date.
    pub date: NaiveDate,
    /// Whether the date is a work day.
    pub is_work_day: bool,
    /// The derived day status.
    pub status: DayStatus,
    /// The morning session, if one was recorded.
    pub morning: Option<AttendanceSession>,
    /// The afternoon session, if one was recorded.
    pub afternoon: Option<AttendanceSession>,
    /// Minutes credited for the day.
    pub worked_minutes: i64,
    /// Minutes expected for the day (zero on non-work days).
    pub expected_minutes: i64,
    /// The leave type that produced a leave status.
    pub leave_type: Option<LeaveType>,
}

/// Live view of the current day, from attendance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayStatus {
    /// Today's date.
    pub date: NaiveDate,
    /// The morning session, if any.
    pub morning: Option<AttendanceSession>,
    /// The afternoon session, if any.
    pub afternoon: Option<AttendanceSession>,
    /// The derived status of the day so far.
    pub day_status: DayStatus,
}

/// Month-level attendance totals consumed by the salary calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCalculation {
    /// Work days in the month.
    pub expected_days: u32,
    /// Expected hours over the month.
    pub expected_hours: Decimal,
    /// Days worked or credited (half days count 0.5).
    pub worked_days: Decimal,
    /// Hours worked or credited.
    pub worked_hours: Decimal,
    /// Days absent (half days count 0.5).
    pub absent_days: Decimal,
    /// Number of days with exactly one worked slot.
    pub half_days: u32,
    /// Work-day hours beyond the expected daily hours.
    pub overtime_hours: Decimal,
    /// Hours worked on weekends and public holidays.
    pub off_day_overtime_hours: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_statuses() {
        assert!(DayStatus::LeaveFull.is_leave());
        assert!(DayStatus::LeaveHalfAm.is_leave());
        assert!(DayStatus::LeaveHalfPm.is_leave());
        assert!(!DayStatus::Reward.is_leave());
        assert!(!DayStatus::Absent.is_leave());
    }

    #[test]
    fn test_day_status_serialization() {
        assert_eq!(
            serde_json::to_string(&DayStatus::HalfDayAm).unwrap(),
            "\"half_day_am\""
        );
        assert_eq!(
            serde_json::to_string(&DayStatus::LeaveFull).unwrap(),
            "\"leave_full\""
        );
    }
}
