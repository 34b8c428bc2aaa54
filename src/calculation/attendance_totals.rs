//! Month-level attendance totals.
//!
//! Folds a month of [`DayAttendanceSummary`] values into the
//! [`AttendanceCalculation`] consumed by the salary calculator.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{AttendanceCalculation, AttendanceSession, DayAttendanceSummary, DayStatus};

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}

fn slot_worked(session: Option<&AttendanceSession>) -> bool {
    session.is_some_and(|s| s.status.is_worked() && s.worked_minutes() > 0)
}

/// Aggregates day summaries into month totals.
///
/// Day weights:
/// - full day and reward day: 1 worked day
/// - half day: 0.5 worked and 0.5 absent
/// - absent: 1 absent day
/// - full-day leave: neither worked nor absent (leave is handled by the
///   leave summary)
/// - half-day leave: 0.5 worked if the other slot was worked, otherwise 0.5
///   absent
///
/// Weekday overtime is the time worked beyond the expected minutes on full
/// days. Sessions on weekends and holidays count entirely as off-day
/// overtime, even though their day summary credits zero minutes.
///
/// When `absences_through` is set, days after that date never count as
/// absent. The estimate path uses this so that the rest of the current month
/// is not treated as missed work.
pub fn calculate_attendance_totals(
    days: &[DayAttendanceSummary],
    absences_through: Option<NaiveDate>,
) -> AttendanceCalculation {
    let mut totals = AttendanceCalculation::default();
    let mut expected_minutes: i64 = 0;
    let mut worked_minutes: i64 = 0;
    let mut overtime_minutes: i64 = 0;
    let mut off_day_minutes: i64 = 0;

    for day in days {
        if !day.is_work_day {
            off_day_minutes += [day.morning.as_ref(), day.afternoon.as_ref()]
                .into_iter()
                .flatten()
                .map(AttendanceSession::worked_minutes)
                .sum::<i64>();
            continue;
        }

        totals.expected_days += 1;
        expected_minutes += day.expected_minutes;
        worked_minutes += day.worked_minutes;

        let counts_absence = absences_through.is_none_or(|cutoff| day.date <= cutoff);

        match day.status {
            DayStatus::FullDay => {
                totals.worked_days += Decimal::ONE;
                overtime_minutes += (day.worked_minutes - day.expected_minutes).max(0);
            }
            DayStatus::Reward => totals.worked_days += Decimal::ONE,
            DayStatus::HalfDayAm | DayStatus::HalfDayPm => {
                totals.worked_days += HALF;
                totals.half_days += 1;
                if counts_absence {
                    totals.absent_days += HALF;
                }
            }
            DayStatus::Absent => {
                if counts_absence {
                    totals.absent_days += Decimal::ONE;
                }
            }
            DayStatus::LeaveHalfAm | DayStatus::LeaveHalfPm => {
                let other = if day.status == DayStatus::LeaveHalfAm {
                    day.afternoon.as_ref()
                } else {
                    day.morning.as_ref()
                };
                if slot_worked(other) {
                    totals.worked_days += HALF;
                } else if counts_absence {
                    totals.absent_days += HALF;
                }
            }
            DayStatus::LeaveFull | DayStatus::Weekend | DayStatus::Holiday => {}
        }
    }

    totals.expected_hours = minutes_to_hours(expected_minutes);
    totals.worked_hours = minutes_to_hours(worked_minutes);
    totals.overtime_hours = minutes_to_hours(overtime_minutes);
    totals.off_day_overtime_hours = minutes_to_hours(off_day_minutes);
    totals
}
