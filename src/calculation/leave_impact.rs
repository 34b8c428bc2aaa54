//! Leave impact calculation.
//!
//! Turns the approved leave records overlapping a month into a
//! [`LeaveSummary`]. Leave is counted per work day, not per record: a day
//! covered by several records counts at most once, following the same rule
//! the month summary uses to pick a day's leave status (see
//! [`covering_leave`]). Days with an approved reward are not leave days.
//!
//! Salary deduction is a policy of the leave *type*: only
//! [`LeaveType::Unpaid`] days reduce pay. Paid, sick, maternity, notice and
//! reward leave never do, whatever their `impact_on_salary` flag says.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{LeaveRecord, LeaveSummary, LeaveType, PayPeriod, RewardRecord, SessionSlot};

use super::calendar::HolidayCalendar;

/// The leave driving a day's status and the half-day slot it covers.
///
/// A full-day leave wins over half-day ones, and half-day leaves on both
/// slots of the same day add up to a full day. Returns `None` when no record
/// covers the date.
pub fn covering_leave(
    leaves: &[LeaveRecord],
    date: NaiveDate,
) -> Option<(&LeaveRecord, Option<SessionSlot>)> {
    let covering: Vec<&LeaveRecord> = leaves.iter().filter(|l| l.covers(date)).collect();

    if let Some(full) = covering.iter().find(|l| !l.is_half_day()) {
        return Some((full, None));
    }

    let first = covering.first()?;
    let both_slots = SessionSlot::ALL
        .iter()
        .all(|slot| covering.iter().any(|l| l.half_day_slot == Some(*slot)));
    if both_slots {
        Some((first, None))
    } else {
        Some((first, first.half_day_slot))
    }
}

/// How much of one day each covering record accounts for.
///
/// A full-day record takes the whole day. Otherwise the first half-day record
/// on each slot takes half a day, so duplicates on a slot count once.
fn day_shares<'a>(leaves: &[&'a LeaveRecord], date: NaiveDate) -> Vec<(&'a LeaveRecord, Decimal)> {
    let covering: Vec<&LeaveRecord> = leaves.iter().copied().filter(|l| l.covers(date)).collect();

    if let Some(full) = covering.iter().find(|l| !l.is_half_day()) {
        return vec![(*full, Decimal::ONE)];
    }

    SessionSlot::ALL
        .iter()
        .filter_map(|slot| {
            covering
                .iter()
                .find(|l| l.half_day_slot == Some(*slot))
                .map(|l| (*l, Decimal::new(5, 1)))
        })
        .collect()
}

/// Summarizes approved leave for one month.
///
/// Records that are not approved, or that do not overlap the period, are
/// ignored. Work days carrying an approved reward in `rewards` are skipped,
/// since a reward day is credited as worked.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::{calculate_leave_summary, HolidayCalendar};
/// use attendance_payroll_engine::models::{LeaveRecord, LeaveStatus, LeaveType, PayPeriod};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let leave = LeaveRecord {
///     id: "lv_1".to_string(),
///     employee_id: "emp_001".to_string(),
///     leave_type: LeaveType::Unpaid,
///     start_date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
///     half_day_slot: None,
///     status: LeaveStatus::Valide,
///     impact_on_salary: true,
/// };
/// let period = PayPeriod::month(2026, 9).unwrap();
/// let summary = calculate_leave_summary(&[leave], &[], &period, &HolidayCalendar::default());
/// assert_eq!(summary.salary_deduction_days, Decimal::new(2, 0));
/// ```
pub fn calculate_leave_summary(
    leaves: &[LeaveRecord],
    rewards: &[RewardRecord],
    period: &PayPeriod,
    calendar: &HolidayCalendar,
) -> LeaveSummary {
    let approved: Vec<&LeaveRecord> = leaves
        .iter()
        .filter(|l| {
            l.is_approved() && l.end_date >= period.start_date && l.start_date <= period.end_date
        })
        .collect();
    let mut contributed = vec![false; approved.len()];
    let mut summary = LeaveSummary::default();

    let leave_days = period.days().filter(|date| {
        calendar.is_work_day(*date)
            && !rewards.iter().any(|r| r.is_approved() && r.date == *date)
    });
    for date in leave_days {
        for (leave, days) in day_shares(&approved, date) {
            let bucket = match leave.leave_type {
                LeaveType::Paid => &mut summary.paid_days,
                LeaveType::Unpaid => &mut summary.unpaid_days,
                LeaveType::Maladie => &mut summary.sick_days,
                LeaveType::Maternite => &mut summary.maternity_days,
                LeaveType::Preavis | LeaveType::Reward => &mut summary.other_days,
            };
            *bucket += days;
            summary.total_days += days;
            if leave.leave_type.deducts_salary() {
                summary.salary_deduction_days += days;
            }
            if let Some(index) = approved.iter().position(|l| std::ptr::eq(*l, leave)) {
                contributed[index] = true;
            }
        }
    }

    summary.records = approved
        .into_iter()
        .zip(contributed)
        .filter_map(|(leave, used)| used.then(|| leave.clone()))
        .collect();
    summary
}
