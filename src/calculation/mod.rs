//! Calculation logic for the attendance and payroll engine.
//!
//! Everything in this module is pure: functions take records, summaries and
//! policy values and return derived values. The calendar, the day-status
//! reducer, leave and reward aggregation, month attendance totals and the
//! salary calculator live here. Storage access happens in
//! [`crate::attendance`] and [`crate::payroll`].

mod attendance_totals;
mod calendar;
mod day_status;
mod leave_impact;
mod reward_summary;
mod salary;

pub use attendance_totals::calculate_attendance_totals;
pub use calendar::{
    HolidayCalendar, STANDARD_DAILY_HOURS, STANDARD_WORK_DAYS, calculate_daily_rate,
    calculate_hourly_rate, is_weekend,
};
pub use day_status::{off_day_status, reduce_day_status};
pub use leave_impact::{calculate_leave_summary, covering_leave};
pub use reward_summary::calculate_reward_summary;
pub use salary::{SalaryInputs, calculate_salary};
