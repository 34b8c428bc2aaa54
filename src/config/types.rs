//! Configuration types for attendance and payroll policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every policy struct has a
//! `Default` matching the shipped `config/default` directory, so partial
//! files only need to list the values they change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::HolidayCalendar;

/// Rules for check-in and check-out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendancePolicy {
    /// First hour (inclusive) at which actions are accepted.
    pub window_start_hour: u32,
    /// Hour (exclusive) after which actions are refused.
    pub window_end_hour: u32,
    /// Minimum seconds between two actions of the same employee.
    pub min_action_delay_seconds: i64,
    /// Session length at which a session counts as full.
    pub full_session_minutes: i64,
    /// Session length below which a session is flagged as too short.
    pub min_session_minutes: i64,
    /// Minutes credited for a morning covered by half-day leave.
    pub morning_credit_minutes: i64,
    /// Minutes credited for an afternoon covered by half-day leave.
    pub afternoon_credit_minutes: i64,
    /// Minutes credited for a reward day.
    pub reward_credit_minutes: i64,
    /// Minutes expected on a work day.
    pub expected_day_minutes: i64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            window_start_hour: 6,
            window_end_hour: 22,
            min_action_delay_seconds: 30,
            full_session_minutes: 135,
            min_session_minutes: 15,
            morning_credit_minutes: 180,
            afternoon_credit_minutes: 240,
            reward_credit_minutes: 480,
            expected_day_minutes: 420,
        }
    }
}

/// Constants used by the salary calculator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    /// Work days assumed when a month's count is unavailable.
    pub standard_work_days: u32,
    /// Hours in a standard work day.
    pub standard_daily_hours: Decimal,
    /// Overtime multiplier on work days.
    pub weekday_overtime_multiplier: Decimal,
    /// Overtime multiplier on weekends and public holidays.
    pub off_day_overtime_multiplier: Decimal,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            standard_work_days: 22,
            standard_daily_hours: Decimal::new(7, 0),
            weekday_overtime_multiplier: Decimal::new(15, 1),
            off_day_overtime_multiplier: Decimal::new(20, 1),
        }
    }
}

/// Top level of `policy.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Attendance rules.
    pub attendance: AttendancePolicy,
    /// Payroll constants.
    pub payroll: PayrollPolicy,
}

/// A holiday falling on the same month and day every year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixedHoliday {
    /// Month (1-12).
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Display name.
    pub name: String,
}

/// A holiday on a specific date, for holidays that move from year to year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatedHoliday {
    /// The holiday date.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
}

/// Structure of `holidays/fixed.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FixedHolidaysFile {
    /// The fixed holidays.
    pub holidays: Vec<FixedHoliday>,
}

/// Structure of `holidays/<year>.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct YearHolidaysFile {
    /// The year the file applies to.
    pub year: i32,
    /// Holidays on specific dates of that year.
    pub holidays: Vec<DatedHoliday>,
}

/// The complete engine configuration.
///
/// Aggregates the policy file and the holiday calendar loaded from an
/// engine configuration directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attendance rules.
    pub attendance: AttendancePolicy,
    /// Payroll constants.
    pub payroll: PayrollPolicy,
    /// Public holidays.
    pub holidays: HolidayCalendar,
}

impl EngineConfig {
    /// Creates a config from its component parts.
    pub fn new(policy: PolicyConfig, holidays: HolidayCalendar) -> Self {
        Self {
            attendance: policy.attendance,
            payroll: policy.payroll,
            holidays,
        }
    }
}
