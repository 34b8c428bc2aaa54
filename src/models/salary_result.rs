//! Salary calculation result models.
//!
//! This module contains the [`MonthlySalaryResult`] type and its associated
//! structures capturing the pay breakdown, the inputs it was derived from,
//! and an audit trail of the calculation steps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceCalculation, ContractType, LeaveSummary, PayPeriod, RewardSummary};

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Itemized pay for one employee and one month.
///
/// Monetary values are rounded to 2 decimal places; intermediate values in
/// the audit trail are not.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::SalaryBreakdown;
/// use rust_decimal::Decimal;
///
/// let breakdown = SalaryBreakdown {
///     base_salary: Decimal::new(1100, 0),
///     daily_rate: Decimal::new(50, 0),
///     hourly_rate: Decimal::new(714, 2),
///     worked_days_pay: Decimal::new(1100, 0),
///     overtime_pay: Decimal::ZERO,
///     reward_bonus: Decimal::ZERO,
///     absence_deduction: Decimal::ZERO,
///     unpaid_leave_deduction: Decimal::ZERO,
///     total_deductions: Decimal::ZERO,
///     gross_salary: Decimal::new(1100, 0),
///     net_salary: Decimal::new(1100, 0),
///     steps: vec![],
/// };
/// assert_eq!(breakdown.net_salary, breakdown.gross_salary);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// Monthly base salary from the employment terms.
    pub base_salary: Decimal,
    /// Base salary divided by the month's work days.
    pub daily_rate: Decimal,
    /// Hourly rate (override or daily rate divided by standard hours).
    pub hourly_rate: Decimal,
    /// Base salary less absence and unpaid-leave deductions.
    pub worked_days_pay: Decimal,
    /// Overtime pay at the weekday and off-day multipliers.
    pub overtime_pay: Decimal,
    /// Sum of approved reward bonuses.
    pub reward_bonus: Decimal,
    /// Deduction for absent days.
    pub absence_deduction: Decimal,
    /// Deduction for unpaid leave days.
    pub unpaid_leave_deduction: Decimal,
    /// Absence plus unpaid-leave deductions, for reporting.
    pub total_deductions: Decimal,
    /// Worked-days pay plus overtime plus rewards.
    pub gross_salary: Decimal,
    /// Pay after deductions.
    pub net_salary: Decimal,
    /// The ordered calculation steps.
    pub steps: Vec<AuditStep>,
}

/// The complete result of a monthly salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySalaryResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// The employee the calculation is for.
    pub employee_id: String,
    /// The employee's contract type.
    pub contract_type: ContractType,
    /// The month covered.
    pub period: PayPeriod,
    /// Attendance totals used by the calculation.
    pub attendance: AttendanceCalculation,
    /// Leave day counts used by the calculation.
    pub leave: LeaveSummary,
    /// Reward totals used by the calculation.
    pub rewards: RewardSummary,
    /// The pay breakdown.
    pub breakdown: SalaryBreakdown,
    /// When the calculation was performed.
    pub generated_at: DateTime<Utc>,
}

/// Attendance-only salary preview for dashboards.
///
/// This is an approximation: leave and rewards are ignored, and absences are
/// only counted for days that have already elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryEstimate {
    /// The employee the estimate is for.
    pub employee_id: String,
    /// The month covered.
    pub period: PayPeriod,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Estimated net pay.
    pub estimated_net: Decimal,
    /// Days worked so far.
    pub worked_days: Decimal,
    /// Work days in the month.
    pub expected_days: u32,
    /// Work days elapsed up to the estimate date.
    pub elapsed_work_days: u32,
    /// Worked days as a percentage of elapsed work days.
    pub attendance_rate: Decimal,
}
