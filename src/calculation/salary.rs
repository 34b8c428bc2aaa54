//! Monthly salary calculation.
//!
//! This module turns the month's attendance totals, leave summary and reward
//! summary into a [`SalaryBreakdown`]. It is pure: every input is passed in
//! and nothing is read from storage.
//!
//! Intermediate values keep full precision. Only the values copied into the
//! breakdown are rounded to 2 decimal places.

use rust_decimal::Decimal;

use crate::config::PayrollPolicy;
use crate::models::{
    AttendanceCalculation, AuditStep, EmploymentTerms, LeaveSummary, RewardSummary,
    SalaryBreakdown,
};

use super::calendar::{calculate_daily_rate, calculate_hourly_rate};

/// Inputs to [`calculate_salary`] gathered for one employee and one month.
#[derive(Debug, Clone, Copy)]
pub struct SalaryInputs<'a> {
    /// The employee's contractual terms.
    pub terms: &'a EmploymentTerms,
    /// Attendance totals for the month.
    pub attendance: &'a AttendanceCalculation,
    /// Leave totals for the month.
    pub leave: &'a LeaveSummary,
    /// Reward totals for the month.
    pub rewards: &'a RewardSummary,
    /// Number of work days in the month.
    pub work_days: u32,
}

struct AuditTrail {
    steps: Vec<AuditStep>,
}

impl AuditTrail {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Calculates the salary breakdown for one month.
///
/// The steps, each recorded in the audit trail:
/// 1. daily rate = base salary / work days in the month
/// 2. hourly rate = the terms' override, or daily rate / standard daily hours
/// 3. absence and unpaid-leave deductions at the daily rate; worked-days pay
///    is the base salary less both, never below zero
/// 4. overtime pay at the weekday and off-day multipliers
/// 5. reward bonus
/// 6. gross = worked-days pay + overtime pay + reward bonus
/// 7. net = gross, since deductions are already applied in step 3
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::{calculate_salary, SalaryInputs};
/// use attendance_payroll_engine::config::PayrollPolicy;
/// use attendance_payroll_engine::models::{
///     AttendanceCalculation, ContractType, EmploymentTerms, LeaveSummary, RewardSummary,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let terms = EmploymentTerms {
///     employee_id: "emp_001".to_string(),
///     base_salary: Decimal::new(1100, 0),
///     hourly_rate: None,
///     contract_type: ContractType::Cdi,
///     annual_leave_allowance: Decimal::new(18, 0),
///     hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// };
/// let attendance = AttendanceCalculation {
///     absent_days: Decimal::new(2, 0),
///     ..Default::default()
/// };
/// let breakdown = calculate_salary(
///     SalaryInputs {
///         terms: &terms,
///         attendance: &attendance,
///         leave: &LeaveSummary::default(),
///         rewards: &RewardSummary::default(),
///         work_days: 22,
///     },
///     &PayrollPolicy::default(),
/// );
///
/// assert_eq!(breakdown.absence_deduction, Decimal::new(100, 0));
/// assert_eq!(breakdown.net_salary, Decimal::new(1000, 0));
/// ```
pub fn calculate_salary(inputs: SalaryInputs<'_>, policy: &PayrollPolicy) -> SalaryBreakdown {
    let SalaryInputs {
        terms,
        attendance,
        leave,
        rewards,
        work_days,
    } = inputs;
    let mut trail = AuditTrail::new();
    let base = terms.base_salary;

    let divisor = if work_days > 0 {
        work_days
    } else {
        policy.standard_work_days
    };
    let daily_rate = calculate_daily_rate(base, Some(divisor));
    trail.record(
        "daily_rate",
        "Daily Rate",
        serde_json::json!({
            "base_salary": base.to_string(),
            "work_days": divisor
        }),
        serde_json::json!({ "daily_rate": daily_rate.to_string() }),
        format!("{} / {} work days = {}", base, divisor, money(daily_rate)),
    );

    let (hourly_rate, hourly_source) = match terms.hourly_rate {
        Some(rate) => (rate, "employment_terms"),
        None => (
            calculate_hourly_rate(daily_rate, policy.standard_daily_hours),
            "daily_rate",
        ),
    };
    trail.record(
        "hourly_rate",
        "Hourly Rate",
        serde_json::json!({
            "override": terms.hourly_rate.map(|r| r.to_string()),
            "daily_rate": daily_rate.to_string(),
            "standard_daily_hours": policy.standard_daily_hours.to_string()
        }),
        serde_json::json!({
            "hourly_rate": hourly_rate.to_string(),
            "source": hourly_source
        }),
        match terms.hourly_rate {
            Some(rate) => format!("Using hourly rate override {}", rate),
            None => format!(
                "{} / {} hours = {}",
                money(daily_rate),
                policy.standard_daily_hours,
                money(hourly_rate)
            ),
        },
    );

    let absence_deduction = attendance.absent_days * daily_rate;
    let unpaid_leave_deduction = leave.salary_deduction_days * daily_rate;
    let worked_days_pay = (base - absence_deduction - unpaid_leave_deduction).max(Decimal::ZERO);
    trail.record(
        "worked_days_pay",
        "Worked Days Pay",
        serde_json::json!({
            "base_salary": base.to_string(),
            "absent_days": attendance.absent_days.to_string(),
            "unpaid_leave_days": leave.salary_deduction_days.to_string(),
            "daily_rate": daily_rate.to_string()
        }),
        serde_json::json!({
            "absence_deduction": absence_deduction.to_string(),
            "unpaid_leave_deduction": unpaid_leave_deduction.to_string(),
            "worked_days_pay": worked_days_pay.to_string()
        }),
        format!(
            "{} - {} absent days - {} unpaid leave days at {} per day = {}",
            base,
            attendance.absent_days,
            leave.salary_deduction_days,
            money(daily_rate),
            money(worked_days_pay)
        ),
    );

    let weekday_overtime =
        attendance.overtime_hours * hourly_rate * policy.weekday_overtime_multiplier;
    let off_day_overtime =
        attendance.off_day_overtime_hours * hourly_rate * policy.off_day_overtime_multiplier;
    let overtime_pay = weekday_overtime + off_day_overtime;
    trail.record(
        "overtime_pay",
        "Overtime Pay",
        serde_json::json!({
            "overtime_hours": attendance.overtime_hours.round_dp(2).to_string(),
            "off_day_overtime_hours": attendance.off_day_overtime_hours.round_dp(2).to_string(),
            "hourly_rate": hourly_rate.to_string(),
            "weekday_multiplier": policy.weekday_overtime_multiplier.to_string(),
            "off_day_multiplier": policy.off_day_overtime_multiplier.to_string()
        }),
        serde_json::json!({
            "weekday_overtime_pay": weekday_overtime.to_string(),
            "off_day_overtime_pay": off_day_overtime.to_string(),
            "overtime_pay": overtime_pay.to_string()
        }),
        format!(
            "{}h x {} + {}h x {} at {} per hour = {}",
            attendance.overtime_hours.round_dp(2),
            policy.weekday_overtime_multiplier,
            attendance.off_day_overtime_hours.round_dp(2),
            policy.off_day_overtime_multiplier,
            money(hourly_rate),
            money(overtime_pay)
        ),
    );

    let reward_bonus = rewards.total_bonus;
    trail.record(
        "reward_bonus",
        "Reward Bonus",
        serde_json::json!({ "reward_days": rewards.reward_days }),
        serde_json::json!({ "reward_bonus": reward_bonus.to_string() }),
        format!(
            "{} approved reward(s) on {} day(s) totalling {}",
            rewards.records.len(),
            rewards.reward_days,
            money(reward_bonus)
        ),
    );

    let gross_salary = worked_days_pay + overtime_pay + reward_bonus;
    let total_deductions = absence_deduction + unpaid_leave_deduction;
    let net_salary = gross_salary;
    trail.record(
        "net_salary",
        "Gross and Net Salary",
        serde_json::json!({
            "worked_days_pay": worked_days_pay.to_string(),
            "overtime_pay": overtime_pay.to_string(),
            "reward_bonus": reward_bonus.to_string()
        }),
        serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "total_deductions": total_deductions.to_string(),
            "net_salary": net_salary.to_string()
        }),
        format!(
            "{} + {} + {} = {}; deductions of {} already applied",
            money(worked_days_pay),
            money(overtime_pay),
            money(reward_bonus),
            money(gross_salary),
            money(total_deductions)
        ),
    );

    SalaryBreakdown {
        base_salary: money(base),
        daily_rate: money(daily_rate),
        hourly_rate: money(hourly_rate),
        worked_days_pay: money(worked_days_pay),
        overtime_pay: money(overtime_pay),
        reward_bonus: money(reward_bonus),
        absence_deduction: money(absence_deduction),
        unpaid_leave_deduction: money(unpaid_leave_deduction),
        total_deductions: money(total_deductions),
        gross_salary: money(gross_salary),
        net_salary: money(net_salary),
        steps: trail.steps,
    }
}
