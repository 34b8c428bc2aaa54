//! Monthly payroll orchestration.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::AttendanceService;
use crate::calculation::{
    SalaryInputs, calculate_attendance_totals, calculate_leave_summary, calculate_reward_summary,
    calculate_salary,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmploymentTerms, LeaveSummary, MonthlySalaryResult, PayPeriod, RewardSummary, SalaryEstimate,
};
use crate::store::{EmployeeDirectory, LeaveSource, RewardSource};

/// Computes monthly salaries from attendance, leave and rewards.
///
/// Every calculation reads its inputs fresh and writes nothing, so running
/// the same month twice with unchanged inputs gives the same breakdown.
#[derive(Clone)]
pub struct PayrollEngine {
    attendance: AttendanceService,
    directory: Arc<dyn EmployeeDirectory>,
    leaves: Arc<dyn LeaveSource>,
    rewards: Arc<dyn RewardSource>,
}

impl std::fmt::Debug for PayrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayrollEngine")
            .field("attendance", &self.attendance)
            .finish_non_exhaustive()
    }
}

impl PayrollEngine {
    /// Creates an engine over the attendance service and the input sources.
    pub fn new(
        attendance: AttendanceService,
        directory: Arc<dyn EmployeeDirectory>,
        leaves: Arc<dyn LeaveSource>,
        rewards: Arc<dyn RewardSource>,
    ) -> Self {
        Self {
            attendance,
            directory,
            leaves,
            rewards,
        }
    }

    fn terms(&self, employee_id: &str) -> EngineResult<EmploymentTerms> {
        self.directory
            .employment_terms(employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    /// Calculates one employee's salary for a month.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` if `month` is not 1-12
    /// - `EmployeeNotFound` if the directory has no terms for the employee
    /// - any storage error from the sources
    pub fn calculate_monthly_salary(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlySalaryResult> {
        let period = PayPeriod::month(year, month)?;
        let terms = self.terms(employee_id)?;
        let config = self.attendance.config();

        let days = self.attendance.get_month_summary(employee_id, year, month)?;
        let leave_records =
            self.leaves
                .approved_leaves(employee_id, period.start_date, period.end_date)?;
        let reward_records =
            self.rewards
                .approved_rewards(employee_id, period.start_date, period.end_date)?;

        let leave =
            calculate_leave_summary(&leave_records, &reward_records, &period, &config.holidays);
        let rewards = calculate_reward_summary(&reward_records, &period);
        let attendance = calculate_attendance_totals(&days, None);
        let work_days = config.holidays.count_work_days_in_month(year, month)?;

        let breakdown = calculate_salary(
            SalaryInputs {
                terms: &terms,
                attendance: &attendance,
                leave: &leave,
                rewards: &rewards,
                work_days,
            },
            &config.payroll,
        );

        let calculation_id = Uuid::new_v4();
        info!(
            calculation_id = %calculation_id,
            employee_id = %employee_id,
            year,
            month,
            net_salary = %breakdown.net_salary,
            "Monthly salary calculated"
        );

        Ok(MonthlySalaryResult {
            calculation_id,
            employee_id: employee_id.to_string(),
            contract_type: terms.contract_type,
            period,
            attendance,
            leave,
            rewards,
            breakdown,
            generated_at: Utc::now(),
        })
    }

    /// Calculates the month for every active non-admin employee.
    ///
    /// An employee whose calculation fails is logged and left out; the batch
    /// returns the successful results in directory order.
    pub fn calculate_all_salaries(
        &self,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<MonthlySalaryResult>> {
        PayPeriod::month(year, month)?;
        let employee_ids = self.directory.payroll_employee_ids()?;

        let mut results = Vec::with_capacity(employee_ids.len());
        for employee_id in &employee_ids {
            match self.calculate_monthly_salary(employee_id, year, month) {
                Ok(result) => results.push(result),
                Err(error) => {
                    warn!(
                        employee_id = %employee_id,
                        year,
                        month,
                        error = %error,
                        "Skipping employee in payroll run"
                    );
                }
            }
        }

        info!(
            year,
            month,
            calculated = results.len(),
            skipped = employee_ids.len() - results.len(),
            "Payroll run finished"
        );
        Ok(results)
    }

    /// Attendance-only salary preview.
    ///
    /// Leave and rewards are ignored, and days after today never count as
    /// absent, so the figure for the current month reflects what has been
    /// worked so far rather than a final salary.
    pub fn estimate_salary(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<SalaryEstimate> {
        let period = PayPeriod::month(year, month)?;
        let terms = self.terms(employee_id)?;
        let config = self.attendance.config();
        let today = self.attendance.now().date();

        let days = self.attendance.get_session_summary(employee_id, year, month)?;
        let attendance = calculate_attendance_totals(&days, Some(today));
        let work_days = config.holidays.count_work_days_in_month(year, month)?;

        let breakdown = calculate_salary(
            SalaryInputs {
                terms: &terms,
                attendance: &attendance,
                leave: &LeaveSummary::default(),
                rewards: &RewardSummary::default(),
                work_days,
            },
            &config.payroll,
        );

        let elapsed_work_days = days
            .iter()
            .filter(|d| d.is_work_day && d.date <= today)
            .count() as u32;
        let attendance_rate = if elapsed_work_days == 0 {
            Decimal::ZERO
        } else {
            (attendance.worked_days / Decimal::from(elapsed_work_days) * Decimal::ONE_HUNDRED)
                .round_dp(2)
        };

        Ok(SalaryEstimate {
            employee_id: employee_id.to_string(),
            period,
            base_salary: breakdown.base_salary,
            estimated_net: breakdown.net_salary,
            worked_days: attendance.worked_days,
            expected_days: attendance.expected_days,
            elapsed_work_days,
            attendance_rate,
        })
    }
}
