//! Core data models for the attendance and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance_action;
mod day_summary;
mod employment;
mod leave;
mod pay_period;
mod reward;
mod salary_result;
mod session;

pub use attendance_action::{AttendanceResponse, RejectionReason};
pub use day_summary::{AttendanceCalculation, DayAttendanceSummary, DayStatus, TodayStatus};
pub use employment::{ContractType, EmployeeRole, EmploymentTerms};
pub use leave::{LeaveRecord, LeaveStatus, LeaveSummary, LeaveType};
pub use pay_period::PayPeriod;
pub use reward::{RewardRecord, RewardStatus, RewardSummary};
pub use salary_result::{AuditStep, MonthlySalaryResult, SalaryBreakdown, SalaryEstimate};
pub use session::{AttendanceSession, Evidence, SessionKey, SessionSlot, SessionStatus};
