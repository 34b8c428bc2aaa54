//! Leave records produced by the leave-approval workflow.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::SessionSlot;

/// The kind of leave taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual leave.
    Paid,
    /// Unpaid leave. The only type that reduces salary.
    Unpaid,
    /// Maternity leave.
    Maternite,
    /// Sick leave.
    Maladie,
    /// Notice period leave.
    Preavis,
    /// Leave granted as a reward.
    Reward,
}

impl LeaveType {
    /// Returns true if days of this type are deducted from salary.
    pub fn deducts_salary(self) -> bool {
        self == LeaveType::Unpaid
    }

    /// The text stored in the database for this type.
    pub fn as_db_str(self) -> &'static str {
        match self {
            LeaveType::Paid => "paid",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Maternite => "maternite",
            LeaveType::Maladie => "maladie",
            LeaveType::Preavis => "preavis",
            LeaveType::Reward => "reward",
        }
    }

    /// Parses the database representation of a type.
    pub fn from_db_str(value: &str) -> Option<LeaveType> {
        match value {
            "paid" => Some(LeaveType::Paid),
            "unpaid" => Some(LeaveType::Unpaid),
            "maternite" => Some(LeaveType::Maternite),
            "maladie" => Some(LeaveType::Maladie),
            "preavis" => Some(LeaveType::Preavis),
            "reward" => Some(LeaveType::Reward),
            _ => None,
        }
    }
}

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Waiting for approval.
    Pending,
    /// Approved; the only state the engine consumes.
    Valide,
    /// Refused.
    Refuse,
}

impl LeaveStatus {
    /// The text stored in the database for this status.
    pub fn as_db_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Valide => "valide",
            LeaveStatus::Refuse => "refuse",
        }
    }

    /// Parses the database representation of a status.
    pub fn from_db_str(value: &str) -> Option<LeaveStatus> {
        match value {
            "pending" => Some(LeaveStatus::Pending),
            "valide" => Some(LeaveStatus::Valide),
            "refuse" => Some(LeaveStatus::Refuse),
            _ => None,
        }
    }
}

/// An approved (or pending) leave over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// Identifier from the leave workflow.
    pub id: String,
    /// The employee on leave.
    pub employee_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// The slot covered by a half-day leave; `None` for full days.
    #[serde(default)]
    pub half_day_slot: Option<SessionSlot>,
    /// Approval state.
    pub status: LeaveStatus,
    /// Flag carried from the leave workflow. Deduction is decided by
    /// [`LeaveType::deducts_salary`], not by this flag.
    #[serde(default)]
    pub impact_on_salary: bool,
}

impl LeaveRecord {
    /// Returns true if the leave has been approved.
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Valide
    }

    /// Returns true if the leave covers the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if the leave only covers one slot per day.
    pub fn is_half_day(&self) -> bool {
        self.half_day_slot.is_some()
    }
}

/// Leave day counts for one employee and one month.
///
/// Counts are work days within the month; half-day leaves count 0.5.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSummary {
    /// Paid leave days.
    pub paid_days: Decimal,
    /// Unpaid leave days.
    pub unpaid_days: Decimal,
    /// Sick leave days.
    pub sick_days: Decimal,
    /// Maternity leave days.
    pub maternity_days: Decimal,
    /// Notice-period and reward leave days.
    pub other_days: Decimal,
    /// All leave days.
    pub total_days: Decimal,
    /// Days deducted from salary (unpaid leave only).
    pub salary_deduction_days: Decimal,
    /// The approved records that contributed to the counts.
    pub records: Vec<LeaveRecord>,
}
