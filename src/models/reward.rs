//! Reward records produced by the reward-grant workflow.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Approval state of a reward grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    /// Waiting for approval.
    Pending,
    /// Approved; the only state the engine consumes.
    Approved,
    /// Rejected.
    Rejected,
}

impl RewardStatus {
    /// The text stored in the database for this status.
    pub fn as_db_str(self) -> &'static str {
        match self {
            RewardStatus::Pending => "pending",
            RewardStatus::Approved => "approved",
            RewardStatus::Rejected => "rejected",
        }
    }

    /// Parses the database representation of a status.
    pub fn from_db_str(value: &str) -> Option<RewardStatus> {
        match value {
            "pending" => Some(RewardStatus::Pending),
            "approved" => Some(RewardStatus::Approved),
            "rejected" => Some(RewardStatus::Rejected),
            _ => None,
        }
    }
}

/// A single rewarded date carrying a salary bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// Identifier from the reward workflow.
    pub id: String,
    /// The rewarded employee.
    pub employee_id: String,
    /// The rewarded date.
    pub date: NaiveDate,
    /// Bonus added to the month's salary.
    pub bonus_amount: Decimal,
    /// Free-text reason given by the approver.
    #[serde(default)]
    pub reason: Option<String>,
    /// Approval state.
    pub status: RewardStatus,
}

impl RewardRecord {
    /// Returns true if the reward has been approved.
    pub fn is_approved(&self) -> bool {
        self.status == RewardStatus::Approved
    }
}

/// Approved rewards for one employee and one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    /// Sum of the bonus amounts.
    pub total_bonus: Decimal,
    /// Number of distinct rewarded dates.
    pub reward_days: u32,
    /// The records that contributed, for traceability.
    pub records: Vec<RewardRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_reward_with_string_amount() {
        let json = r#"{
            "id": "rw_001",
            "employee_id": "emp_001",
            "date": "2026-09-18",
            "bonus_amount": "75.50",
            "status": "approved"
        }"#;

        let record: RewardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.bonus_amount, Decimal::new(7550, 2));
        assert!(record.is_approved());
        assert!(record.reason.is_none());
    }

    #[test]
    fn test_status_db_round_trip() {
        for status in [
            RewardStatus::Pending,
            RewardStatus::Approved,
            RewardStatus::Rejected,
        ] {
            assert_eq!(RewardStatus::from_db_str(status.as_db_str()), Some(status));
        }
    }
}
