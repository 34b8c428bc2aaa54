//! Storage traits and their implementations.
//!
//! The engine talks to its collaborators through four traits:
//!
//! - [`AttendanceStore`]: attendance session records, the only data the
//!   engine writes
//! - [`EmployeeDirectory`]: employment terms and the payroll population
//! - [`LeaveSource`]: approved leave records
//! - [`RewardSource`]: approved reward records
//!
//! [`InMemoryStore`] implements all four for tests and embedding;
//! [`SqliteStore`] implements all four on a SQLite database for the server
//! binary.

mod memory;
mod sqlite;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{
    AttendanceSession, EmployeeRole, EmploymentTerms, LeaveRecord, RewardRecord, SessionKey,
};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Persistence of attendance sessions.
///
/// Implementations must guarantee at most one record per [`SessionKey`]:
/// [`insert_session`](AttendanceStore::insert_session) fails with
/// [`EngineError::SyncConflict`](crate::error::EngineError::SyncConflict)
/// when a record for the key already exists.
pub trait AttendanceStore: Send + Sync {
    /// Looks up the record for a key.
    fn find_session(&self, key: &SessionKey) -> EngineResult<Option<AttendanceSession>>;

    /// Inserts a new record. Fails with `SyncConflict` if the key is taken.
    fn insert_session(&self, session: &AttendanceSession) -> EngineResult<()>;

    /// Overwrites an existing record, matched by id.
    fn update_session(&self, session: &AttendanceSession) -> EngineResult<()>;

    /// All records of an employee dated within `[start, end]`.
    fn sessions_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceSession>>;

    /// Time of the employee's most recent attendance action.
    fn last_action_at(&self, employee_id: &str) -> EngineResult<Option<NaiveDateTime>>;

    /// Flagged records matching the filter, ordered by date then slot.
    fn anomalies(&self, filter: &AnomalyFilter) -> EngineResult<Vec<AttendanceSession>>;
}

/// Read access to employment terms.
pub trait EmployeeDirectory: Send + Sync {
    /// Terms for an employee, or `None` if the id is unknown.
    fn employment_terms(&self, employee_id: &str) -> EngineResult<Option<EmploymentTerms>>;

    /// Ids of active, non-admin employees, sorted.
    fn payroll_employee_ids(&self) -> EngineResult<Vec<String>>;
}

/// Read access to the leave workflow.
pub trait LeaveSource: Send + Sync {
    /// Approved leave records of an employee overlapping `[start, end]`.
    fn approved_leaves(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<LeaveRecord>>;
}

/// Read access to the reward workflow.
pub trait RewardSource: Send + Sync {
    /// Approved reward records of an employee dated within `[start, end]`.
    fn approved_rewards(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<RewardRecord>>;
}

/// Criteria for the anomaly query. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyFilter {
    /// Only this employee's sessions.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Earliest date (inclusive).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest date (inclusive).
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl AnomalyFilter {
    /// Returns true if a flagged session satisfies the filter.
    pub fn matches(&self, session: &AttendanceSession) -> bool {
        session.anomaly_detected
            && self
                .employee_id
                .as_deref()
                .is_none_or(|id| id == session.employee_id)
            && self.from.is_none_or(|from| session.date >= from)
            && self.to.is_none_or(|to| session.date <= to)
    }
}

/// An employee as held by a directory implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Employment terms.
    pub terms: EmploymentTerms,
    /// Account role. Admins are excluded from payroll runs.
    pub role: EmployeeRole,
    /// Inactive employees are excluded from payroll runs.
    pub active: bool,
}

impl DirectoryEntry {
    /// An active regular employee.
    pub fn employee(terms: EmploymentTerms) -> Self {
        Self {
            terms,
            role: EmployeeRole::Employee,
            active: true,
        }
    }

    /// Returns true if the entry takes part in payroll runs.
    pub fn is_payroll_member(&self) -> bool {
        self.active && self.role == EmployeeRole::Employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionSlot;

    fn flagged(employee_id: &str, day: u32) -> AttendanceSession {
        let date = NaiveDate::from_ymd_opt(2026, 9, day).unwrap();
        let key = SessionKey::new(employee_id, date, SessionSlot::Morning);
        let mut session = AttendanceSession::new(&key, date.and_hms_opt(8, 0, 0).unwrap());
        session.flag_anomaly("check-in on a non-working day (weekend)");
        session
    }

    #[test]
    fn test_empty_filter_matches_any_flagged_session() {
        assert!(AnomalyFilter::default().matches(&flagged("emp_001", 12)));
    }

    #[test]
    fn test_unflagged_session_never_matches() {
        let mut session = flagged("emp_001", 12);
        session.anomaly_detected = false;
        assert!(!AnomalyFilter::default().matches(&session));
    }

    #[test]
    fn test_filter_by_employee_and_range() {
        let filter = AnomalyFilter {
            employee_id: Some("emp_001".to_string()),
            from: NaiveDate::from_ymd_opt(2026, 9, 10),
            to: NaiveDate::from_ymd_opt(2026, 9, 12),
        };
        assert!(filter.matches(&flagged("emp_001", 12)));
        assert!(filter.matches(&flagged("emp_001", 10)));
        assert!(!filter.matches(&flagged("emp_001", 13)));
        assert!(!filter.matches(&flagged("emp_002", 12)));
    }
}
