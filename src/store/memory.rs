//! In-memory implementation of every storage trait.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceSession, EmploymentTerms, LeaveRecord, RewardRecord, SessionKey};

use super::{
    AnomalyFilter, AttendanceStore, DirectoryEntry, EmployeeDirectory, LeaveSource, RewardSource,
};

/// Thread-safe store backed by maps behind mutexes.
///
/// Session uniqueness is enforced by the keyed map: an insert for a key that
/// is already present fails with `SyncConflict`, and the check and insert
/// happen under one lock.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::store::{AttendanceStore, InMemoryStore};
/// use attendance_payroll_engine::models::{AttendanceSession, SessionKey, SessionSlot};
/// use chrono::NaiveDate;
///
/// let store = InMemoryStore::new();
/// let date = NaiveDate::from_ymd_opt(2026, 9, 14).unwrap();
/// let key = SessionKey::new("emp_001", date, SessionSlot::Morning);
/// let session = AttendanceSession::new(&key, date.and_hms_opt(8, 0, 0).unwrap());
///
/// store.insert_session(&session).unwrap();
/// assert!(store.insert_session(&session).is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: Mutex<BTreeMap<SessionKey, AttendanceSession>>,
    employees: Mutex<BTreeMap<String, DirectoryEntry>>,
    leaves: Mutex<Vec<LeaveRecord>>,
    rewards: Mutex<Vec<RewardRecord>>,
}

fn lock<T>(mutex: &Mutex<T>) -> EngineResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| EngineError::Storage {
        message: "in-memory store lock poisoned".to_string(),
    })
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a directory entry.
    pub fn upsert_employee(&self, entry: DirectoryEntry) -> EngineResult<()> {
        lock(&self.employees)?.insert(entry.terms.employee_id.clone(), entry);
        Ok(())
    }

    /// Adds an active regular employee.
    pub fn add_employee(&self, terms: EmploymentTerms) -> EngineResult<()> {
        self.upsert_employee(DirectoryEntry::employee(terms))
    }

    /// Adds a leave record.
    pub fn add_leave(&self, leave: LeaveRecord) -> EngineResult<()> {
        lock(&self.leaves)?.push(leave);
        Ok(())
    }

    /// Adds a reward record.
    pub fn add_reward(&self, reward: RewardRecord) -> EngineResult<()> {
        lock(&self.rewards)?.push(reward);
        Ok(())
    }
}

impl AttendanceStore for InMemoryStore {
    fn find_session(&self, key: &SessionKey) -> EngineResult<Option<AttendanceSession>> {
        Ok(lock(&self.sessions)?.get(key).cloned())
    }

    fn insert_session(&self, session: &AttendanceSession) -> EngineResult<()> {
        let mut sessions = lock(&self.sessions)?;
        let key = session.key();
        if sessions.contains_key(&key) {
            return Err(EngineError::SyncConflict {
                employee_id: key.employee_id,
                date: key.date,
                slot: key.slot,
            });
        }
        sessions.insert(key, session.clone());
        Ok(())
    }

    fn update_session(&self, session: &AttendanceSession) -> EngineResult<()> {
        let mut sessions = lock(&self.sessions)?;
        match sessions.get_mut(&session.key()) {
            Some(existing) if existing.id == session.id => {
                *existing = session.clone();
                Ok(())
            }
            _ => Err(EngineError::Storage {
                message: format!("session {} not found", session.id),
            }),
        }
    }

    fn sessions_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceSession>> {
        Ok(lock(&self.sessions)?
            .values()
            .filter(|s| s.employee_id == employee_id && s.date >= start && s.date <= end)
            .cloned()
            .collect())
    }

    fn last_action_at(&self, employee_id: &str) -> EngineResult<Option<NaiveDateTime>> {
        Ok(lock(&self.sessions)?
            .values()
            .filter(|s| s.employee_id == employee_id)
            .map(|s| s.updated_at)
            .max())
    }

    fn anomalies(&self, filter: &AnomalyFilter) -> EngineResult<Vec<AttendanceSession>> {
        let mut flagged: Vec<AttendanceSession> = lock(&self.sessions)?
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        flagged.sort_by(|a, b| {
            (a.date, a.slot, &a.employee_id).cmp(&(b.date, b.slot, &b.employee_id))
        });
        Ok(flagged)
    }
}

impl EmployeeDirectory for InMemoryStore {
    fn employment_terms(&self, employee_id: &str) -> EngineResult<Option<EmploymentTerms>> {
        Ok(lock(&self.employees)?
            .get(employee_id)
            .map(|entry| entry.terms.clone()))
    }

    fn payroll_employee_ids(&self) -> EngineResult<Vec<String>> {
        Ok(lock(&self.employees)?
            .values()
            .filter(|entry| entry.is_payroll_member())
            .map(|entry| entry.terms.employee_id.clone())
            .collect())
    }
}

impl LeaveSource for InMemoryStore {
    fn approved_leaves(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<LeaveRecord>> {
        Ok(lock(&self.leaves)?
            .iter()
            .filter(|l| {
                l.employee_id == employee_id
                    && l.is_approved()
                    && l.start_date <= end
                    && l.end_date >= start
            })
            .cloned()
            .collect())
    }
}

impl RewardSource for InMemoryStore {
    fn approved_rewards(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<RewardRecord>> {
        Ok(lock(&self.rewards)?
            .iter()
            .filter(|r| {
                r.employee_id == employee_id && r.is_approved() && r.date >= start && r.date <= end
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContractType, EmployeeRole, LeaveStatus, LeaveType, RewardStatus, SessionSlot,
    };
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, d).unwrap()
    }

    fn session(employee_id: &str, day: u32, slot: SessionSlot, hour: u32) -> AttendanceSession {
        let key = SessionKey::new(employee_id, date(day), slot);
        AttendanceSession::new(&key, date(day).and_hms_opt(hour, 0, 0).unwrap())
    }

    fn terms(employee_id: &str) -> EmploymentTerms {
        EmploymentTerms {
            employee_id: employee_id.to_string(),
            base_salary: Decimal::new(1100, 0),
            hourly_rate: None,
            contract_type: ContractType::Cdi,
            annual_leave_allowance: Decimal::new(18, 0),
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_insert_conflict_on_same_key() {
        let store = InMemoryStore::new();
        store
            .insert_session(&session("emp_001", 14, SessionSlot::Morning, 8))
            .unwrap();

        let result = store.insert_session(&session("emp_001", 14, SessionSlot::Morning, 9));
        assert!(matches!(result, Err(EngineError::SyncConflict { .. })));

        store
            .insert_session(&session("emp_001", 14, SessionSlot::Afternoon, 13))
            .unwrap();
    }

    #[test]
    fn test_update_requires_existing_record() {
        let store = InMemoryStore::new();
        let mut record = session("emp_001", 14, SessionSlot::Morning, 8);
        assert!(store.update_session(&record).is_err());

        store.insert_session(&record).unwrap();
        record.duration_minutes = Some(180);
        store.update_session(&record).unwrap();

        let found = store.find_session(&record.key()).unwrap().unwrap();
        assert_eq!(found.duration_minutes, Some(180));
    }

    #[test]
    fn test_last_action_is_latest_update() {
        let store = InMemoryStore::new();
        assert_eq!(store.last_action_at("emp_001").unwrap(), None);

        store
            .insert_session(&session("emp_001", 14, SessionSlot::Morning, 8))
            .unwrap();
        store
            .insert_session(&session("emp_001", 15, SessionSlot::Morning, 9))
            .unwrap();
        store
            .insert_session(&session("emp_002", 16, SessionSlot::Morning, 9))
            .unwrap();

        assert_eq!(
            store.last_action_at("emp_001").unwrap(),
            date(15).and_hms_opt(9, 0, 0)
        );
    }

    #[test]
    fn test_anomalies_ordered_by_date_then_slot() {
        let store = InMemoryStore::new();
        for (employee_id, day, slot) in [
            ("emp_002", 15, SessionSlot::Afternoon),
            ("emp_001", 15, SessionSlot::Morning),
            ("emp_001", 12, SessionSlot::Afternoon),
        ] {
            let mut record = session(employee_id, day, slot, 8);
            record.flag_anomaly("short session: 5 min (minimum 15 min)");
            store.insert_session(&record).unwrap();
        }
        store
            .insert_session(&session("emp_001", 13, SessionSlot::Morning, 8))
            .unwrap();

        let found = store.anomalies(&AnomalyFilter::default()).unwrap();
        let keys: Vec<_> = found.iter().map(|s| (s.date, s.slot)).collect();
        assert_eq!(
            keys,
            vec![
                (date(12), SessionSlot::Afternoon),
                (date(15), SessionSlot::Morning),
                (date(15), SessionSlot::Afternoon),
            ]
        );
    }

    #[test]
    fn test_payroll_population_excludes_admins_and_inactive() {
        let store = InMemoryStore::new();
        store.add_employee(terms("emp_002")).unwrap();
        store.add_employee(terms("emp_001")).unwrap();
        store
            .upsert_employee(DirectoryEntry {
                role: EmployeeRole::Admin,
                ..DirectoryEntry::employee(terms("adm_001"))
            })
            .unwrap();
        store
            .upsert_employee(DirectoryEntry {
                active: false,
                ..DirectoryEntry::employee(terms("emp_003"))
            })
            .unwrap();

        assert_eq!(
            store.payroll_employee_ids().unwrap(),
            vec!["emp_001".to_string(), "emp_002".to_string()]
        );
        assert!(store.employment_terms("adm_001").unwrap().is_some());
        assert!(store.employment_terms("emp_404").unwrap().is_none());
    }

    #[test]
    fn test_sources_return_only_approved_overlapping_records() {
        let store = InMemoryStore::new();
        let leave = |id: &str, status: LeaveStatus, start: u32, end: u32| LeaveRecord {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            leave_type: LeaveType::Paid,
            start_date: date(start),
            end_date: date(end),
            half_day_slot: None,
            status,
            impact_on_salary: false,
        };
        store.add_leave(leave("a", LeaveStatus::Valide, 1, 3)).unwrap();
        store.add_leave(leave("b", LeaveStatus::Pending, 1, 3)).unwrap();
        store.add_leave(leave("c", LeaveStatus::Valide, 20, 25)).unwrap();

        let found = store.approved_leaves("emp_001", date(2), date(10)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");

        store
            .add_reward(RewardRecord {
                id: "rw_1".to_string(),
                employee_id: "emp_001".to_string(),
                date: date(5),
                bonus_amount: Decimal::new(50, 0),
                reason: None,
                status: RewardStatus::Rejected,
            })
            .unwrap();
        assert!(store
            .approved_rewards("emp_001", date(1), date(30))
            .unwrap()
            .is_empty());
    }
}
