//! The check-in/check-out state machine and attendance views.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use crate::calculation::{covering_leave, off_day_status, reduce_day_status};
use crate::config::{AttendancePolicy, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceResponse, AttendanceSession, DayAttendanceSummary, DayStatus, Evidence,
    LeaveRecord, PayPeriod, RejectionReason, RewardRecord, SessionKey, SessionSlot,
    SessionStatus, TodayStatus,
};
use crate::store::{AnomalyFilter, AttendanceStore, LeaveSource, RewardSource};

use super::clock::Clock;

/// Records check-ins and check-outs and derives attendance views.
///
/// Per (employee, date, slot) a session moves `no record → checked in →
/// completed`. Refused actions are returned as a [`RejectionReason`] in the
/// response, never as an error.
///
/// The service holds no state of its own. Concurrent check-ins for the same
/// slot are arbitrated by the store's uniqueness guarantee: the loser of the
/// race sees `SyncConflict`, re-reads the record and is answered
/// `ALREADY_CHECKED_IN`.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    leaves: Arc<dyn LeaveSource>,
    rewards: Arc<dyn RewardSource>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl std::fmt::Debug for AttendanceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AttendanceService {
    /// Creates a service over its collaborators.
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        leaves: Arc<dyn LeaveSource>,
        rewards: Arc<dyn RewardSource>,
        clock: Arc<dyn Clock>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            store,
            leaves,
            rewards,
            clock,
            config,
        }
    }

    /// The engine configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current local time according to the service's clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn policy(&self) -> &AttendancePolicy {
        &self.config.attendance
    }

    /// Records a check-in for today's `slot`.
    ///
    /// Checks, in order: the time window, an existing check-in on the slot,
    /// and the minimum delay since the employee's previous action. A check-in
    /// on a weekend or public holiday is accepted but flagged as an anomaly.
    pub fn check_in(
        &self,
        employee_id: &str,
        slot: SessionSlot,
        evidence: &Evidence,
    ) -> EngineResult<AttendanceResponse> {
        let now = self.clock.now();
        if let Some(reason) = self.outside_window(now) {
            info!(employee_id = %employee_id, slot = %slot, code = reason.code(), "Check-in refused");
            return Ok(AttendanceResponse::rejected(reason, None));
        }

        let key = SessionKey::new(employee_id, now.date(), slot);
        // The last action must be read before the record so that a concurrent
        // winner is always seen as ALREADY_CHECKED_IN rather than TOO_SOON.
        let last_action = self.store.last_action_at(employee_id)?;
        let existing = self.store.find_session(&key)?;

        if let Some(reason) = self.check_in_rejection(existing.as_ref(), last_action, now) {
            info!(employee_id = %employee_id, slot = %slot, code = reason.code(), "Check-in refused");
            return Ok(AttendanceResponse::rejected(reason, existing));
        }

        if let Some(record) = existing {
            return self.fill_check_in(record, now, evidence);
        }

        let mut record = AttendanceSession::new(&key, now);
        self.apply_check_in(&mut record, now, evidence);

        match self.store.insert_session(&record) {
            Ok(()) => {
                info!(
                    employee_id = %employee_id,
                    slot = %slot,
                    session_id = %record.id,
                    anomaly = record.anomaly_detected,
                    "Check-in recorded"
                );
                Ok(AttendanceResponse::accepted(
                    record,
                    format!("Checked in at {} ({})", now.format("%H:%M"), slot),
                ))
            }
            Err(EngineError::SyncConflict { .. }) => {
                warn!(employee_id = %employee_id, slot = %slot, "Check-in insert conflict, re-reading session");
                self.resolve_check_in_conflict(&key, last_action, now, evidence)
            }
            Err(error) => Err(error),
        }
    }

    fn resolve_check_in_conflict(
        &self,
        key: &SessionKey,
        last_action: Option<NaiveDateTime>,
        now: NaiveDateTime,
        evidence: &Evidence,
    ) -> EngineResult<AttendanceResponse> {
        let Some(record) = self.store.find_session(key)? else {
            return Err(EngineError::TransientConflict {
                employee_id: key.employee_id.clone(),
                date: key.date,
                slot: key.slot,
            });
        };

        if let Some(reason) = self.check_in_rejection(Some(&record), last_action, now) {
            info!(employee_id = %key.employee_id, slot = %key.slot, code = reason.code(), "Check-in refused after conflict");
            return Ok(AttendanceResponse::rejected(reason, Some(record)));
        }

        self.fill_check_in(record, now, evidence)
    }

    fn fill_check_in(
        &self,
        mut record: AttendanceSession,
        now: NaiveDateTime,
        evidence: &Evidence,
    ) -> EngineResult<AttendanceResponse> {
        self.apply_check_in(&mut record, now, evidence);
        self.store.update_session(&record)?;
        info!(
            employee_id = %record.employee_id,
            slot = %record.slot,
            session_id = %record.id,
            "Check-in recorded on existing session"
        );
        let message = format!("Checked in at {} ({})", now.format("%H:%M"), record.slot);
        Ok(AttendanceResponse::accepted(record, message))
    }

    fn apply_check_in(&self, record: &mut AttendanceSession, now: NaiveDateTime, evidence: &Evidence) {
        record.check_in = Some(now);
        record.status = SessionStatus::Partial;
        record.check_in_photo = evidence.photo_ref.clone();
        apply_evidence(record, evidence);
        record.updated_at = now;

        let calendar = &self.config.holidays;
        if !calendar.is_work_day(record.date) {
            let label = calendar.holiday_name(record.date).unwrap_or("weekend");
            record.flag_anomaly(format!("check-in on a non-working day ({})", label));
        }
    }

    fn check_in_rejection(
        &self,
        existing: Option<&AttendanceSession>,
        last_action: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Option<RejectionReason> {
        if existing.is_some_and(|s| s.check_in.is_some()) {
            return Some(RejectionReason::AlreadyCheckedIn);
        }
        last_action.and_then(|last| self.too_soon(last, now))
    }

    /// Records a check-out for today's `slot`.
    ///
    /// The session duration is rounded to the nearest minute. Sessions of at
    /// least the full-session threshold become [`SessionStatus::Full`];
    /// sessions shorter than the minimum length are accepted but flagged.
    pub fn check_out(
        &self,
        employee_id: &str,
        slot: SessionSlot,
        evidence: &Evidence,
    ) -> EngineResult<AttendanceResponse> {
        let now = self.clock.now();
        let key = SessionKey::new(employee_id, now.date(), slot);
        let existing = self.store.find_session(&key)?;

        let (mut record, check_in) = match existing {
            Some(record) => match record.check_in {
                Some(check_in) => (record, check_in),
                None => return Ok(self.refuse_check_out(RejectionReason::NotCheckedIn, Some(record))),
            },
            None => return Ok(self.refuse_check_out(RejectionReason::NotCheckedIn, None)),
        };

        if record.check_out.is_some() {
            return Ok(self.refuse_check_out(RejectionReason::AlreadyCheckedOut, Some(record)));
        }
        if let Some(reason) = self.too_soon(check_in, now) {
            return Ok(self.refuse_check_out(reason, Some(record)));
        }

        let policy = self.policy();
        let duration = duration_minutes(check_in, now);
        record.check_out = Some(now);
        record.duration_minutes = Some(duration);
        record.status = if duration >= policy.full_session_minutes {
            SessionStatus::Full
        } else {
            SessionStatus::Partial
        };
        record.check_out_photo = evidence.photo_ref.clone();
        apply_evidence(&mut record, evidence);
        record.updated_at = now;

        if duration < policy.min_session_minutes {
            record.flag_anomaly(format!(
                "short session: {} min (minimum {} min)",
                duration, policy.min_session_minutes
            ));
        }

        self.store.update_session(&record)?;
        info!(
            employee_id = %employee_id,
            slot = %slot,
            session_id = %record.id,
            duration_minutes = duration,
            status = record.status.as_db_str(),
            "Check-out recorded"
        );

        let message = format!("Checked out after {}h{:02}", duration / 60, duration % 60);
        Ok(AttendanceResponse::accepted(record, message))
    }

    fn refuse_check_out(
        &self,
        reason: RejectionReason,
        session: Option<AttendanceSession>,
    ) -> AttendanceResponse {
        info!(code = reason.code(), "Check-out refused");
        AttendanceResponse::rejected(reason, session)
    }

    fn outside_window(&self, now: NaiveDateTime) -> Option<RejectionReason> {
        let policy = self.policy();
        let hour = now.hour();
        if hour < policy.window_start_hour || hour >= policy.window_end_hour {
            Some(RejectionReason::OutsideWorkingHours {
                start_hour: policy.window_start_hour,
                end_hour: policy.window_end_hour,
            })
        } else {
            None
        }
    }

    fn too_soon(&self, since: NaiveDateTime, now: NaiveDateTime) -> Option<RejectionReason> {
        let elapsed = (now - since).num_seconds().max(0);
        let min_delay = self.policy().min_action_delay_seconds;
        (elapsed < min_delay).then_some(RejectionReason::TooSoon {
            wait_seconds: min_delay - elapsed,
        })
    }

    /// Today's sessions and the day status derived from them.
    ///
    /// Leave and rewards are not consulted.
    pub fn get_today_status(&self, employee_id: &str) -> EngineResult<TodayStatus> {
        let today = self.clock.now().date();
        let morning = self
            .store
            .find_session(&SessionKey::new(employee_id, today, SessionSlot::Morning))?;
        let afternoon = self
            .store
            .find_session(&SessionKey::new(employee_id, today, SessionSlot::Afternoon))?;

        let day_status = reduce_day_status(
            today,
            morning.as_ref().map(|s| s.status),
            afternoon.as_ref().map(|s| s.status),
            &self.config.holidays,
        );

        Ok(TodayStatus {
            date: today,
            morning,
            afternoon,
            day_status,
        })
    }

    /// One summary per calendar day of the month.
    ///
    /// Precedence per day: non-work day, then an approved reward, then an
    /// approved leave, then the recorded sessions.
    pub fn get_month_summary(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<DayAttendanceSummary>> {
        let period = PayPeriod::month(year, month)?;
        let leaves: Vec<LeaveRecord> = self
            .leaves
            .approved_leaves(employee_id, period.start_date, period.end_date)?
            .into_iter()
            .filter(LeaveRecord::is_approved)
            .collect();
        let rewards: Vec<RewardRecord> = self
            .rewards
            .approved_rewards(employee_id, period.start_date, period.end_date)?
            .into_iter()
            .filter(RewardRecord::is_approved)
            .collect();

        self.summarize_month(employee_id, &period, &leaves, &rewards)
    }

    /// One summary per calendar day of the month from recorded sessions only.
    ///
    /// Leave and rewards are not consulted, so a work day without a worked
    /// session is `Absent` even if a leave or reward covers it.
    pub fn get_session_summary(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<DayAttendanceSummary>> {
        let period = PayPeriod::month(year, month)?;
        self.summarize_month(employee_id, &period, &[], &[])
    }

    fn summarize_month(
        &self,
        employee_id: &str,
        period: &PayPeriod,
        leaves: &[LeaveRecord],
        rewards: &[RewardRecord],
    ) -> EngineResult<Vec<DayAttendanceSummary>> {
        let sessions =
            self.store
                .sessions_in_range(employee_id, period.start_date, period.end_date)?;

        debug!(
            employee_id = %employee_id,
            start = %period.start_date,
            sessions = sessions.len(),
            leaves = leaves.len(),
            rewards = rewards.len(),
            "Building month summary"
        );

        let mut by_slot: HashMap<(NaiveDate, SessionSlot), AttendanceSession> = sessions
            .into_iter()
            .map(|s| ((s.date, s.slot), s))
            .collect();

        Ok(period
            .days()
            .map(|date| {
                let morning = by_slot.remove(&(date, SessionSlot::Morning));
                let afternoon = by_slot.remove(&(date, SessionSlot::Afternoon));
                self.summarize_day(date, morning, afternoon, leaves, rewards)
            })
            .collect())
    }

    fn summarize_day(
        &self,
        date: NaiveDate,
        morning: Option<AttendanceSession>,
        afternoon: Option<AttendanceSession>,
        leaves: &[LeaveRecord],
        rewards: &[RewardRecord],
    ) -> DayAttendanceSummary {
        let policy = self.policy();
        let mut summary = DayAttendanceSummary {
            date,
            is_work_day: true,
            status: DayStatus::Absent,
            morning,
            afternoon,
            worked_minutes: 0,
            expected_minutes: policy.expected_day_minutes,
            leave_type: None,
        };

        if let Some(status) = off_day_status(date, &self.config.holidays) {
            summary.is_work_day = false;
            summary.status = status;
            summary.expected_minutes = 0;
            return summary;
        }

        if rewards.iter().any(|r| r.date == date) {
            summary.status = DayStatus::Reward;
            summary.worked_minutes = policy.reward_credit_minutes;
            return summary;
        }

        if let Some((leave, half_slot)) = covering_leave(leaves, date) {
            summary.leave_type = Some(leave.leave_type);
            match half_slot {
                None => {
                    summary.status = DayStatus::LeaveFull;
                    summary.worked_minutes = policy.expected_day_minutes;
                }
                Some(slot) => {
                    let (status, credit, other) = match slot {
                        SessionSlot::Morning => (
                            DayStatus::LeaveHalfAm,
                            policy.morning_credit_minutes,
                            summary.afternoon.as_ref(),
                        ),
                        SessionSlot::Afternoon => (
                            DayStatus::LeaveHalfPm,
                            policy.afternoon_credit_minutes,
                            summary.morning.as_ref(),
                        ),
                    };
                    summary.worked_minutes =
                        credit + other.map(AttendanceSession::worked_minutes).unwrap_or(0);
                    summary.status = status;
                }
            }
            return summary;
        }

        summary.status = reduce_day_status(
            date,
            summary.morning.as_ref().map(|s| s.status),
            summary.afternoon.as_ref().map(|s| s.status),
            &self.config.holidays,
        );
        summary.worked_minutes = [summary.morning.as_ref(), summary.afternoon.as_ref()]
            .into_iter()
            .flatten()
            .map(AttendanceSession::worked_minutes)
            .sum();
        summary
    }

    /// Flagged sessions matching the filter, ordered by date then slot.
    pub fn get_anomalies(&self, filter: &AnomalyFilter) -> EngineResult<Vec<AttendanceSession>> {
        self.store.anomalies(filter)
    }
}

fn apply_evidence(record: &mut AttendanceSession, evidence: &Evidence) {
    if evidence.source_ip.is_some() {
        record.source_ip = evidence.source_ip.clone();
    }
    if evidence.device_fingerprint.is_some() {
        record.device_fingerprint = evidence.device_fingerprint.clone();
    }
}

/// Whole minutes between two instants, rounded to nearest and never negative.
fn duration_minutes(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let seconds = (to - from).num_seconds().max(0);
    (seconds + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::ManualClock;
    use crate::models::{LeaveStatus, LeaveType, RewardStatus};
    use crate::store::InMemoryStore;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::Barrier;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        clock: Arc<ManualClock>,
        service: AttendanceService,
    }

    fn fixture(start: NaiveDateTime) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(start));
        let service = AttendanceService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
            Arc::new(EngineConfig::default()),
        );
        Fixture {
            store,
            clock,
            service,
        }
    }

    fn code(response: &AttendanceResponse) -> Option<&'static str> {
        response.rejection.as_ref().map(RejectionReason::code)
    }

    #[test]
    fn test_morning_session_of_three_hours_is_full() {
        let f = fixture(at(14, 8, 0));
        let checked_in = f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert!(checked_in.success);
        assert_eq!(checked_in.session.as_ref().unwrap().status, SessionStatus::Partial);
        assert!(checked_in.anomaly.is_none());

        f.clock.set(at(14, 11, 0));
        let checked_out = f
            .service
            .check_out("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();

        assert!(checked_out.success);
        assert_eq!(checked_out.message, "Checked out after 3h00");
        let session = checked_out.session.unwrap();
        assert_eq!(session.duration_minutes, Some(180));
        assert_eq!(session.status, SessionStatus::Full);
        assert!(session.is_completed());
    }

    #[test]
    fn test_second_check_in_is_already_checked_in() {
        let f = fixture(at(14, 8, 0));
        f.service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();

        // Within the minimum delay: the duplicate still reports ALREADY_CHECKED_IN.
        f.clock.advance(Duration::seconds(5));
        let again = f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert!(!again.success);
        assert_eq!(code(&again), Some("ALREADY_CHECKED_IN"));
        assert!(again.session.is_some());
    }

    #[test]
    fn test_actions_too_close_together_are_refused() {
        let f = fixture(at(14, 8, 0));
        f.service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();

        f.clock.advance(Duration::seconds(10));
        let afternoon = f
            .service
            .check_in("emp_001", SessionSlot::Afternoon, &Evidence::default())
            .unwrap();
        assert_eq!(
            afternoon.rejection,
            Some(RejectionReason::TooSoon { wait_seconds: 20 })
        );

        let early_out = f
            .service
            .check_out("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert_eq!(code(&early_out), Some("TOO_SOON"));
    }

    #[test]
    fn test_window_boundaries() {
        let f = fixture(at(14, 5, 59));
        let early = f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert_eq!(
            early.rejection,
            Some(RejectionReason::OutsideWorkingHours {
                start_hour: 6,
                end_hour: 22
            })
        );

        f.clock.set(at(14, 22, 0));
        let late = f
            .service
            .check_in("emp_001", SessionSlot::Afternoon, &Evidence::default())
            .unwrap();
        assert_eq!(code(&late), Some("OUTSIDE_WORKING_HOURS"));

        f.clock.set(at(14, 6, 0));
        assert!(f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap()
            .success);
    }

    #[test]
    fn test_check_out_without_check_in() {
        let f = fixture(at(14, 12, 0));
        let response = f
            .service
            .check_out("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert!(!response.success);
        assert_eq!(code(&response), Some("NOT_CHECKED_IN"));
        assert!(response.session.is_none());
        let key = SessionKey::new("emp_001", date(14), SessionSlot::Morning);
        assert!(f.store.find_session(&key).unwrap().is_none());
    }

    #[test]
    fn test_double_check_out_is_refused() {
        let f = fixture(at(14, 13, 0));
        f.service
            .check_in("emp_001", SessionSlot::Afternoon, &Evidence::default())
            .unwrap();
        f.clock.set(at(14, 17, 0));
        f.service
            .check_out("emp_001", SessionSlot::Afternoon, &Evidence::default())
            .unwrap();

        f.clock.set(at(14, 17, 5));
        let again = f
            .service
            .check_out("emp_001", SessionSlot::Afternoon, &Evidence::default())
            .unwrap();
        assert_eq!(code(&again), Some("ALREADY_CHECKED_OUT"));
        assert_eq!(again.session.unwrap().duration_minutes, Some(240));
    }

    #[test]
    fn test_short_session_is_flagged_not_blocked() {
        let f = fixture(at(14, 8, 0));
        f.service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        f.clock.set(at(14, 8, 10));
        let response = f
            .service
            .check_out("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();

        assert!(response.success);
        assert_eq!(
            response.anomaly.as_deref(),
            Some("short session: 10 min (minimum 15 min)")
        );
        let session = response.session.unwrap();
        assert_eq!(session.status, SessionStatus::Partial);
        assert!(session.anomaly_detected);
    }

    #[test]
    fn test_weekend_and_holiday_check_ins_are_flagged() {
        let labour_day = NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let f = fixture(labour_day);
        let holiday = f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert!(holiday.success);
        assert_eq!(
            holiday.anomaly.as_deref(),
            Some("check-in on a non-working day (Labour Day)")
        );

        f.clock.set(at(12, 9, 0));
        let saturday = f
            .service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        assert_eq!(
            saturday.anomaly.as_deref(),
            Some("check-in on a non-working day (weekend)")
        );

        let flagged = f.service.get_anomalies(&AnomalyFilter::default()).unwrap();
        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].date, labour_day.date());
        assert_eq!(flagged[1].date, date(12));
    }

    #[test]
    fn test_evidence_is_attached() {
        let f = fixture(at(14, 8, 0));
        let evidence = Evidence {
            photo_ref: Some("photos/in.jpg".to_string()),
            source_ip: Some("10.0.0.7".to_string()),
            device_fingerprint: Some("fp-1".to_string()),
        };
        f.service
            .check_in("emp_001", SessionSlot::Morning, &evidence)
            .unwrap();

        f.clock.set(at(14, 11, 0));
        let out = Evidence {
            photo_ref: Some("photos/out.jpg".to_string()),
            source_ip: Some("10.0.0.8".to_string()),
            device_fingerprint: None,
        };
        let session = f
            .service
            .check_out("emp_001", SessionSlot::Morning, &out)
            .unwrap()
            .session
            .unwrap();

        assert_eq!(session.check_in_photo.as_deref(), Some("photos/in.jpg"));
        assert_eq!(session.check_out_photo.as_deref(), Some("photos/out.jpg"));
        assert_eq!(session.source_ip.as_deref(), Some("10.0.0.8"));
        assert_eq!(session.device_fingerprint.as_deref(), Some("fp-1"));
    }

    #[test]
    fn test_concurrent_check_ins_record_exactly_one() {
        let f = fixture(at(14, 8, 0));
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let service = f.service.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    service
                        .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
                        .unwrap()
                })
            })
            .collect();

        let responses: Vec<AttendanceResponse> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(responses.iter().filter(|r| r.success).count(), 1);
        for response in responses.iter().filter(|r| !r.success) {
            assert_eq!(code(response), Some("ALREADY_CHECKED_IN"));
        }
        let sessions = f
            .store
            .sessions_in_range("emp_001", date(14), date(14))
            .unwrap();
        assert_eq!(sessions.len(), 1);
    }

    /// Store whose inserts always lose a race against another writer.
    struct RacingStore {
        inner: InMemoryStore,
        leave_placeholder: bool,
    }

    impl AttendanceStore for RacingStore {
        fn find_session(&self, key: &SessionKey) -> EngineResult<Option<AttendanceSession>> {
            self.inner.find_session(key)
        }

        fn insert_session(&self, session: &AttendanceSession) -> EngineResult<()> {
            if self.leave_placeholder {
                let placeholder = AttendanceSession::new(&session.key(), session.created_at);
                self.inner.insert_session(&placeholder)?;
            }
            Err(EngineError::SyncConflict {
                employee_id: session.employee_id.clone(),
                date: session.date,
                slot: session.slot,
            })
        }

        fn update_session(&self, session: &AttendanceSession) -> EngineResult<()> {
            self.inner.update_session(session)
        }

        fn sessions_in_range(
            &self,
            employee_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> EngineResult<Vec<AttendanceSession>> {
            self.inner.sessions_in_range(employee_id, start, end)
        }

        fn last_action_at(&self, employee_id: &str) -> EngineResult<Option<NaiveDateTime>> {
            self.inner.last_action_at(employee_id)
        }

        fn anomalies(&self, filter: &AnomalyFilter) -> EngineResult<Vec<AttendanceSession>> {
            self.inner.anomalies(filter)
        }
    }

    fn racing_service(leave_placeholder: bool) -> (Arc<RacingStore>, AttendanceService) {
        let store = Arc::new(RacingStore {
            inner: InMemoryStore::new(),
            leave_placeholder,
        });
        let sources = Arc::new(InMemoryStore::new());
        let service = AttendanceService::new(
            store.clone(),
            sources.clone(),
            sources,
            Arc::new(ManualClock::new(at(14, 8, 0))),
            Arc::new(EngineConfig::default()),
        );
        (store, service)
    }

    #[test]
    fn test_conflict_with_check_in_less_record_fills_it() {
        let (store, service) = racing_service(true);
        let response = service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();

        assert!(response.success);
        let stored = store
            .find_session(&SessionKey::new("emp_001", date(14), SessionSlot::Morning))
            .unwrap()
            .unwrap();
        assert_eq!(stored.check_in, Some(at(14, 8, 0)));
    }

    #[test]
    fn test_conflict_with_vanished_record_is_transient() {
        let (_store, service) = racing_service(false);
        let result = service.check_in("emp_001", SessionSlot::Morning, &Evidence::default());
        assert!(matches!(result, Err(EngineError::TransientConflict { .. })));
    }

    #[test]
    fn test_today_status_from_sessions() {
        let f = fixture(at(14, 8, 0));
        let empty = f.service.get_today_status("emp_001").unwrap();
        assert_eq!(empty.day_status, DayStatus::Absent);

        f.service
            .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
            .unwrap();
        let status = f.service.get_today_status("emp_001").unwrap();
        assert_eq!(status.date, date(14));
        assert_eq!(status.day_status, DayStatus::HalfDayAm);
        assert!(status.afternoon.is_none());
    }

    fn work(f: &Fixture, day: u32, slot: SessionSlot, from: (u32, u32), to: (u32, u32)) {
        f.clock.set(at(day, from.0, from.1));
        assert!(f.service.check_in("emp_001", slot, &Evidence::default()).unwrap().success);
        f.clock.set(at(day, to.0, to.1));
        assert!(f.service.check_out("emp_001", slot, &Evidence::default()).unwrap().success);
    }

    fn leave(id: &str, day: u32, half: Option<SessionSlot>, status: LeaveStatus) -> LeaveRecord {
        LeaveRecord {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            leave_type: LeaveType::Paid,
            start_date: date(day),
            end_date: date(day),
            half_day_slot: half,
            status,
            impact_on_salary: false,
        }
    }

    #[test]
    fn test_month_summary_precedence_and_credits() {
        let f = fixture(at(1, 8, 0));
        work(&f, 12, SessionSlot::Morning, (9, 0), (12, 0));
        work(&f, 14, SessionSlot::Morning, (8, 0), (11, 0));
        work(&f, 14, SessionSlot::Afternoon, (13, 0), (17, 0));
        work(&f, 15, SessionSlot::Morning, (8, 0), (11, 0));
        work(&f, 16, SessionSlot::Morning, (8, 0), (11, 0));
        work(&f, 17, SessionSlot::Afternoon, (13, 0), (17, 0));

        f.store.add_leave(leave("lv_full", 18, None, LeaveStatus::Valide)).unwrap();
        f.store
            .add_leave(leave("lv_half", 17, Some(SessionSlot::Morning), LeaveStatus::Valide))
            .unwrap();
        f.store.add_leave(leave("lv_pending", 21, None, LeaveStatus::Pending)).unwrap();
        f.store
            .add_reward(RewardRecord {
                id: "rw_1".to_string(),
                employee_id: "emp_001".to_string(),
                date: date(16),
                bonus_amount: Decimal::new(50, 0),
                reason: None,
                status: RewardStatus::Approved,
            })
            .unwrap();

        let days = f.service.get_month_summary("emp_001", 2026, 9).unwrap();
        assert_eq!(days.len(), 30);
        let day = |d: u32| &days[(d - 1) as usize];

        assert_eq!(day(12).status, DayStatus::Weekend);
        assert_eq!(day(12).worked_minutes, 0);
        assert!(day(12).morning.is_some());
        assert_eq!(day(14).status, DayStatus::FullDay);
        assert_eq!(day(14).worked_minutes, 420);
        assert_eq!(day(15).status, DayStatus::HalfDayAm);
        assert_eq!(day(15).worked_minutes, 180);
        assert_eq!(day(16).status, DayStatus::Reward);
        assert_eq!(day(16).worked_minutes, 480);
        assert_eq!(day(17).status, DayStatus::LeaveHalfAm);
        assert_eq!(day(17).worked_minutes, 420);
        assert_eq!(day(17).leave_type, Some(LeaveType::Paid));
        assert_eq!(day(18).status, DayStatus::LeaveFull);
        assert_eq!(day(18).worked_minutes, 420);
        assert_eq!(day(21).status, DayStatus::Absent);
        assert!(days.iter().filter(|d| d.is_work_day).all(|d| d.expected_minutes == 420));
        assert!(days.iter().filter(|d| !d.is_work_day).all(|d| d.expected_minutes == 0));
    }

    #[test]
    fn test_session_summary_ignores_leave_and_rewards() {
        let f = fixture(at(1, 8, 0));
        work(&f, 15, SessionSlot::Morning, (8, 0), (11, 0));
        f.store.add_leave(leave("lv_full", 14, None, LeaveStatus::Valide)).unwrap();
        f.store
            .add_leave(leave("lv_half", 15, Some(SessionSlot::Afternoon), LeaveStatus::Valide))
            .unwrap();
        f.store
            .add_reward(RewardRecord {
                id: "rw_1".to_string(),
                employee_id: "emp_001".to_string(),
                date: date(16),
                bonus_amount: Decimal::new(50, 0),
                reason: None,
                status: RewardStatus::Approved,
            })
            .unwrap();

        let days = f.service.get_session_summary("emp_001", 2026, 9).unwrap();
        assert_eq!(days.len(), 30);
        let day = |d: u32| &days[(d - 1) as usize];

        assert_eq!(day(13).status, DayStatus::Weekend);
        assert_eq!(day(14).status, DayStatus::Absent);
        assert_eq!(day(14).worked_minutes, 0);
        assert_eq!(day(15).status, DayStatus::HalfDayAm);
        assert_eq!(day(15).worked_minutes, 180);
        assert_eq!(day(16).status, DayStatus::Absent);
        assert!(days.iter().all(|d| d.leave_type.is_none()));
    }

    #[test]
    fn test_invalid_month_is_an_error() {
        let f = fixture(at(14, 8, 0));
        assert!(matches!(
            f.service.get_month_summary("emp_001", 2026, 13),
            Err(EngineError::InvalidPeriod { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_duration_is_rounded_minutes(seconds in 30i64..36_000) {
            let f = fixture(at(14, 7, 0));
            f.service
                .check_in("emp_001", SessionSlot::Morning, &Evidence::default())
                .unwrap();
            f.clock.advance(Duration::seconds(seconds));
            let response = f
                .service
                .check_out("emp_001", SessionSlot::Morning, &Evidence::default())
                .unwrap();

            let session = response.session.unwrap();
            let minutes = session.duration_minutes.unwrap();
            prop_assert_eq!(minutes, (seconds + 30) / 60);
            prop_assert!(minutes >= 0);
            prop_assert_eq!(session.status == SessionStatus::Full, minutes >= 135);
        }
    }
}
