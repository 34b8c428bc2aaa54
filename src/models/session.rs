//! Attendance session model and related types.
//!
//! An [`AttendanceSession`] is the check-in/check-out record for one
//! employee, one date and one [`SessionSlot`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the two fixed daily work periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSlot {
    /// The morning period (3 hours by default).
    Morning,
    /// The afternoon period (4 hours by default).
    Afternoon,
}

impl SessionSlot {
    /// Both slots in day order.
    pub const ALL: [SessionSlot; 2] = [SessionSlot::Morning, SessionSlot::Afternoon];

    /// The other slot of the same day.
    pub fn other(self) -> SessionSlot {
        match self {
            SessionSlot::Morning => SessionSlot::Afternoon,
            SessionSlot::Afternoon => SessionSlot::Morning,
        }
    }

    /// The text stored in the database for this slot.
    pub fn as_db_str(self) -> &'static str {
        match self {
            SessionSlot::Morning => "morning",
            SessionSlot::Afternoon => "afternoon",
        }
    }

    /// Parses the database representation of a slot.
    pub fn from_db_str(value: &str) -> Option<SessionSlot> {
        match value {
            "morning" => Some(SessionSlot::Morning),
            "afternoon" => Some(SessionSlot::Afternoon),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Status of a single session record.
///
/// Absence is implicit: a slot with no record is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Checked in, or checked out before the full-session threshold.
    Partial,
    /// Checked out at or beyond the full-session threshold.
    Full,
    /// The slot is covered by an approved reward day.
    Reward,
    /// The slot is covered by a half-day leave.
    LeaveHalf,
    /// The slot is covered by a full-day leave.
    LeaveFull,
}

impl SessionStatus {
    /// Returns true if the status counts as time actually worked.
    pub fn is_worked(self) -> bool {
        matches!(self, SessionStatus::Partial | SessionStatus::Full)
    }

    /// The text stored in the database for this status.
    pub fn as_db_str(self) -> &'static str {
        match self {
            SessionStatus::Partial => "partial",
            SessionStatus::Full => "full",
            SessionStatus::Reward => "reward",
            SessionStatus::LeaveHalf => "leave_half",
            SessionStatus::LeaveFull => "leave_full",
        }
    }

    /// Parses the database representation of a status.
    pub fn from_db_str(value: &str) -> Option<SessionStatus> {
        match value {
            "partial" => Some(SessionStatus::Partial),
            "full" => Some(SessionStatus::Full),
            "reward" => Some(SessionStatus::Reward),
            "leave_half" => Some(SessionStatus::LeaveHalf),
            "leave_full" => Some(SessionStatus::LeaveFull),
            _ => None,
        }
    }
}

/// Natural key of a session: at most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    /// The employee the session belongs to.
    pub employee_id: String,
    /// The calendar date of the session.
    pub date: NaiveDate,
    /// The slot of the session.
    pub slot: SessionSlot,
}

impl SessionKey {
    /// Creates a key from its parts.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, slot: SessionSlot) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            slot,
        }
    }
}

/// Opaque identity evidence attached to an attendance action.
///
/// The engine stores these values but never inspects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Reference to a stored photo.
    #[serde(default)]
    pub photo_ref: Option<String>,
    /// The client IP address.
    #[serde(default)]
    pub source_ip: Option<String>,
    /// A client device fingerprint.
    #[serde(default)]
    pub device_fingerprint: Option<String>,
}

/// The check-in/check-out record for one employee, date and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSession {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// The employee the session belongs to.
    pub employee_id: String,
    /// The calendar date of the session.
    pub date: NaiveDate,
    /// The slot of the session.
    pub slot: SessionSlot,
    /// When the employee checked in.
    pub check_in: Option<NaiveDateTime>,
    /// When the employee checked out. Only set after `check_in`.
    pub check_out: Option<NaiveDateTime>,
    /// Minutes between check-in and check-out, once both are set.
    pub duration_minutes: Option<i64>,
    /// The session status.
    pub status: SessionStatus,
    /// Whether an irregularity was flagged for review.
    pub anomaly_detected: bool,
    /// Human-readable description of the flagged irregularities.
    pub anomaly_reason: Option<String>,
    /// Photo reference captured at check-in.
    pub check_in_photo: Option<String>,
    /// Photo reference captured at check-out.
    pub check_out_photo: Option<String>,
    /// IP address of the latest action.
    pub source_ip: Option<String>,
    /// Device fingerprint of the latest action.
    pub device_fingerprint: Option<String>,
    /// When the record was created.
    pub created_at: NaiveDateTime,
    /// When the record was last changed by an attendance action.
    pub updated_at: NaiveDateTime,
}

impl AttendanceSession {
    /// Creates an empty record for a key, with no check-in yet.
    pub fn new(key: &SessionKey, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: key.employee_id.clone(),
            date: key.date,
            slot: key.slot,
            check_in: None,
            check_out: None,
            duration_minutes: None,
            status: SessionStatus::Partial,
            anomaly_detected: false,
            anomaly_reason: None,
            check_in_photo: None,
            check_out_photo: None,
            source_ip: None,
            device_fingerprint: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The natural key of this record.
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.employee_id.clone(), self.date, self.slot)
    }

    /// Returns true once both check-in and check-out are recorded.
    pub fn is_completed(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_some()
    }

    /// Minutes credited by this session (zero until checked out).
    pub fn worked_minutes(&self) -> i64 {
        self.duration_minutes.unwrap_or(0)
    }

    /// Appends an anomaly reason, keeping any earlier ones.
    pub fn flag_anomaly(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        self.anomaly_detected = true;
        self.anomaly_reason = Some(match self.anomaly_reason.take() {
            Some(existing) => format!("{}; {}", existing, reason),
            None => reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn key() -> SessionKey {
        SessionKey::new(
            "emp_001",
            NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            SessionSlot::Morning,
        )
    }

    #[test]
    fn test_new_session_has_no_check_in() {
        let session = AttendanceSession::new(&key(), at(9, 0));
        assert!(session.check_in.is_none());
        assert!(session.check_out.is_none());
        assert!(!session.is_completed());
        assert_eq!(session.worked_minutes(), 0);
        assert_eq!(session.key(), key());
    }

    #[test]
    fn test_flag_anomaly_appends_reasons() {
        let mut session = AttendanceSession::new(&key(), at(9, 0));
        session.flag_anomaly("check-in on a non-working day (weekend)");
        session.flag_anomaly("short session: 10 min (minimum 15 min)");

        assert!(session.anomaly_detected);
        assert_eq!(
            session.anomaly_reason.as_deref(),
            Some("check-in on a non-working day (weekend); short session: 10 min (minimum 15 min)")
        );
    }

    #[test]
    fn test_slot_other_and_db_round_trip() {
        assert_eq!(SessionSlot::Morning.other(), SessionSlot::Afternoon);
        assert_eq!(SessionSlot::Afternoon.other(), SessionSlot::Morning);
        for slot in SessionSlot::ALL {
            assert_eq!(SessionSlot::from_db_str(slot.as_db_str()), Some(slot));
        }
        assert_eq!(SessionSlot::from_db_str("evening"), None);
    }

    #[test]
    fn test_worked_statuses() {
        assert!(SessionStatus::Full.is_worked());
        assert!(SessionStatus::Partial.is_worked());
        assert!(!SessionStatus::Reward.is_worked());
        assert!(!SessionStatus::LeaveHalf.is_worked());
        assert!(!SessionStatus::LeaveFull.is_worked());
    }

    #[test]
    fn test_slot_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionSlot::Morning).unwrap(),
            "\"morning\""
        );
        let slot: SessionSlot = serde_json::from_str("\"afternoon\"").unwrap();
        assert_eq!(slot, SessionSlot::Afternoon);
    }

    #[test]
    fn test_evidence_fields_default_to_none() {
        let evidence: Evidence = serde_json::from_str("{}").unwrap();
        assert_eq!(evidence, Evidence::default());
    }
}
