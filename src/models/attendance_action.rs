//! Outcomes of check-in and check-out actions.
//!
//! Validation failures are expected outcomes, so they are carried as a
//! [`RejectionReason`] inside an [`AttendanceResponse`] rather than as errors.

use serde::{Deserialize, Serialize};

use super::AttendanceSession;

/// Why an attendance action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The current hour is outside the allowed window.
    OutsideWorkingHours {
        /// First allowed hour (inclusive).
        start_hour: u32,
        /// Last allowed hour (exclusive).
        end_hour: u32,
    },
    /// The previous action was too recent.
    TooSoon {
        /// Seconds left before another action is accepted.
        wait_seconds: i64,
    },
    /// The slot already has a check-in.
    AlreadyCheckedIn,
    /// The slot already has a check-out.
    AlreadyCheckedOut,
    /// The slot has no check-in to close.
    NotCheckedIn,
}

impl RejectionReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::OutsideWorkingHours { .. } => "OUTSIDE_WORKING_HOURS",
            RejectionReason::TooSoon { .. } => "TOO_SOON",
            RejectionReason::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            RejectionReason::AlreadyCheckedOut => "ALREADY_CHECKED_OUT",
            RejectionReason::NotCheckedIn => "NOT_CHECKED_IN",
        }
    }

    /// Message suitable for direct display.
    pub fn message(&self) -> String {
        match self {
            RejectionReason::OutsideWorkingHours {
                start_hour,
                end_hour,
            } => format!(
                "Attendance can only be recorded between {:02}:00 and {:02}:00",
                start_hour, end_hour
            ),
            RejectionReason::TooSoon { wait_seconds } => format!(
                "Please wait {} more second(s) before the next attendance action",
                wait_seconds
            ),
            RejectionReason::AlreadyCheckedIn => {
                "You have already checked in for this session".to_string()
            }
            RejectionReason::AlreadyCheckedOut => {
                "You have already checked out for this session".to_string()
            }
            RejectionReason::NotCheckedIn => {
                "You must check in before checking out".to_string()
            }
        }
    }
}

/// Result of a check-in or check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    /// Whether the action was recorded.
    pub success: bool,
    /// The session after the action (or the existing one on rejection).
    pub session: Option<AttendanceSession>,
    /// Message suitable for direct display.
    pub message: String,
    /// Anomaly note attached to a successful action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<String>,
    /// Why the action was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionReason>,
}

impl AttendanceResponse {
    /// Builds a successful response.
    pub fn accepted(session: AttendanceSession, message: impl Into<String>) -> Self {
        let anomaly = session.anomaly_reason.clone();
        Self {
            success: true,
            session: Some(session),
            message: message.into(),
            anomaly,
            rejection: None,
        }
    }

    /// Builds a rejected response.
    pub fn rejected(reason: RejectionReason, session: Option<AttendanceSession>) -> Self {
        Self {
            success: false,
            session,
            message: reason.message(),
            anomaly: None,
            rejection: Some(reason),
        }
    }
}
