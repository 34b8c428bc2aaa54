//! Request types for the attendance and payroll API.

use serde::{Deserialize, Serialize};

use crate::models::{Evidence, SessionSlot};

/// Request body for `POST /attendance/check-in` and `POST /attendance/check-out`.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::api::AttendanceActionRequest;
///
/// let request: AttendanceActionRequest =
///     serde_json::from_str(r#"{"employee_id": "emp_001", "slot": "morning"}"#).unwrap();
/// assert_eq!(request.employee_id, "emp_001");
/// assert!(request.photo_ref.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceActionRequest {
    /// The employee performing the action.
    pub employee_id: String,
    /// The slot being checked into or out of.
    pub slot: SessionSlot,
    /// Reference to a photo taken by the client.
    #[serde(default)]
    pub photo_ref: Option<String>,
    /// Client IP address as seen by the client or a proxy.
    #[serde(default)]
    pub source_ip: Option<String>,
    /// Client device fingerprint.
    #[serde(default)]
    pub device_fingerprint: Option<String>,
}

impl AttendanceActionRequest {
    /// The evidence fields of the request.
    pub fn evidence(&self) -> Evidence {
        Evidence {
            photo_ref: self.photo_ref.clone(),
            source_ip: self.source_ip.clone(),
            device_fingerprint: self.device_fingerprint.clone(),
        }
    }
}
