//! Response types for the attendance and payroll API.
//!
//! Engine errors become [`ApiError`] bodies with a matching HTTP status.
//! Refused attendance actions are not errors in the engine, but the API
//! still answers them with a non-2xx status and an [`AttendanceRejection`]
//! body so that clients can branch on the status alone.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{AttendanceSession, RejectionReason};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::InvalidConfig { field, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid configuration",
                    format!("{}: {}", field, message),
                ),
            ),
            EngineError::InvalidPeriod { year, month } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_PERIOD",
                    format!("Invalid period {}-{:02}", year, month),
                    "The month must be between 1 and 12",
                ),
            ),
            EngineError::EmployeeNotFound { employee_id } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new(
                    "EMPLOYEE_NOT_FOUND",
                    format!("Employee not found: {}", employee_id),
                ),
            ),
            error @ EngineError::SyncConflict { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("SYNC_CONFLICT", error.to_string()),
            ),
            error @ EngineError::TransientConflict { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "TRANSIENT_CONFLICT",
                    error.to_string(),
                    "The request can be retried",
                ),
            ),
            EngineError::Storage { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
            EngineError::CalculationError { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}

/// Body returned when an attendance action is refused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRejection {
    /// Always false.
    pub success: bool,
    /// Stable rejection code, e.g. `TOO_SOON`.
    pub code: String,
    /// Message suitable for direct display.
    pub message: String,
    /// Seconds to wait before retrying, for `TOO_SOON`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_seconds: Option<i64>,
    /// The existing session for the slot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<AttendanceSession>,
}

impl AttendanceRejection {
    /// Builds the body for a rejection.
    pub fn new(reason: RejectionReason, session: Option<AttendanceSession>) -> Self {
        let wait_seconds = match reason {
            RejectionReason::TooSoon { wait_seconds } => Some(wait_seconds),
            _ => None,
        };
        Self {
            success: false,
            code: reason.code().to_string(),
            message: reason.message(),
            wait_seconds,
            session,
        }
    }
}

/// HTTP status for a refused attendance action.
pub fn rejection_status(reason: &RejectionReason) -> StatusCode {
    match reason {
        RejectionReason::OutsideWorkingHours { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RejectionReason::TooSoon { .. } => StatusCode::TOO_MANY_REQUESTS,
        RejectionReason::AlreadyCheckedIn
        | RejectionReason::AlreadyCheckedOut
        | RejectionReason::NotCheckedIn => StatusCode::CONFLICT,
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}
