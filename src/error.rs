//! Error types for the attendance and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Attendance validation failures (already checked in, too soon, ...) are
//! *not* errors: they are returned as [`RejectionReason`](crate::models::RejectionReason)
//! values inside a successful response. The variants here cover configuration,
//! storage and lookup failures.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::SessionSlot;

/// The main error type for the engine.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::error::EngineError;
///
/// let error = EngineError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds inconsistent values.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A year/month pair does not name a real calendar month.
    #[error("Invalid period {year}-{month:02}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// The employee directory has no employment terms for this id.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The id that was looked up.
        employee_id: String,
    },

    /// A session insert collided with an existing record for the same key.
    #[error("Session already exists for '{employee_id}' on {date} ({slot})")]
    SyncConflict {
        /// The employee of the conflicting key.
        employee_id: String,
        /// The date of the conflicting key.
        date: NaiveDate,
        /// The slot of the conflicting key.
        slot: SessionSlot,
    },

    /// A conflict was reported but the record could not be re-read.
    #[error("Transient conflict for '{employee_id}' on {date} ({slot}), please retry")]
    TransientConflict {
        /// The employee of the conflicting key.
        employee_id: String,
        /// The date of the conflicting key.
        date: NaiveDate,
        /// The slot of the conflicting key.
        slot: SessionSlot,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl From<rusqlite::Error> for EngineError {
    fn from(error: rusqlite::Error) -> Self {
        EngineError::Storage {
            message: error.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
