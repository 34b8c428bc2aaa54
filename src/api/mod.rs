//! HTTP API for attendance tracking and payroll.
//!
//! Routes mirror the engine's operations one to one: check-in and check-out,
//! today's status, month summaries, anomalies, monthly salaries, the payroll
//! run and the salary estimate, plus a health check.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::AttendanceActionRequest;
pub use response::{ApiError, ApiErrorResponse, AttendanceRejection, HealthResponse};
pub use state::AppState;
