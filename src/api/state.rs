//! Application state for the attendance and payroll API.

use std::sync::Arc;

use crate::attendance::AttendanceService;
use crate::payroll::PayrollEngine;

/// Shared application state.
///
/// Both services are cheap to clone; handlers clone them into blocking tasks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Services>,
}

struct Services {
    attendance: AttendanceService,
    payroll: PayrollEngine,
}

impl AppState {
    /// Creates the state from the two services.
    pub fn new(attendance: AttendanceService, payroll: PayrollEngine) -> Self {
        Self {
            inner: Arc::new(Services {
                attendance,
                payroll,
            }),
        }
    }

    /// The attendance service.
    pub fn attendance(&self) -> &AttendanceService {
        &self.inner.attendance
    }

    /// The payroll engine.
    pub fn payroll(&self) -> &PayrollEngine {
        &self.inner.payroll
    }
}
