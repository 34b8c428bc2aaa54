//! Attendance session tracking.
//!
//! [`AttendanceService`] runs the check-in/check-out state machine on top of
//! an [`AttendanceStore`](crate::store::AttendanceStore) and derives today's
//! status and month summaries. Time comes from a [`Clock`] so that tests and
//! simulations can control it.

mod clock;
mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use service::AttendanceService;
