//! Payroll orchestration.
//!
//! [`PayrollEngine`] gathers a month of attendance, leave and rewards for an
//! employee and runs the pure calculators in [`crate::calculation`] over them.

mod engine;

pub use engine::PayrollEngine;
