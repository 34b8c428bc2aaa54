//! Configuration loading and management for the engine.
//!
//! This module provides functionality to load attendance and payroll policy
//! and the public holiday calendar from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use attendance_payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Standard day: {} h", loader.config().payroll.standard_daily_hours);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendancePolicy, DatedHoliday, EngineConfig, FixedHoliday, FixedHolidaysFile,
    PayrollPolicy, PolicyConfig, YearHolidaysFile,
};
