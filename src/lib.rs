//! Attendance and Payroll Engine
//!
//! This crate records twice-daily attendance sessions (morning and afternoon
//! check-in/check-out), reduces them to per-day statuses, and turns a month of
//! attendance, approved leave and approved rewards into an auditable salary
//! breakdown.
//!
//! The engine itself is synchronous and storage-agnostic: it talks to
//! [`store::AttendanceStore`] and the read-only directory, leave and reward
//! traits. [`store::SqliteStore`] and [`store::InMemoryStore`] implement all
//! of them, and [`api`] exposes the operations over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod store;
