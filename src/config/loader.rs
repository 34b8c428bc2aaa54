//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::HolidayCalendar;
use crate::error::{EngineError, EngineResult};

use super::types::{
    DatedHoliday, EngineConfig, FixedHolidaysFile, PolicyConfig, YearHolidaysFile,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml          # Attendance and payroll policy
/// └── holidays/
///     ├── fixed.yaml       # Holidays on the same day every year
///     └── 2026.yaml        # Optional dated holidays for one year
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Full session: {} min", loader.config().attendance.full_session_minutes);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `policy.yaml` or `holidays/fixed.yaml` is missing
    /// - Any file contains invalid YAML
    /// - A value fails validation (see [`ConfigLoader::validate`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;

        let holidays_dir = path.join("holidays");
        let fixed = Self::load_yaml::<FixedHolidaysFile>(&holidays_dir.join("fixed.yaml"))?;
        let dated = Self::load_year_holidays(&holidays_dir)?;

        let config = EngineConfig::new(policy, HolidayCalendar::new(&fixed.holidays, &dated));
        Self::validate(&config)?;

        debug!(
            path = %path.display(),
            fixed_holidays = fixed.holidays.len(),
            dated_holidays = dated.len(),
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every `<year>.yaml` file in the holidays directory.
    fn load_year_holidays(holidays_dir: &Path) -> EngineResult<Vec<DatedHoliday>> {
        let dir_str = holidays_dir.display().to_string();

        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut dated = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            let is_year_file = path.extension().is_some_and(|ext| ext == "yaml")
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.parse::<i32>().is_ok());
            if !is_year_file {
                continue;
            }

            let file = Self::load_yaml::<YearHolidaysFile>(&path)?;
            if let Some(stray) = file.holidays.iter().find(|h| h.date.year() != file.year) {
                return Err(EngineError::InvalidConfig {
                    field: format!("{}: {}", path.display(), stray.name),
                    message: format!("date {} is outside year {}", stray.date, file.year),
                });
            }
            dated.extend(file.holidays);
        }

        Ok(dated)
    }

    /// Checks values that parse but cannot be used.
    pub fn validate(config: &EngineConfig) -> EngineResult<()> {
        let attendance = &config.attendance;
        if attendance.window_start_hour >= attendance.window_end_hour
            || attendance.window_end_hour > 24
        {
            return Err(EngineError::InvalidConfig {
                field: "attendance.window_start_hour/window_end_hour".to_string(),
                message: format!(
                    "window {}..{} must be a non-empty range within 0..24",
                    attendance.window_start_hour, attendance.window_end_hour
                ),
            });
        }

        let minutes = [
            ("attendance.min_action_delay_seconds", attendance.min_action_delay_seconds),
            ("attendance.full_session_minutes", attendance.full_session_minutes),
            ("attendance.min_session_minutes", attendance.min_session_minutes),
            ("attendance.morning_credit_minutes", attendance.morning_credit_minutes),
            ("attendance.afternoon_credit_minutes", attendance.afternoon_credit_minutes),
            ("attendance.reward_credit_minutes", attendance.reward_credit_minutes),
            ("attendance.expected_day_minutes", attendance.expected_day_minutes),
        ];
        if let Some((field, value)) = minutes.iter().find(|(_, value)| *value < 0) {
            return Err(EngineError::InvalidConfig {
                field: field.to_string(),
                message: format!("must not be negative, got {}", value),
            });
        }

        let payroll = &config.payroll;
        if payroll.standard_work_days == 0 {
            return Err(EngineError::InvalidConfig {
                field: "payroll.standard_work_days".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if payroll.standard_daily_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig {
                field: "payroll.standard_daily_hours".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
