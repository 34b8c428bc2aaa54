//! Employment terms model and related types.
//!
//! This module defines the [`EmploymentTerms`] struct and [`ContractType`]
//! enum describing the contractual facts needed to compute pay.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the type of employment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    /// Permanent contract.
    #[serde(rename = "CDI")]
    Cdi,
    /// Fixed-term contract.
    #[serde(rename = "CDD")]
    Cdd,
    /// Internship.
    #[serde(rename = "Stage")]
    Stage,
    /// Freelance engagement.
    #[serde(rename = "Freelance")]
    Freelance,
}

impl ContractType {
    /// The text stored in the database for this contract type.
    pub fn as_db_str(self) -> &'static str {
        match self {
            ContractType::Cdi => "CDI",
            ContractType::Cdd => "CDD",
            ContractType::Stage => "Stage",
            ContractType::Freelance => "Freelance",
        }
    }

    /// Parses the database representation of a contract type.
    pub fn from_db_str(value: &str) -> Option<ContractType> {
        match value {
            "CDI" => Some(ContractType::Cdi),
            "CDD" => Some(ContractType::Cdd),
            "Stage" => Some(ContractType::Stage),
            "Freelance" => Some(ContractType::Freelance),
            _ => None,
        }
    }
}

/// The contractual facts needed to compute an employee's pay.
///
/// Loaded fresh for every calculation and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentTerms {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Optional override for the hourly rate. Derived from the daily rate when absent.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// The type of contract.
    pub contract_type: ContractType,
    /// Annual leave entitlement in days.
    pub annual_leave_allowance: Decimal,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
}

/// Role of a directory entry. Admin accounts are excluded from payroll runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    /// A regular employee.
    Employee,
    /// An administrator account.
    Admin,
}

impl EmployeeRole {
    /// The text stored in the database for this role.
    pub fn as_db_str(self) -> &'static str {
        match self {
            EmployeeRole::Employee => "employee",
            EmployeeRole::Admin => "admin",
        }
    }

    /// Parses the database representation of a role.
    pub fn from_db_str(value: &str) -> Option<EmployeeRole> {
        match value {
            "employee" => Some(EmployeeRole::Employee),
            "admin" => Some(EmployeeRole::Admin),
            _ => None,
        }
    }
}
