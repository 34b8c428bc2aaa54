//! SQLite implementation of every storage trait.
//!
//! Dates are stored as `YYYY-MM-DD` text, timestamps as ISO text with
//! microseconds (so that text ordering is time ordering) and money as decimal
//! text. Session uniqueness is a `UNIQUE(employee_id, date, slot)` constraint;
//! a violated constraint on insert is reported as `SyncConflict`.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceSession, ContractType, EmployeeRole, EmploymentTerms, LeaveRecord, LeaveStatus,
    LeaveType, RewardRecord, RewardStatus, SessionKey, SessionSlot, SessionStatus,
};

use super::{
    AnomalyFilter, AttendanceStore, DirectoryEntry, EmployeeDirectory, LeaveSource, RewardSource,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const DATETIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS attendance_sessions (
    id                 TEXT PRIMARY KEY,
    employee_id        TEXT NOT NULL,
    date               TEXT NOT NULL,
    slot               TEXT NOT NULL,
    check_in           TEXT,
    check_out          TEXT,
    duration_minutes   INTEGER,
    status             TEXT NOT NULL,
    anomaly_detected   INTEGER NOT NULL DEFAULT 0,
    anomaly_reason     TEXT,
    check_in_photo     TEXT,
    check_out_photo    TEXT,
    source_ip          TEXT,
    device_fingerprint TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    UNIQUE(employee_id, date, slot)
);
CREATE INDEX IF NOT EXISTS idx_sessions_employee_date
    ON attendance_sessions(employee_id, date);

CREATE TABLE IF NOT EXISTS employees (
    employee_id            TEXT PRIMARY KEY,
    base_salary            TEXT NOT NULL,
    hourly_rate            TEXT,
    contract_type          TEXT NOT NULL,
    annual_leave_allowance TEXT NOT NULL,
    hire_date              TEXT NOT NULL,
    role                   TEXT NOT NULL DEFAULT 'employee',
    active                 INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS leave_records (
    id               TEXT PRIMARY KEY,
    employee_id      TEXT NOT NULL,
    leave_type       TEXT NOT NULL,
    start_date       TEXT NOT NULL,
    end_date         TEXT NOT NULL,
    half_day_slot    TEXT,
    status           TEXT NOT NULL,
    impact_on_salary INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS reward_records (
    id           TEXT PRIMARY KEY,
    employee_id  TEXT NOT NULL,
    date         TEXT NOT NULL,
    bonus_amount TEXT NOT NULL,
    reason       TEXT,
    status       TEXT NOT NULL
);
";

const SESSION_COLUMNS: &str = "id, employee_id, date, slot, check_in, check_out, duration_minutes, \
     status, anomaly_detected, anomaly_reason, check_in_photo, check_out_photo, source_ip, \
     device_fingerprint, created_at, updated_at";

/// Store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening SQLite database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> EngineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> EngineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EngineError::Storage {
            message: "SQLite connection lock poisoned".to_string(),
        })
    }

    /// Adds or replaces a directory entry.
    pub fn upsert_employee(&self, entry: &DirectoryEntry) -> EngineResult<()> {
        let terms = &entry.terms;
        self.conn()?.execute(
            "INSERT OR REPLACE INTO employees
             (employee_id, base_salary, hourly_rate, contract_type, annual_leave_allowance,
              hire_date, role, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                terms.employee_id,
                terms.base_salary.to_string(),
                terms.hourly_rate.map(|r| r.to_string()),
                terms.contract_type.as_db_str(),
                terms.annual_leave_allowance.to_string(),
                terms.hire_date.format(DATE_FORMAT).to_string(),
                entry.role.as_db_str(),
                entry.active,
            ],
        )?;
        Ok(())
    }

    /// Adds or replaces a leave record.
    pub fn upsert_leave(&self, leave: &LeaveRecord) -> EngineResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO leave_records
             (id, employee_id, leave_type, start_date, end_date, half_day_slot, status,
              impact_on_salary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                leave.id,
                leave.employee_id,
                leave.leave_type.as_db_str(),
                leave.start_date.format(DATE_FORMAT).to_string(),
                leave.end_date.format(DATE_FORMAT).to_string(),
                leave.half_day_slot.map(SessionSlot::as_db_str),
                leave.status.as_db_str(),
                leave.impact_on_salary,
            ],
        )?;
        Ok(())
    }

    /// Adds or replaces a reward record.
    pub fn upsert_reward(&self, reward: &RewardRecord) -> EngineResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO reward_records
             (id, employee_id, date, bonus_amount, reason, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reward.id,
                reward.employee_id,
                reward.date.format(DATE_FORMAT).to_string(),
                reward.bonus_amount.to_string(),
                reward.reason,
                reward.status.as_db_str(),
            ],
        )?;
        Ok(())
    }
}

fn conversion_error(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(EngineError::Storage {
            message: format!("invalid value '{}' in column '{}'", value, column),
        }),
    )
}

fn get_date(row: &Row, column: &str) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(column)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| conversion_error(column, &text))
}

fn get_datetime(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| {
        NaiveDateTime::parse_from_str(&t, DATETIME_PARSE_FORMAT).map_err(|_| conversion_error(column, &t))
    })
    .transpose()
}

fn get_required_datetime(row: &Row, column: &str) -> rusqlite::Result<NaiveDateTime> {
    get_datetime(row, column)?.ok_or_else(|| conversion_error(column, "NULL"))
}

fn get_decimal(row: &Row, column: &str) -> rusqlite::Result<Option<Decimal>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| Decimal::from_str(&t).map_err(|_| conversion_error(column, &t)))
        .transpose()
}

fn get_required_decimal(row: &Row, column: &str) -> rusqlite::Result<Decimal> {
    get_decimal(row, column)?.ok_or_else(|| conversion_error(column, "NULL"))
}

fn get_enum<T>(row: &Row, column: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    parse(&text).ok_or_else(|| conversion_error(column, &text))
}

fn format_datetime(value: Option<NaiveDateTime>) -> Option<String> {
    value.map(|v| v.format(DATETIME_FORMAT).to_string())
}

fn map_session(row: &Row) -> rusqlite::Result<AttendanceSession> {
    let id: String = row.get("id")?;
    Ok(AttendanceSession {
        id: Uuid::parse_str(&id).map_err(|_| conversion_error("id", &id))?,
        employee_id: row.get("employee_id")?,
        date: get_date(row, "date")?,
        slot: get_enum(row, "slot", SessionSlot::from_db_str)?,
        check_in: get_datetime(row, "check_in")?,
        check_out: get_datetime(row, "check_out")?,
        duration_minutes: row.get("duration_minutes")?,
        status: get_enum(row, "status", SessionStatus::from_db_str)?,
        anomaly_detected: row.get("anomaly_detected")?,
        anomaly_reason: row.get("anomaly_reason")?,
        check_in_photo: row.get("check_in_photo")?,
        check_out_photo: row.get("check_out_photo")?,
        source_ip: row.get("source_ip")?,
        device_fingerprint: row.get("device_fingerprint")?,
        created_at: get_required_datetime(row, "created_at")?,
        updated_at: get_required_datetime(row, "updated_at")?,
    })
}

fn map_terms(row: &Row) -> rusqlite::Result<EmploymentTerms> {
    Ok(EmploymentTerms {
        employee_id: row.get("employee_id")?,
        base_salary: get_required_decimal(row, "base_salary")?,
        hourly_rate: get_decimal(row, "hourly_rate")?,
        contract_type: get_enum(row, "contract_type", ContractType::from_db_str)?,
        annual_leave_allowance: get_required_decimal(row, "annual_leave_allowance")?,
        hire_date: get_date(row, "hire_date")?,
    })
}

fn map_leave(row: &Row) -> rusqlite::Result<LeaveRecord> {
    let half_day_slot: Option<String> = row.get("half_day_slot")?;
    Ok(LeaveRecord {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        leave_type: get_enum(row, "leave_type", LeaveType::from_db_str)?,
        start_date: get_date(row, "start_date")?,
        end_date: get_date(row, "end_date")?,
        half_day_slot: half_day_slot
            .map(|s| SessionSlot::from_db_str(&s).ok_or_else(|| conversion_error("half_day_slot", &s)))
            .transpose()?,
        status: get_enum(row, "status", LeaveStatus::from_db_str)?,
        impact_on_salary: row.get("impact_on_salary")?,
    })
}

fn map_reward(row: &Row) -> rusqlite::Result<RewardRecord> {
    Ok(RewardRecord {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        date: get_date(row, "date")?,
        bonus_amount: get_required_decimal(row, "bonus_amount")?,
        reason: row.get("reason")?,
        status: get_enum(row, "status", RewardStatus::from_db_str)?,
    })
}

impl AttendanceStore for SqliteStore {
    fn find_session(&self, key: &SessionKey) -> EngineResult<Option<AttendanceSession>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                &format!(
                    "SELECT {} FROM attendance_sessions
                     WHERE employee_id = ?1 AND date = ?2 AND slot = ?3",
                    SESSION_COLUMNS
                ),
                params![
                    key.employee_id,
                    key.date.format(DATE_FORMAT).to_string(),
                    key.slot.as_db_str()
                ],
                map_session,
            )
            .optional()?;
        Ok(session)
    }

    fn insert_session(&self, session: &AttendanceSession) -> EngineResult<()> {
        let conn = self.conn()?;
        let result = conn.execute(
            &format!(
                "INSERT INTO attendance_sessions ({})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                SESSION_COLUMNS
            ),
            params![
                session.id.to_string(),
                session.employee_id,
                session.date.format(DATE_FORMAT).to_string(),
                session.slot.as_db_str(),
                format_datetime(session.check_in),
                format_datetime(session.check_out),
                session.duration_minutes,
                session.status.as_db_str(),
                session.anomaly_detected,
                session.anomaly_reason,
                session.check_in_photo,
                session.check_out_photo,
                session.source_ip,
                session.device_fingerprint,
                session.created_at.format(DATETIME_FORMAT).to_string(),
                session.updated_at.format(DATETIME_FORMAT).to_string(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            // Only the (employee, date, slot) key means another writer got there first.
            Err(rusqlite::Error::SqliteFailure(error, _))
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(EngineError::SyncConflict {
                    employee_id: session.employee_id.clone(),
                    date: session.date,
                    slot: session.slot,
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    fn update_session(&self, session: &AttendanceSession) -> EngineResult<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE attendance_sessions SET
                 check_in = ?2, check_out = ?3, duration_minutes = ?4, status = ?5,
                 anomaly_detected = ?6, anomaly_reason = ?7, check_in_photo = ?8,
                 check_out_photo = ?9, source_ip = ?10, device_fingerprint = ?11,
                 updated_at = ?12
             WHERE id = ?1",
            params![
                session.id.to_string(),
                format_datetime(session.check_in),
                format_datetime(session.check_out),
                session.duration_minutes,
                session.status.as_db_str(),
                session.anomaly_detected,
                session.anomaly_reason,
                session.check_in_photo,
                session.check_out_photo,
                session.source_ip,
                session.device_fingerprint,
                session.updated_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(EngineError::Storage {
                message: format!("session {} not found", session.id),
            });
        }
        Ok(())
    }

    fn sessions_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM attendance_sessions
             WHERE employee_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
            SESSION_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                employee_id,
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            map_session,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn last_action_at(&self, employee_id: &str) -> EngineResult<Option<NaiveDateTime>> {
        let conn = self.conn()?;
        let latest: Option<String> = conn.query_row(
            "SELECT MAX(updated_at) FROM attendance_sessions WHERE employee_id = ?1",
            params![employee_id],
            |row| row.get(0),
        )?;

        latest
            .map(|text| {
                NaiveDateTime::parse_from_str(&text, DATETIME_PARSE_FORMAT).map_err(|_| {
                    EngineError::Storage {
                        message: format!("invalid timestamp '{}' in column 'updated_at'", text),
                    }
                })
            })
            .transpose()
    }

    fn anomalies(&self, filter: &AnomalyFilter) -> EngineResult<Vec<AttendanceSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM attendance_sessions
             WHERE anomaly_detected = 1
               AND (?1 IS NULL OR employee_id = ?1)
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date ASC,
                      CASE slot WHEN 'morning' THEN 0 ELSE 1 END ASC,
                      employee_id ASC",
            SESSION_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                filter.employee_id,
                filter.from.map(|d| d.format(DATE_FORMAT).to_string()),
                filter.to.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
            map_session,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl EmployeeDirectory for SqliteStore {
    fn employment_terms(&self, employee_id: &str) -> EngineResult<Option<EmploymentTerms>> {
        let conn = self.conn()?;
        let terms = conn
            .query_row(
                "SELECT * FROM employees WHERE employee_id = ?1",
                params![employee_id],
                map_terms,
            )
            .optional()?;
        Ok(terms)
    }

    fn payroll_employee_ids(&self) -> EngineResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT employee_id FROM employees
             WHERE active = 1 AND role = ?1
             ORDER BY employee_id ASC",
        )?;

        let rows = stmt.query_map(params![EmployeeRole::Employee.as_db_str()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl LeaveSource for SqliteStore {
    fn approved_leaves(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<LeaveRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM leave_records
             WHERE employee_id = ?1 AND status = ?2 AND start_date <= ?4 AND end_date >= ?3
             ORDER BY start_date ASC",
        )?;

        let rows = stmt.query_map(
            params![
                employee_id,
                LeaveStatus::Valide.as_db_str(),
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            map_leave,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl RewardSource for SqliteStore {
    fn approved_rewards(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<RewardRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM reward_records
             WHERE employee_id = ?1 AND status = ?2 AND date >= ?3 AND date <= ?4
             ORDER BY date ASC",
        )?;

        let rows = stmt.query_map(
            params![
                employee_id,
                RewardStatus::Approved.as_db_str(),
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            map_reward,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
