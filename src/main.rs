//! HTTP server for the attendance and payroll engine.
//!
//! Environment:
//! - `PAYROLL_CONFIG_DIR`: policy and holiday directory (default `./config/default`)
//! - `PAYROLL_DB_PATH`: SQLite database file (default `./payroll.db`)
//! - `PAYROLL_BIND`: listen address (default `0.0.0.0:3000`)
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::sync::Arc;

use attendance_payroll_engine::api::{AppState, create_router};
use attendance_payroll_engine::attendance::{AttendanceService, SystemClock};
use attendance_payroll_engine::config::ConfigLoader;
use attendance_payroll_engine::payroll::PayrollEngine;
use attendance_payroll_engine::store::SqliteStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_DB_PATH: &str = "./payroll.db";
const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let db_path = env::var("PAYROLL_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into());
    let bind = env::var("PAYROLL_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());

    let config = Arc::new(ConfigLoader::load(&config_dir)?.into_config());
    info!(config_dir = %config_dir, "Configuration loaded");

    let store = Arc::new(SqliteStore::open(&db_path)?);
    info!(db_path = %db_path, "Database opened");

    let attendance = AttendanceService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(SystemClock),
        config,
    );
    let payroll = PayrollEngine::new(attendance.clone(), store.clone(), store.clone(), store);
    let app = create_router(AppState::new(attendance, payroll));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(bind = %bind, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
