//! Performance benchmarks for the attendance and payroll engine.
//!
//! Targets:
//! - Salary calculation from precomputed totals: < 20μs mean
//! - Month summary for one employee: < 1ms mean
//! - Monthly salary over HTTP: < 2ms mean
//! - Payroll run for 100 employees: < 100ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::str::FromStr;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use attendance_payroll_engine::api::{AppState, create_router};
use attendance_payroll_engine::attendance::{AttendanceService, ManualClock};
use attendance_payroll_engine::calculation::{
    SalaryInputs, calculate_attendance_totals, calculate_salary,
};
use attendance_payroll_engine::config::{ConfigLoader, EngineConfig};
use attendance_payroll_engine::models::{
    ContractType, EmploymentTerms, Evidence, LeaveSummary, RewardSummary, SessionSlot,
};
use attendance_payroll_engine::payroll::PayrollEngine;
use attendance_payroll_engine::store::InMemoryStore;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

struct Bench {
    attendance: AttendanceService,
    payroll: PayrollEngine,
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn terms(employee_id: &str) -> EmploymentTerms {
    EmploymentTerms {
        employee_id: employee_id.to_string(),
        base_salary: Decimal::from_str("1100").unwrap(),
        hourly_rate: None,
        contract_type: ContractType::Cdi,
        annual_leave_allowance: Decimal::from_str("18").unwrap(),
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

/// Builds a store with `employees` employees, each of whom worked every
/// September 2026 work day except every seventh day of the month.
fn create_bench(employees: usize) -> Bench {
    let config: Arc<EngineConfig> = Arc::new(
        ConfigLoader::load("./config/default")
            .expect("Failed to load config")
            .into_config(),
    );
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(at(1, 7)));
    let attendance = AttendanceService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
        config.clone(),
    );
    let payroll = PayrollEngine::new(attendance.clone(), store.clone(), store.clone(), store.clone());

    let evidence = Evidence::default();
    let employee_ids: Vec<String> = (0..employees).map(|i| format!("emp_{:04}", i)).collect();
    for employee_id in &employee_ids {
        store.add_employee(terms(employee_id)).unwrap();
    }

    for day in (1..=30).filter(|d| d % 7 != 0) {
        if !config.holidays.is_work_day(at(day, 0).date()) {
            continue;
        }
        for (hour, slot, is_check_in) in [
            (8, SessionSlot::Morning, true),
            (11, SessionSlot::Morning, false),
            (13, SessionSlot::Afternoon, true),
            (17, SessionSlot::Afternoon, false),
        ] {
            clock.set(at(day, hour));
            for employee_id in &employee_ids {
                if is_check_in {
                    attendance.check_in(employee_id, slot, &evidence).unwrap();
                } else {
                    attendance.check_out(employee_id, slot, &evidence).unwrap();
                }
            }
        }
    }

    Bench {
        attendance,
        payroll,
    }
}

/// Benchmark: Salary arithmetic with the audit trail, no storage.
///
/// Target: < 20μs mean
fn bench_salary_calculation(c: &mut Criterion) {
    let bench = create_bench(1);
    let config = bench.attendance.config().clone();
    let days = bench
        .attendance
        .get_month_summary("emp_0000", 2026, 9)
        .unwrap();
    let attendance = calculate_attendance_totals(&days, None);
    let terms = terms("emp_0000");
    let leave = LeaveSummary::default();
    let rewards = RewardSummary::default();

    c.bench_function("salary_calculation", |b| {
        b.iter(|| {
            black_box(calculate_salary(
                SalaryInputs {
                    terms: &terms,
                    attendance: &attendance,
                    leave: &leave,
                    rewards: &rewards,
                    work_days: 22,
                },
                &config.payroll,
            ))
        })
    });
}

/// Benchmark: Month summary for one employee.
///
/// Target: < 1ms mean
fn bench_month_summary(c: &mut Criterion) {
    let bench = create_bench(1);

    c.bench_function("month_summary", |b| {
        b.iter(|| {
            black_box(
                bench
                    .attendance
                    .get_month_summary("emp_0000", 2026, 9)
                    .unwrap(),
            )
        })
    });
}

/// Benchmark: Monthly salary through the HTTP router.
///
/// Target: < 2ms mean
fn bench_monthly_salary_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let bench = create_bench(1);
    let router = create_router(AppState::new(bench.attendance, bench.payroll));

    c.bench_function("monthly_salary_http", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .uri("/payroll/emp_0000/2026/9")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Payroll runs of growing size.
///
/// Target: < 100ms mean for 100 employees
fn bench_payroll_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("payroll_run");
    group.sample_size(20);

    for employees in [10usize, 50, 100] {
        let bench = create_bench(employees);
        group.throughput(Throughput::Elements(employees as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", employees),
            &employees,
            |b, _| b.iter(|| black_box(bench.payroll.calculate_all_salaries(2026, 9).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_salary_calculation,
    bench_month_summary,
    bench_monthly_salary_http,
    bench_payroll_run,
);
criterion_main!(benches);
