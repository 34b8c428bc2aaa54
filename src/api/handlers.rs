//! HTTP request handlers for the attendance and payroll API.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::AttendanceResponse;
use crate::store::AnomalyFilter;

use super::request::AttendanceActionRequest;
use super::response::{
    ApiError, ApiErrorResponse, AttendanceRejection, HealthResponse, rejection_status,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/attendance/check-in", post(check_in_handler))
        .route("/attendance/check-out", post(check_out_handler))
        .route("/attendance/today/:employee_id", get(today_handler))
        .route(
            "/attendance/month/:employee_id/:year/:month",
            get(month_summary_handler),
        )
        .route("/attendance/anomalies", get(anomalies_handler))
        .route("/payroll/all/:year/:month", get(all_salaries_handler))
        .route(
            "/payroll/estimate/:employee_id/:year/:month",
            get(estimate_handler),
        )
        .route("/payroll/:employee_id/:year/:month", get(salary_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Runs a storage-backed engine call off the async runtime.
async fn run_blocking<T, F>(correlation_id: Uuid, task: F) -> Result<T, ApiErrorResponse>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(correlation_id = %correlation_id, error = %err, "Request failed");
            Err(err.into())
        }
        Err(join_error) => {
            warn!(correlation_id = %correlation_id, error = %join_error, "Worker task failed");
            Err(ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "INTERNAL_ERROR",
                    "Request processing failed",
                    join_error.to_string(),
                ),
            ))
        }
    }
}

fn json_rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description, e.g. "missing field `slot`".
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error)
}

fn attendance_action_response(response: AttendanceResponse) -> Response {
    match response.rejection {
        Some(reason) => json_response(
            rejection_status(&reason),
            AttendanceRejection::new(reason, response.session),
        ),
        None => json_response(StatusCode::OK, response),
    }
}

/// Handler for GET /health.
async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

/// Handler for POST /attendance/check-in.
async fn check_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_error(correlation_id, rejection).into_response(),
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        slot = %request.slot,
        "Processing check-in"
    );

    let attendance = state.attendance().clone();
    let evidence = request.evidence();
    match run_blocking(correlation_id, move || {
        attendance.check_in(&request.employee_id, request.slot, &evidence)
    })
    .await
    {
        Ok(response) => attendance_action_response(response),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for POST /attendance/check-out.
async fn check_out_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_error(correlation_id, rejection).into_response(),
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        slot = %request.slot,
        "Processing check-out"
    );

    let attendance = state.attendance().clone();
    let evidence = request.evidence();
    match run_blocking(correlation_id, move || {
        attendance.check_out(&request.employee_id, request.slot, &evidence)
    })
    .await
    {
        Ok(response) => attendance_action_response(response),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /attendance/today/:employee_id.
async fn today_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, employee_id = %employee_id, "Fetching today's status");

    let attendance = state.attendance().clone();
    match run_blocking(correlation_id, move || attendance.get_today_status(&employee_id)).await {
        Ok(status) => json_response(StatusCode::OK, status),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /attendance/month/:employee_id/:year/:month.
async fn month_summary_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Fetching month summary"
    );

    let attendance = state.attendance().clone();
    match run_blocking(correlation_id, move || {
        attendance.get_month_summary(&employee_id, year, month)
    })
    .await
    {
        Ok(days) => json_response(StatusCode::OK, days),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /attendance/anomalies.
async fn anomalies_handler(
    State(state): State<AppState>,
    filter: Result<Query<AnomalyFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let filter = match filter {
        Ok(Query(filter)) => filter,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid anomaly query");
            return ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            )
            .into_response();
        }
    };
    info!(correlation_id = %correlation_id, filter = ?filter, "Fetching anomalies");

    let attendance = state.attendance().clone();
    match run_blocking(correlation_id, move || attendance.get_anomalies(&filter)).await {
        Ok(sessions) => json_response(StatusCode::OK, sessions),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /payroll/:employee_id/:year/:month.
async fn salary_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Processing salary calculation"
    );

    let payroll = state.payroll().clone();
    match run_blocking(correlation_id, move || {
        payroll.calculate_monthly_salary(&employee_id, year, month)
    })
    .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                net_salary = %result.breakdown.net_salary,
                "Salary calculation completed"
            );
            json_response(StatusCode::OK, result)
        }
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /payroll/all/:year/:month.
async fn all_salaries_handler(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, month, "Processing payroll run");

    let payroll = state.payroll().clone();
    match run_blocking(correlation_id, move || payroll.calculate_all_salaries(year, month)).await {
        Ok(results) => json_response(StatusCode::OK, results),
        Err(api_error) => api_error.into_response(),
    }
}

/// Handler for GET /payroll/estimate/:employee_id/:year/:month.
async fn estimate_handler(
    State(state): State<AppState>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Processing salary estimate"
    );

    let payroll = state.payroll().clone();
    match run_blocking(correlation_id, move || {
        payroll.estimate_salary(&employee_id, year, month)
    })
    .await
    {
        Ok(estimate) => json_response(StatusCode::OK, estimate),
        Err(api_error) => api_error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use crate::attendance::{AttendanceService, ManualClock};
    use crate::config::EngineConfig;
    use crate::payroll::PayrollEngine;
    use crate::store::InMemoryStore;

    fn create_test_state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let now = NaiveDate::from_ymd_opt(2026, 9, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let attendance = AttendanceService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(ManualClock::new(now)),
            Arc::new(EngineConfig::default()),
        );
        let payroll = PayrollEngine::new(attendance.clone(), store.clone(), store.clone(), store);
        AppState::new(attendance, payroll)
    }

    async fn post_check_in(router: Router, body: &'static str) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/attendance/check-in")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());

        let response = post_check_in(router, "{not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_slot_returns_validation_error() {
        let router = create_router(create_test_state());

        let response = post_check_in(router, r#"{"employee_id": "emp_001"}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(
            error.message.contains("missing field"),
            "Expected a missing field message, got: {}",
            error.message
        );
    }

    #[tokio::test]
    async fn test_missing_content_type_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/attendance/check-in")
                    .body(Body::from(r#"{"employee_id": "emp_001", "slot": "morning"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MISSING_CONTENT_TYPE");
    }

    #[tokio::test]
    async fn test_second_check_in_is_a_conflict() {
        let state = create_test_state();
        let body = r#"{"employee_id": "emp_001", "slot": "morning"}"#;

        let first = post_check_in(create_router(state.clone()), body).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = post_check_in(create_router(state), body).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
            .await
            .unwrap();
        let rejection: AttendanceRejection = serde_json::from_slice(&bytes).unwrap();
        assert!(!rejection.success);
        assert_eq!(rejection.code, "ALREADY_CHECKED_IN");
        assert!(rejection.session.is_some());
    }

    #[tokio::test]
    async fn test_bad_anomaly_query_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/attendance/anomalies?from=yesterday")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
