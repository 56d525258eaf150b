//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler identifies the tenant from the `X-Tenant-Id` header, tags the
//! request with a correlation id and maps engine errors onto JSON error
//! bodies.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    CarryForwardSummary, DeleteSummary, LeaveApplication, LeaveBalance, LeaveEntitlementResponse,
    LeaveRequest,
    LeaveStatus, LoanApplication, LoanRequest, MigrationReport, MonthlyLeaveSummary,
    PayrollRunRecord, PayrollRunRequest, Payslip, PayslipGenerationSummary, RatingResult, TenantId,
};

use super::request::{
    ApproveLoanRequest, CarryForwardRequest, EntitlementQuery, GeneratePayslipsRequest,
    LeaveActionRequest, MonthQuery, PeriodQuery, RejectLoanRequest, RepaymentRequest, Tenant,
};
use super::response::{ApiError, ApiErrorResponse, RepaymentResponse};
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiErrorResponse>;
type CreatedResult<T> = Result<(StatusCode, Json<T>), ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/run", post(run_payroll_handler))
        .route("/payroll/runs", get(list_payroll_runs_handler))
        .route("/payslips/generate", post(generate_payslips_handler))
        .route(
            "/payslips",
            get(list_payslips_handler).delete(delete_all_payslips_handler),
        )
        .route("/payslips/:id", delete(delete_payslip_handler))
        .route("/payslips/:id/regenerate", post(regenerate_payslip_handler))
        .route(
            "/leave/entitlement/:employee_id",
            get(leave_entitlement_handler),
        )
        .route(
            "/leave/balances/:employee_id/refresh",
            post(refresh_leave_balance_handler),
        )
        .route("/leave/approved", get(approved_leaves_handler))
        .route("/leave/requests", post(create_leave_request_handler))
        .route("/leave/requests/:id/approve", post(approve_leave_handler))
        .route("/leave/requests/:id/reject", post(reject_leave_handler))
        .route("/leave/requests/:id/cancel", post(cancel_leave_handler))
        .route("/leave/carry-forward", post(carry_forward_handler))
        .route("/employees/:id/rating", get(employee_rating_handler))
        .route("/loans", post(create_loan_handler))
        .route("/loans/:id", get(get_loan_handler))
        .route("/loans/:id/approve", post(approve_loan_handler))
        .route("/loans/:id/reject", post(reject_loan_handler))
        .route("/loans/:id/disburse", post(disburse_loan_handler))
        .route("/loans/:id/repayments", post(record_repayment_handler))
        .route("/salary-components/migrate", post(migrate_handler))
        .with_state(state)
}

/// Handler for POST /payroll/run.
async fn run_payroll_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<PayrollRunRequest>, JsonRejection>,
) -> ApiResult<PayrollRunRecord> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant, "Processing payroll run request");

    let request = parse_body(correlation_id, payload)?;
    let start_time = Instant::now();
    let result = state.engine().run_payroll(&tenant, request, Utc::now());
    if let Ok(record) = &result {
        info!(
            correlation_id = %correlation_id,
            run_id = %record.id,
            employees = record.summary.total_employees,
            row_errors = record.summary.errors.len(),
            total_net = %record.summary.total_net,
            duration_us = start_time.elapsed().as_micros(),
            "Payroll run completed"
        );
    }
    respond(correlation_id, "payroll run", result)
}

/// Handler for GET /payroll/runs.
async fn list_payroll_runs_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Json<Vec<PayrollRunRecord>> {
    Json(state.engine().payroll_runs(&tenant))
}

/// Handler for POST /payslips/generate.
async fn generate_payslips_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<GeneratePayslipsRequest>, JsonRejection>,
) -> ApiResult<PayslipGenerationSummary> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant, "Processing payslip generation");

    let request = parse_body(correlation_id, payload)?;
    let result = state.engine().generate_payslips(
        &tenant,
        request.month,
        request.year,
        request.employee_ids,
        Utc::now(),
    );
    respond(correlation_id, "payslip generation", result)
}

/// Handler for GET /payslips.
async fn list_payslips_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Vec<Payslip>> {
    let correlation_id = Uuid::new_v4();
    let query = parse_query(correlation_id, query)?;
    Ok(Json(state.engine().payslips(&tenant, query.month, query.year)))
}

/// Handler for POST /payslips/:id/regenerate.
async fn regenerate_payslip_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Payslip> {
    let correlation_id = Uuid::new_v4();
    let payslip_id = parse_id(correlation_id, id)?;
    let result = state
        .engine()
        .regenerate_payslip(&tenant, payslip_id, Utc::now());
    respond(correlation_id, "payslip regeneration", result)
}

/// Handler for DELETE /payslips/:id.
async fn delete_payslip_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Payslip> {
    let correlation_id = Uuid::new_v4();
    let payslip_id = parse_id(correlation_id, id)?;
    let result = state.engine().delete_payslip(&tenant, payslip_id);
    respond(correlation_id, "payslip deletion", result)
}

/// Handler for DELETE /payslips.
async fn delete_all_payslips_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> Json<DeleteSummary> {
    Json(state.engine().delete_all_payslips(&tenant))
}

/// Handler for GET /leave/entitlement/:employee_id.
async fn leave_entitlement_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(employee_id): Path<String>,
    query: Result<Query<EntitlementQuery>, QueryRejection>,
) -> ApiResult<LeaveEntitlementResponse> {
    let correlation_id = Uuid::new_v4();
    let query = parse_query(correlation_id, query)?;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let result = state
        .engine()
        .leave_entitlement(&tenant, &employee_id, as_of);
    respond(correlation_id, "leave entitlement", result)
}

/// Handler for POST /leave/balances/:employee_id/refresh.
///
/// Stores the entitlement as of `as_of` (default today) as the employee's
/// balance for that year. The GET entitlement route never writes.
async fn refresh_leave_balance_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(employee_id): Path<String>,
    query: Result<Query<EntitlementQuery>, QueryRejection>,
) -> ApiResult<LeaveBalance> {
    let correlation_id = Uuid::new_v4();
    let query = parse_query(correlation_id, query)?;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let result = state
        .engine()
        .refresh_leave_balance(&tenant, &employee_id, as_of);
    respond(correlation_id, "leave balance refresh", result)
}

/// Handler for GET /leave/approved.
async fn approved_leaves_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> ApiResult<BTreeMap<String, MonthlyLeaveSummary>> {
    let correlation_id = Uuid::new_v4();
    let query = parse_query(correlation_id, query)?;
    let result = state
        .engine()
        .approved_leaves_by_month(&tenant, query.month, query.year);
    respond(correlation_id, "approved leave summary", result)
}

/// Handler for POST /leave/requests.
async fn create_leave_request_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> CreatedResult<LeaveRequest> {
    let correlation_id = Uuid::new_v4();
    let application = parse_body(correlation_id, payload)?;
    let result = state
        .engine()
        .create_leave_request(&tenant, application, Utc::now());
    created(respond(correlation_id, "leave request", result))
}

/// Handler for POST /leave/requests/:id/approve.
async fn approve_leave_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveActionRequest>, JsonRejection>,
) -> ApiResult<LeaveRequest> {
    leave_action(&state, &tenant, id, payload, LeaveStatus::Approved)
}

/// Handler for POST /leave/requests/:id/reject.
async fn reject_leave_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveActionRequest>, JsonRejection>,
) -> ApiResult<LeaveRequest> {
    leave_action(&state, &tenant, id, payload, LeaveStatus::Rejected)
}

/// Handler for POST /leave/requests/:id/cancel.
async fn cancel_leave_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveActionRequest>, JsonRejection>,
) -> ApiResult<LeaveRequest> {
    leave_action(&state, &tenant, id, payload, LeaveStatus::Cancelled)
}

fn leave_action(
    state: &AppState,
    tenant: &TenantId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveActionRequest>, JsonRejection>,
    to: LeaveStatus,
) -> ApiResult<LeaveRequest> {
    let correlation_id = Uuid::new_v4();
    let leave_id = parse_id(correlation_id, id)?;
    let action = parse_body(correlation_id, payload)?;
    let engine = state.engine();
    let now = Utc::now();
    let LeaveActionRequest { actor, reason } = action;
    let result = match to {
        LeaveStatus::Approved => engine.approve_leave(tenant, leave_id, &actor, reason, now),
        LeaveStatus::Rejected => engine.reject_leave(tenant, leave_id, &actor, reason, now),
        _ => engine.cancel_leave(tenant, leave_id, &actor, reason, now),
    };
    respond(correlation_id, "leave transition", result)
}

/// Handler for POST /leave/carry-forward.
async fn carry_forward_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<CarryForwardRequest>, JsonRejection>,
) -> ApiResult<CarryForwardSummary> {
    let correlation_id = Uuid::new_v4();
    let request = parse_body(correlation_id, payload)?;
    let result = state.engine().carry_forward(&tenant, request.from_year);
    respond(correlation_id, "leave carry-forward", result)
}

/// Handler for GET /employees/:id/rating.
async fn employee_rating_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(employee_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<RatingResult> {
    let correlation_id = Uuid::new_v4();
    let query = parse_query(correlation_id, query)?;
    let result = state.engine().employee_rating(
        &tenant,
        &employee_id,
        query.month,
        query.year,
        Utc::now().date_naive(),
    );
    respond(correlation_id, "employee rating", result)
}

/// Handler for POST /loans.
async fn create_loan_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    payload: Result<Json<LoanApplication>, JsonRejection>,
) -> CreatedResult<LoanRequest> {
    let correlation_id = Uuid::new_v4();
    let application = parse_body(correlation_id, payload)?;
    let result = state.engine().create_loan(&tenant, application, Utc::now());
    created(respond(correlation_id, "loan request", result))
}

/// Handler for GET /loans/:id.
async fn get_loan_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<LoanRequest> {
    let correlation_id = Uuid::new_v4();
    let loan_id = parse_id(correlation_id, id)?;
    respond(correlation_id, "loan lookup", state.engine().loan(&tenant, loan_id))
}

/// Handler for POST /loans/:id/approve.
async fn approve_loan_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ApproveLoanRequest>, JsonRejection>,
) -> ApiResult<LoanRequest> {
    let correlation_id = Uuid::new_v4();
    let loan_id = parse_id(correlation_id, id)?;
    let request = parse_body(correlation_id, payload)?;
    let result =
        state
            .engine()
            .approve_loan(&tenant, loan_id, request.disbursed_amount, Utc::now());
    respond(correlation_id, "loan approval", result)
}

/// Handler for POST /loans/:id/reject.
async fn reject_loan_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RejectLoanRequest>, JsonRejection>,
) -> ApiResult<LoanRequest> {
    let correlation_id = Uuid::new_v4();
    let loan_id = parse_id(correlation_id, id)?;
    let request = parse_body(correlation_id, payload)?;
    let result = state
        .engine()
        .reject_loan(&tenant, loan_id, request.reason, Utc::now());
    respond(correlation_id, "loan rejection", result)
}

/// Handler for POST /loans/:id/disburse.
async fn disburse_loan_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<LoanRequest> {
    let correlation_id = Uuid::new_v4();
    let loan_id = parse_id(correlation_id, id)?;
    let result = state.engine().disburse_loan(&tenant, loan_id, Utc::now());
    respond(correlation_id, "loan disbursement", result)
}

/// Handler for POST /loans/:id/repayments.
async fn record_repayment_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RepaymentRequest>, JsonRejection>,
) -> ApiResult<RepaymentResponse> {
    let correlation_id = Uuid::new_v4();
    let loan_id = parse_id(correlation_id, id)?;
    let request = parse_body(correlation_id, payload)?;
    let result = state
        .engine()
        .record_repayment(&tenant, loan_id, request.month, request.year, Utc::now())
        .map(|(loan, outcome)| RepaymentResponse { loan, outcome });
    respond(correlation_id, "loan repayment", result)
}

/// Handler for POST /salary-components/migrate.
async fn migrate_handler(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> ApiResult<MigrationReport> {
    let correlation_id = Uuid::new_v4();
    let result = state
        .engine()
        .migrate_salary_structure(&tenant, Utc::now());
    respond(correlation_id, "salary migration", result)
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
fn parse_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the bad field.
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
    Err(ApiErrorResponse::bad_request(error))
}

fn parse_query<T: DeserializeOwned>(
    correlation_id: Uuid,
    query: Result<Query<T>, QueryRejection>,
) -> Result<T, ApiErrorResponse> {
    query.map(|Query(query)| query).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

fn parse_id(
    correlation_id: Uuid,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Uuid, ApiErrorResponse> {
    id.map(|Path(id)| id).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path id");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

/// Wraps an engine result, logging failures against the correlation id.
fn respond<T>(correlation_id: Uuid, operation: &str, result: EngineResult<T>) -> ApiResult<T> {
    match result {
        Ok(value) => {
            info!(correlation_id = %correlation_id, operation, "Request completed");
            Ok(Json(value))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                code = err.code(),
                error = %err,
                "Request failed"
            );
            Err(err.into())
        }
    }
}

fn created<T>(result: ApiResult<T>) -> CreatedResult<T> {
    result.map(|json| (StatusCode::CREATED, json))
}
