//! Request types for the payroll engine API.
//!
//! Bodies that map one-to-one onto an engine input (payroll runs, loan and
//! leave applications) are deserialized straight into the model types; the
//! structs here cover the remaining bodies, the query strings and the tenant
//! header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TenantId;

use super::response::{ApiError, ApiErrorResponse};

/// Header carrying the calling tenant.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The calling tenant, taken from the `X-Tenant-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match value {
            Some(tenant) => Ok(Tenant(TenantId::new(tenant))),
            None => Err(ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "MISSING_TENANT",
                    "X-Tenant-Id header is required",
                    "Every request must identify the calling company",
                ),
            }),
        }
    }
}

/// Request body for `POST /payslips/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayslipsRequest {
    /// Month to generate (1-12).
    pub month: u32,
    /// Year to generate.
    pub year: i32,
    /// Restricts generation to these employees, regardless of status.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}

/// Request body for `POST /loans/:id/approve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproveLoanRequest {
    /// Amount actually paid out, when less than requested.
    #[serde(default)]
    pub disbursed_amount: Option<Decimal>,
}

/// Request body for `POST /loans/:id/reject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectLoanRequest {
    /// Why the loan was rejected.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `POST /loans/:id/repayments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentRequest {
    /// Payroll month of the installment.
    pub month: u32,
    /// Payroll year of the installment.
    pub year: i32,
}

/// Request body for the leave approve, reject and cancel actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveActionRequest {
    /// Who is acting on the request.
    pub actor: String,
    /// Optional note, stored with the transition.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `POST /leave/carry-forward`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryForwardRequest {
    /// The year being closed.
    pub from_year: i32,
}

/// Optional month filter; both default to the current month where used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// Month (1-12).
    pub month: Option<u32>,
    /// Year.
    pub year: Option<i32>,
}

/// Required month selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthQuery {
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
}

/// Query for `GET /leave/entitlement/:employee_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementQuery {
    /// Date the entitlement is computed at; defaults to today.
    pub as_of: Option<NaiveDate>,
}
