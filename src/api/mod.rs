//! HTTP API module for the payroll engine.
//!
//! This module exposes the engine operations as REST endpoints. The calling
//! tenant is read from the `X-Tenant-Id` header on every request.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ApproveLoanRequest, CarryForwardRequest, EntitlementQuery, GeneratePayslipsRequest,
    LeaveActionRequest, MonthQuery, PeriodQuery, RejectLoanRequest, RepaymentRequest, Tenant,
    TENANT_HEADER,
};
pub use response::{ApiError, ApiErrorResponse, RepaymentResponse};
pub use state::AppState;
