//! Leave requests, balances and entitlement responses.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TenantId, Tenanted};

/// The kind of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Casual leave, accrued monthly.
    Casual,
    /// Sick leave, granted yearly.
    Sick,
    /// Annual leave, when the tenant grants it.
    Annual,
    /// Leave without pay.
    Unpaid,
    /// Any other leave (bereavement, compensatory, ...).
    Other,
}

/// State of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; counts as used.
    Approved,
    /// Rejected; terminal.
    Rejected,
    /// Withdrawn; terminal and never counted.
    Cancelled,
}

impl LeaveStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who moved a leave request to a new state, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTransition {
    /// The acting user.
    pub actor: String,
    /// When the transition happened.
    pub at: DateTime<Utc>,
    /// Optional reason or remark.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier of the request.
    pub id: Uuid,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The requesting employee.
    pub employee_id: String,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Half-day request; only valid when start and end coincide.
    #[serde(default)]
    pub half_day: bool,
    /// Computed leave days.
    pub days: Decimal,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
    /// Current state.
    pub status: LeaveStatus,
    /// When the request was submitted.
    pub created_date: DateTime<Utc>,
    /// Approval stamp.
    #[serde(default)]
    pub approved: Option<LeaveTransition>,
    /// Rejection stamp.
    #[serde(default)]
    pub rejected: Option<LeaveTransition>,
    /// Cancellation stamp.
    #[serde(default)]
    pub cancelled: Option<LeaveTransition>,
}

/// Input for a new leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The requesting employee.
    pub employee_id: String,
    /// Kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Half a day; only valid when start and end coincide.
    #[serde(default)]
    pub half_day: bool,
    /// Free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl Tenanted for LeaveRequest {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Stored leave balance of an employee for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The employee.
    pub employee_id: String,
    /// The entitlement year.
    pub year: i32,
    /// Casual leave accrued.
    pub casual_accrued: Decimal,
    /// Casual leave used.
    pub casual_used: Decimal,
    /// Casual leave remaining.
    pub casual_balance: Decimal,
    /// Sick leave granted.
    pub sick_total: Decimal,
    /// Sick leave used.
    pub sick_used: Decimal,
    /// Sick leave remaining.
    pub sick_balance: Decimal,
    /// Casual leave carried over from the previous year (capped).
    pub carried_forward_leaves: Decimal,
    /// When accrual was last evaluated.
    #[serde(default)]
    pub last_accrual_date: Option<NaiveDate>,
}

impl LeaveBalance {
    /// Creates an empty balance for an employee and year.
    pub fn empty(tenant_id: TenantId, employee_id: impl Into<String>, year: i32) -> Self {
        Self {
            tenant_id,
            employee_id: employee_id.into(),
            year,
            casual_accrued: Decimal::ZERO,
            casual_used: Decimal::ZERO,
            casual_balance: Decimal::ZERO,
            sick_total: Decimal::ZERO,
            sick_used: Decimal::ZERO,
            sick_balance: Decimal::ZERO,
            carried_forward_leaves: Decimal::ZERO,
            last_accrual_date: None,
        }
    }
}

impl Tenanted for LeaveBalance {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Computed leave entitlement of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEntitlementResponse {
    /// The employee.
    pub employee_id: String,
    /// The entitlement year.
    pub year: i32,
    /// Whole months since joining.
    pub months_of_service: u32,
    /// Monthly casual accrual rate applied.
    pub casual_leave_per_month: Decimal,
    /// Casual leave accrued over the service period.
    pub casual_leave_accrued: Decimal,
    /// Approved casual leave in the entitlement year.
    pub casual_leave_used: Decimal,
    /// Casual leave remaining, never negative.
    pub casual_leave_balance: Decimal,
    /// Sick leave granted for the year.
    pub sick_leave_total: Decimal,
    /// Approved sick leave in the entitlement year.
    pub sick_leave_used: Decimal,
    /// Sick leave remaining, never negative.
    pub sick_leave_balance: Decimal,
    /// Annual leave granted, when configured.
    #[serde(default)]
    pub annual_leave_total: Option<Decimal>,
    /// Approved annual leave in the entitlement year.
    pub annual_leave_used: Decimal,
    /// Annual leave remaining, never negative.
    pub annual_leave_balance: Decimal,
    /// Carried over from the previous year.
    pub carried_forward_leaves: Decimal,
    /// Casual + sick + carried forward (+ annual) balance.
    pub total_available_leaves: Decimal,
}

/// Leave taken by one employee in one month, against the monthly entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyLeaveSummary {
    /// Approved casual days falling in the month.
    pub casual_taken: Decimal,
    /// Approved sick days falling in the month.
    pub sick_taken: Decimal,
    /// Casual days the employee accrues per month.
    pub casual_entitled: Decimal,
    /// Sick days prorated to one month.
    pub sick_entitled: Decimal,
    /// Casual days taken beyond the entitlement.
    pub casual_excess: Decimal,
    /// Sick days taken beyond the entitlement.
    pub sick_excess: Decimal,
    /// Approved days of any other leave type.
    pub other_days: Decimal,
    /// Casual excess + sick excess.
    pub total_excess_days: Decimal,
}

/// Result of the year-end carry-forward batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardSummary {
    /// Year whose unused casual leave was carried.
    pub from_year: i32,
    /// Year that received the carried leave.
    pub to_year: i32,
    /// Employees processed.
    pub employees_processed: usize,
    /// Total days carried across all employees.
    pub total_carried: Decimal,
}
