//! Loan request model and lifecycle states.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TenantId, Tenanted};

/// State of a loan request.
///
/// `pending → approved → disbursed → closed`, or `pending → rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; ledger initialised.
    Approved,
    /// Rejected; terminal.
    Rejected,
    /// Money paid out; repayments may be recorded.
    Disbursed,
    /// Fully repaid; terminal.
    Closed,
}

impl LoanStatus {
    /// Returns the snake_case name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Disbursed => "disbursed",
            LoanStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An EMI repayment applied to a loan for one payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRepayment {
    /// Month of the payroll period.
    pub month: u32,
    /// Year of the payroll period.
    pub year: i32,
    /// Installment paid (interest + principal).
    pub amount: Decimal,
    /// Interest portion of the installment.
    pub interest: Decimal,
    /// Principal portion, removed from the outstanding balance.
    pub principal: Decimal,
    /// When the repayment was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A loan requested by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Unique identifier of the loan.
    pub id: Uuid,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The borrowing employee.
    pub employee_id: String,
    /// Loan type name (e.g. "Personal Loan").
    pub loan_type: String,
    /// Requested principal.
    pub amount: Decimal,
    /// Repayment tenure in months.
    pub tenure_months: u32,
    /// Annual interest rate in percent.
    pub interest_rate: Decimal,
    /// Equated monthly installment, rounded to the currency unit.
    pub monthly_emi: Decimal,
    /// Purpose given by the employee.
    #[serde(default)]
    pub purpose: Option<String>,
    /// Current state.
    pub status: LoanStatus,
    /// Amount actually disbursed; set on approval.
    #[serde(default)]
    pub disbursed_amount: Option<Decimal>,
    /// Principal still owed.
    pub outstanding_amount: Decimal,
    /// Installments paid so far.
    pub paid_emis: u32,
    /// Installments still due.
    pub remaining_emis: u32,
    /// Repayments applied, at most one per payroll period.
    #[serde(default)]
    pub repayments: Vec<LoanRepayment>,
    /// Reason given when the loan was rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// When the request was created.
    pub created_date: DateTime<Utc>,
    /// When the request was approved.
    #[serde(default)]
    pub approved_date: Option<DateTime<Utc>>,
    /// When the money was disbursed.
    #[serde(default)]
    pub disbursed_date: Option<DateTime<Utc>>,
    /// When the request was rejected.
    #[serde(default)]
    pub rejected_date: Option<DateTime<Utc>>,
}

/// Input for a new loan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// The borrowing employee.
    pub employee_id: String,
    /// Loan type name; selects the default interest rate.
    pub loan_type: String,
    /// Requested principal.
    pub amount: Decimal,
    /// Repayment tenure in months.
    pub tenure_months: u32,
    /// Annual rate in percent; defaults to the loan type's rate.
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    /// Purpose of the loan.
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Whether a repayment call changed the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentOutcome {
    /// A new installment was applied.
    Applied,
    /// The period already had a repayment; nothing changed.
    AlreadyRecorded,
}

impl LoanRequest {
    /// Returns the repayment recorded for a period, if any.
    pub fn repayment_for(&self, month: u32, year: i32) -> Option<&LoanRepayment> {
        self.repayments
            .iter()
            .find(|r| r.month == month && r.year == year)
    }
}

impl Tenanted for LoanRequest {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_status_serialization() {
        assert_eq!(
            serde_json::to_string(&LoanStatus::Disbursed).unwrap(),
            "\"disbursed\""
        );
        assert_eq!(LoanStatus::Pending.to_string(), "pending");
    }
}
