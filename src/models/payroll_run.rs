//! Payroll run input and summary models.
//!
//! A payroll run is an ephemeral batch: per-employee adjustments come in,
//! a [`RunSummary`] with totals and a per-employee breakdown comes out.
//! Runs never write payslips.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditStep, LineItem, TenantId, Tenanted};

/// Per-employee input row of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunRow {
    /// The employee the row applies to.
    pub employee_id: String,
    /// Days worked in the month; earnings are prorated by this.
    pub days_worked: Decimal,
    /// Approved overtime hours, carried through to the breakdown.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// One-off bonus, not prorated.
    #[serde(default)]
    pub bonus: Decimal,
    /// Signed manual adjustment, not prorated.
    #[serde(default)]
    pub adjustments: Decimal,
    /// Loan repayment for the month; overrides any stored loan deduction.
    #[serde(default)]
    pub loan_deductions: Decimal,
    /// Tax deducted at source for the month.
    #[serde(default)]
    pub tds: Decimal,
}

/// Request shape of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// Month of the run (1-12).
    pub month: u32,
    /// Year of the run.
    pub year: i32,
    /// Per-employee rows.
    pub rows: Vec<PayrollRunRow>,
}

/// The computed payroll of one employee within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayrollBreakdown {
    /// The employee.
    pub employee_id: String,
    /// The employee's name.
    pub employee_name: String,
    /// Days worked in the month.
    pub days_worked: Decimal,
    /// Calendar days in the month.
    pub days_in_month: u32,
    /// Overtime hours reported for the month.
    pub overtime_hours: Decimal,
    /// Full-month earnings-side line items.
    pub earnings: Vec<LineItem>,
    /// Deduction line items, including the request's loan and TDS amounts.
    pub deductions: Vec<LineItem>,
    /// Sum of full-month earnings before proration.
    pub full_month_gross: Decimal,
    /// days_worked / days_in_month.
    pub proration_factor: Decimal,
    /// Prorated gross earnings.
    pub gross: Decimal,
    /// Bonus added on top of gross.
    pub bonus: Decimal,
    /// Adjustment added on top of gross.
    pub adjustments: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Net pay: gross + bonus + adjustments - deductions.
    pub net: Decimal,
    /// How each figure was derived.
    pub audit_steps: Vec<AuditStep>,
}

/// A row that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based index of the row in the request.
    pub row_index: usize,
    /// The employee id given on the row.
    pub employee_id: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// Result of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Month of the run.
    pub month: u32,
    /// Year of the run.
    pub year: i32,
    /// Number of employees successfully processed.
    pub total_employees: usize,
    /// Sum of prorated gross earnings.
    pub total_gross: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
    /// Per-employee results in request order.
    pub per_employee_breakdown: Vec<EmployeePayrollBreakdown>,
    /// Rows that failed; the rest of the batch still completed.
    pub errors: Vec<RowError>,
}

/// A persisted payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunRecord {
    /// Unique identifier of the run.
    pub id: Uuid,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// When the run was processed.
    pub processed_at: DateTime<Utc>,
    /// The computed summary.
    pub summary: RunSummary,
}

impl Tenanted for PayrollRunRecord {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_optional_fields_default_to_zero() {
        let json = r#"{ "employee_id": "emp_001", "days_worked": 20 }"#;
        let row: PayrollRunRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.days_worked, Decimal::from(20));
        assert_eq!(row.bonus, Decimal::ZERO);
        assert_eq!(row.loan_deductions, Decimal::ZERO);
    }

    #[test]
    fn test_row_requires_days_worked() {
        let json = r#"{ "employee_id": "emp_001" }"#;
        let result: Result<PayrollRunRow, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
