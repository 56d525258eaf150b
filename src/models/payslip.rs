//! Payslip documents.
//!
//! A payslip is unique per (employee, month, year). Regeneration overwrites
//! the figures in place and never creates a second document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TenantId, Tenanted};

/// Lifecycle status of a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    /// Produced by a batch generation.
    Generated,
    /// Recomputed individually after generation.
    Regenerated,
}

/// The computed figures of a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipFigures {
    /// Earnings-side amounts keyed by component name.
    pub earnings: BTreeMap<String, Decimal>,
    /// Deduction amounts keyed by component name.
    pub deductions: BTreeMap<String, Decimal>,
    /// Sum of earnings.
    pub gross_salary: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Gross minus deductions.
    pub net_salary: Decimal,
}

/// A payslip document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier of the payslip.
    pub id: Uuid,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The employee the payslip belongs to.
    pub employee_id: String,
    /// The employee's name at generation time.
    pub employee_name: String,
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// The computed figures.
    #[serde(flatten)]
    pub figures: PayslipFigures,
    /// Lifecycle status.
    pub status: PayslipStatus,
    /// When the payslip was first generated.
    pub generated_date: DateTime<Utc>,
    /// When the payslip was last overwritten.
    #[serde(default)]
    pub updated_date: Option<DateTime<Utc>>,
}

impl Tenanted for Payslip {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// Figures for one employee and period, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayslipDraft {
    /// The employee.
    pub employee_id: String,
    /// The employee's name.
    pub employee_name: String,
    /// Month (1-12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// The computed figures.
    pub figures: PayslipFigures,
}

/// Whether an upsert created or overwrote a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new payslip was inserted.
    Inserted,
    /// An existing payslip was overwritten.
    Updated,
}

/// An employee that a generation batch did not produce a payslip for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEmployee {
    /// The employee id.
    pub employee_id: String,
    /// Why the employee was skipped.
    pub reason: String,
}

/// Counters returned by a payslip generation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipGenerationSummary {
    /// Payslips inserted.
    pub generated_count: usize,
    /// Payslips overwritten.
    pub updated_count: usize,
    /// Employees that could not be processed.
    pub skipped_count: usize,
    /// Employees considered by the batch.
    pub total_employees: usize,
    /// Details of skipped employees.
    pub skipped: Vec<SkippedEmployee>,
}

/// Result of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Number of documents removed.
    pub deleted_count: usize,
}
