//! Salary component catalog and resolved line items.
//!
//! A tenant's catalog lists the earnings, deductions, benefits and
//! reimbursements that can appear on a payslip. Employees reference catalog
//! entries through assignments (see [`crate::models::SalaryComponentAssignment`]);
//! the resolver turns either salary representation into [`LineItem`]s.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TenantId, Tenanted};

/// The component type that identifies Basic pay.
///
/// Percentage-of-basic components are computed against the line item of this type.
pub const BASIC_COMPONENT_TYPE: &str = "basic";

/// The category a salary component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Regular earnings (basic, allowances, incentives).
    Earnings,
    /// Amounts withheld from pay.
    Deductions,
    /// Non-cash or in-kind benefits paid alongside earnings.
    Benefits,
    /// Expense reimbursements paid alongside earnings.
    Reimbursements,
}

impl ComponentCategory {
    /// Returns true for categories that reduce pay.
    pub fn is_deduction(self) -> bool {
        self == ComponentCategory::Deductions
    }

    /// Returns the snake_case name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentCategory::Earnings => "earnings",
            ComponentCategory::Deductions => "deductions",
            ComponentCategory::Benefits => "benefits",
            ComponentCategory::Reimbursements => "reimbursements",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a component's amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// The stored amount is used as-is.
    #[default]
    FlatAmount,
    /// The stored amount is a percentage applied to the resolved Basic amount.
    PercentageOfBasic,
}

/// A tenant-scoped salary component catalog entry.
///
/// Definitions are never hard-deleted; they are disabled by clearing `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryComponentDefinition {
    /// Unique identifier of the definition.
    pub id: Uuid,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The component category.
    pub category: ComponentCategory,
    /// Machine name of the component within its category (e.g. "basic", "hra").
    pub component_type: String,
    /// Display name.
    pub name: String,
    /// Label printed on payslips.
    pub payslip_label: String,
    /// How the amount is derived.
    #[serde(default)]
    pub calculation_mode: CalculationMode,
    /// Default value (amount or percentage depending on the mode).
    pub value: Decimal,
    /// Whether the component counts toward taxable income.
    #[serde(default)]
    pub is_taxable: bool,
    /// Whether the component counts toward EPF wages.
    #[serde(default)]
    pub counts_for_epf: bool,
    /// Whether the component counts toward ESI wages.
    #[serde(default)]
    pub counts_for_esi: bool,
    /// Disabled components are skipped during resolution.
    pub is_active: bool,
    /// When the definition was created.
    pub created_date: DateTime<Utc>,
    /// When the definition was last updated.
    #[serde(default)]
    pub updated_date: Option<DateTime<Utc>>,
}

impl Tenanted for SalaryComponentDefinition {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// A single resolved earning or deduction for an employee and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name of the component.
    pub name: String,
    /// Label printed on payslips; payslip maps are keyed by it.
    pub payslip_label: String,
    /// Machine name of the component.
    pub component_type: String,
    /// The component category.
    pub category: ComponentCategory,
    /// The resolved amount.
    pub amount: Decimal,
    /// Whether the amount counts toward taxable income.
    pub is_taxable: bool,
    /// Whether the amount counts toward EPF wages.
    pub counts_for_epf: bool,
    /// Whether the amount counts toward ESI wages.
    pub counts_for_esi: bool,
}

impl LineItem {
    /// Returns true if the line item reduces pay.
    pub fn is_deduction(&self) -> bool {
        self.category.is_deduction()
    }
}

/// Counters returned by the legacy-to-component migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Tenants visited.
    pub tenants_processed: usize,
    /// Catalog definitions created.
    pub definitions_created: usize,
    /// Employees switched to component-based salary.
    pub employees_migrated: usize,
    /// Assignments created across all migrated employees.
    pub assignments_created: usize,
    /// Employees left untouched (already migrated, or nothing to migrate).
    pub employees_skipped: usize,
    /// Employees kept on legacy salary because a component they are paid is
    /// disabled in the catalog.
    #[serde(default)]
    pub employees_blocked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&ComponentCategory::Reimbursements).unwrap(),
            "\"reimbursements\""
        );
        let parsed: ComponentCategory = serde_json::from_str("\"deductions\"").unwrap();
        assert!(parsed.is_deduction());
    }

    #[test]
    fn test_only_deductions_reduce_pay() {
        assert!(!ComponentCategory::Earnings.is_deduction());
        assert!(!ComponentCategory::Benefits.is_deduction());
        assert!(!ComponentCategory::Reimbursements.is_deduction());
        assert!(ComponentCategory::Deductions.is_deduction());
    }

    #[test]
    fn test_calculation_mode_defaults_to_flat() {
        assert_eq!(CalculationMode::default(), CalculationMode::FlatAmount);
        assert_eq!(
            serde_json::to_string(&CalculationMode::PercentageOfBasic).unwrap(),
            "\"percentage_of_basic\""
        );
    }
}
