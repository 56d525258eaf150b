//! Salary component resolution.
//!
//! Turns an employee's salary structure, in whichever representation is
//! authoritative, into an ordered list of [`LineItem`]s. This is the single
//! place that knows about both representations; payroll runs and payslips
//! only ever see line items.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::LegacyMappingTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, BASIC_COMPONENT_TYPE, CalculationMode, ComponentCategory, Employee,
    LegacySalaryFields, LineItem, SalaryComponentAssignment, SalaryComponentDefinition,
    SalaryRepresentation,
};

use super::rounding::round_money;

/// Line items resolved for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponents {
    /// Resolved line items, in payslip order.
    pub items: Vec<LineItem>,
    /// The audit step recording the resolution.
    pub audit_step: AuditStep,
}

impl ResolvedComponents {
    /// Earnings-side items: earnings, benefits and reimbursements.
    pub fn earnings(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| !item.is_deduction())
    }

    /// Deduction items.
    pub fn deductions(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.is_deduction())
    }

    /// Sum of earnings-side items.
    pub fn earnings_total(&self) -> Decimal {
        self.earnings().map(|item| item.amount).sum()
    }

    /// Sum of deduction items.
    pub fn deductions_total(&self) -> Decimal {
        self.deductions().map(|item| item.amount).sum()
    }
}

/// Resolves an employee's salary into line items.
///
/// Legacy structures are resolved through the mapping table, so a legacy
/// employee and the same employee after migration produce the same items.
/// Component-based structures are resolved against the tenant's catalog:
/// inactive assignments, non-positive amounts and assignments whose
/// definition has been disabled are left out. Percentage-of-basic
/// components are applied to the resolved basic salary. Each amount is
/// read in the calculation mode stored on its assignment.
///
/// # Errors
///
/// Returns [`EngineError::Computation`] when a percentage-of-basic
/// component is assigned but the employee has no basic salary component.
pub fn resolve_components(
    employee: &Employee,
    catalog: &[SalaryComponentDefinition],
    mappings: &LegacyMappingTable,
    step_number: u32,
) -> EngineResult<ResolvedComponents> {
    let (representation, items) = match employee.salary.representation() {
        SalaryRepresentation::Legacy(fields) => ("legacy", resolve_legacy(fields, mappings)),
        SalaryRepresentation::ComponentBased(assignments) => (
            "component_based",
            resolve_assignments(&employee.id, assignments, catalog)?,
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "salary_component_resolution".to_string(),
        rule_name: "Salary Component Resolution".to_string(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "representation": representation,
        }),
        output: serde_json::json!({
            "line_items": items.iter().map(|item| serde_json::json!({
                "name": item.name,
                "category": item.category.as_str(),
                "amount": item.amount.normalize().to_string(),
            })).collect::<Vec<_>>(),
        }),
        reasoning: format!(
            "Resolved {} line items from the {} salary structure",
            items.len(),
            representation
        ),
    };

    Ok(ResolvedComponents { items, audit_step })
}

fn resolve_legacy(fields: &LegacySalaryFields, mappings: &LegacyMappingTable) -> Vec<LineItem> {
    mappings
        .iter()
        .filter_map(|mapping| {
            let amount = fields.amount(mapping.legacy_field);
            (amount > Decimal::ZERO).then(|| LineItem {
                name: mapping.name.clone(),
                payslip_label: mapping.payslip_label.clone(),
                component_type: mapping.component_type.clone(),
                category: mapping.category,
                amount: round_money(amount),
                is_taxable: mapping.is_taxable,
                counts_for_epf: mapping.counts_for_epf,
                counts_for_esi: mapping.counts_for_esi,
            })
        })
        .collect()
}

/// An assignment merged with its catalog definition.
struct EffectiveComponent<'a> {
    assignment: &'a SalaryComponentAssignment,
    definition: Option<&'a SalaryComponentDefinition>,
}

impl EffectiveComponent<'_> {
    fn name(&self) -> &str {
        self.definition
            .map_or(self.assignment.name.as_str(), |d| d.name.as_str())
    }

    fn payslip_label(&self) -> &str {
        self.definition
            .map_or(self.assignment.name.as_str(), |d| d.payslip_label.as_str())
    }

    fn category(&self) -> ComponentCategory {
        self.definition
            .map_or(self.assignment.category, |d| d.category)
    }

    fn component_type(&self) -> &str {
        self.definition
            .map_or(self.assignment.component_type.as_str(), |d| {
                d.component_type.as_str()
            })
    }

    /// The mode the assigned amount was recorded in. A later change to the
    /// catalog entry's mode does not reinterpret existing amounts.
    fn calculation_mode(&self) -> CalculationMode {
        self.assignment.calculation_mode
    }

    fn is_basic(&self) -> bool {
        self.category() == ComponentCategory::Earnings
            && self.component_type() == BASIC_COMPONENT_TYPE
            && self.calculation_mode() == CalculationMode::FlatAmount
    }

    fn flags(&self) -> (bool, bool, bool) {
        match self.definition {
            Some(d) => (d.is_taxable, d.counts_for_epf, d.counts_for_esi),
            None => (
                self.assignment.is_taxable,
                self.assignment.counts_for_epf,
                self.assignment.counts_for_esi,
            ),
        }
    }
}

fn resolve_assignments(
    employee_id: &str,
    assignments: &[SalaryComponentAssignment],
    catalog: &[SalaryComponentDefinition],
) -> EngineResult<Vec<LineItem>> {
    let definitions: HashMap<Uuid, &SalaryComponentDefinition> =
        catalog.iter().map(|d| (d.id, d)).collect();

    let effective: Vec<EffectiveComponent<'_>> = assignments
        .iter()
        .filter(|a| a.is_active && a.amount > Decimal::ZERO)
        .map(|assignment| EffectiveComponent {
            assignment,
            definition: definitions.get(&assignment.component_id).copied(),
        })
        .filter(|c| c.definition.is_none_or(|d| d.is_active))
        .collect();

    let basic = effective
        .iter()
        .find(|c| c.is_basic())
        .map(|c| round_money(c.assignment.amount));

    effective
        .iter()
        .map(|component| {
            let amount = match component.calculation_mode() {
                CalculationMode::FlatAmount => round_money(component.assignment.amount),
                CalculationMode::PercentageOfBasic => {
                    let basic = basic.ok_or_else(|| {
                        EngineError::computation(format!(
                            "employee {} has percentage-of-basic component '{}' but no basic salary",
                            employee_id,
                            component.name()
                        ))
                    })?;
                    round_money(basic * component.assignment.amount / Decimal::ONE_HUNDRED)
                }
            };
            let (is_taxable, counts_for_epf, counts_for_esi) = component.flags();
            Ok(LineItem {
                name: component.name().to_string(),
                payslip_label: component.payslip_label().to_string(),
                component_type: component.component_type().to_string(),
                category: component.category(),
                amount,
                is_taxable,
                counts_for_epf,
                counts_for_esi,
            })
        })
        .collect()
}
