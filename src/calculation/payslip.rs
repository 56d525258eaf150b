//! Payslip figure computation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{LineItem, PayslipFigures};

use super::salary_components::ResolvedComponents;

/// Computes full-period payslip figures from resolved line items.
///
/// Payslips are not prorated. Entries are keyed by payslip label; items
/// sharing a label are summed into a single entry.
pub fn compute_payslip_figures(resolved: &ResolvedComponents) -> PayslipFigures {
    let earnings = by_label(resolved.earnings());
    let deductions = by_label(resolved.deductions());
    let gross_salary: Decimal = earnings.values().copied().sum();
    let total_deductions: Decimal = deductions.values().copied().sum();

    PayslipFigures {
        earnings,
        deductions,
        gross_salary,
        total_deductions,
        net_salary: gross_salary - total_deductions,
    }
}

fn by_label<'a>(items: impl Iterator<Item = &'a LineItem>) -> BTreeMap<String, Decimal> {
    let mut map = BTreeMap::new();
    for item in items {
        *map.entry(item.payslip_label.clone()).or_insert(Decimal::ZERO) += item.amount;
    }
    map
}
