//! Monthly payroll run calculation.
//!
//! Earnings are prorated by days worked; bonus and adjustments are added
//! after proration; deductions are never prorated. The loan deduction given
//! on the run row replaces any loan deduction stored on the employee.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, ComponentCategory, Employee, EmployeePayrollBreakdown, LineItem,
    PayrollRunRequest, PayrollRunRow, RowError, RunSummary,
};

use super::rounding::round_money;
use super::salary_components::ResolvedComponents;

/// Component type under which loan repayments are deducted.
pub const LOAN_DEDUCTION_COMPONENT_TYPE: &str = "loan_deduction";

/// Earliest year accepted for a payroll period.
pub const MIN_PAYROLL_YEAR: i32 = 1900;

/// Latest year accepted for a payroll period.
pub const MAX_PAYROLL_YEAR: i32 = 9999;

/// Validates a payroll month and year.
pub fn validate_period(month: u32, year: i32) -> EngineResult<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::validation(
            "month",
            format!("month must be between 1 and 12, got {}", month),
        ));
    }
    if !(MIN_PAYROLL_YEAR..=MAX_PAYROLL_YEAR).contains(&year) {
        return Err(EngineError::validation(
            "year",
            format!(
                "year must be between {} and {}, got {}",
                MIN_PAYROLL_YEAR, MAX_PAYROLL_YEAR, year
            ),
        ));
    }
    Ok(())
}

/// Returns the first and last calendar day of a month.
pub fn month_bounds(month: u32, year: i32) -> EngineResult<(NaiveDate, NaiveDate)> {
    validate_period(month, year)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::validation("month", "invalid calendar month"))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| EngineError::validation("month", "invalid calendar month"))?;
    Ok((first, last))
}

/// Returns the number of calendar days in a month.
pub fn days_in_month(month: u32, year: i32) -> EngineResult<u32> {
    let (_, last) = month_bounds(month, year)?;
    Ok(last.day())
}

/// Validates a run request as a whole.
///
/// Any failure here rejects the entire run before a single row is computed.
pub fn validate_run_request(request: &PayrollRunRequest) -> EngineResult<()> {
    validate_period(request.month, request.year)?;
    if request.rows.is_empty() {
        return Err(EngineError::validation(
            "rows",
            "a payroll run needs at least one row",
        ));
    }

    let days = Decimal::from(days_in_month(request.month, request.year)?);
    let mut seen = HashSet::new();
    for (index, row) in request.rows.iter().enumerate() {
        let field = |name: &str| format!("rows[{}].{}", index, name);

        if row.employee_id.trim().is_empty() {
            return Err(EngineError::validation(
                field("employee_id"),
                "employee id must not be empty",
            ));
        }
        if !seen.insert(row.employee_id.as_str()) {
            return Err(EngineError::validation(
                field("employee_id"),
                format!("employee {} appears more than once", row.employee_id),
            ));
        }
        if row.days_worked < Decimal::ZERO || row.days_worked > days {
            return Err(EngineError::validation(
                field("days_worked"),
                format!("must be between 0 and {}", days),
            ));
        }
        for (name, value) in [
            ("overtime_hours", row.overtime_hours),
            ("bonus", row.bonus),
            ("loan_deductions", row.loan_deductions),
            ("tds", row.tds),
        ] {
            if value < Decimal::ZERO {
                return Err(EngineError::validation(field(name), "must not be negative"));
            }
        }
    }
    Ok(())
}

/// Computes one employee's payroll for a run.
///
/// `resolved` holds the employee's full-month line items; its audit step is
/// carried into the breakdown ahead of the proration and net pay steps.
pub fn compute_employee_payroll(
    employee: &Employee,
    resolved: ResolvedComponents,
    row: &PayrollRunRow,
    days_in_month: u32,
) -> EngineResult<EmployeePayrollBreakdown> {
    if days_in_month == 0 {
        return Err(EngineError::computation("days in month must be positive"));
    }
    let mut audit_steps = vec![resolved.audit_step.clone()];
    let mut current_step = resolved.audit_step.step_number + 1;

    let earnings: Vec<LineItem> = resolved.earnings().cloned().collect();
    let full_month_gross = resolved.earnings_total();
    let days = Decimal::from(days_in_month);
    let proration_factor = row.days_worked / days;
    let gross = round_money(full_month_gross * row.days_worked / days);

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "earnings_proration".to_string(),
        rule_name: "Earnings Proration".to_string(),
        input: serde_json::json!({
            "full_month_gross": full_month_gross.normalize().to_string(),
            "days_worked": row.days_worked.normalize().to_string(),
            "days_in_month": days_in_month,
        }),
        output: serde_json::json!({
            "gross": gross.normalize().to_string(),
        }),
        reasoning: format!(
            "Prorated earnings: ${} x {}/{} days = ${}",
            full_month_gross.normalize(),
            row.days_worked.normalize(),
            days_in_month,
            gross.normalize()
        ),
    });
    current_step += 1;

    let mut deductions: Vec<LineItem> = resolved
        .deductions()
        .filter(|item| item.component_type != LOAN_DEDUCTION_COMPONENT_TYPE)
        .cloned()
        .collect();
    if row.loan_deductions > Decimal::ZERO {
        deductions.push(run_deduction(
            "Loan Deduction",
            LOAN_DEDUCTION_COMPONENT_TYPE,
            row.loan_deductions,
        ));
    }
    if row.tds > Decimal::ZERO {
        deductions.push(run_deduction("TDS (payroll run)", "run_tds", row.tds));
    }
    let total_deductions: Decimal = deductions.iter().map(|item| item.amount).sum();

    let bonus = round_money(row.bonus);
    let adjustments = round_money(row.adjustments);
    let net = gross + bonus + adjustments - total_deductions;

    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "bonus": bonus.normalize().to_string(),
            "adjustments": adjustments.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
        }),
        output: serde_json::json!({
            "net": net.normalize().to_string(),
        }),
        reasoning: format!(
            "Net pay: ${} + ${} bonus + ${} adjustments - ${} deductions = ${}",
            gross.normalize(),
            bonus.normalize(),
            adjustments.normalize(),
            total_deductions.normalize(),
            net.normalize()
        ),
    });

    Ok(EmployeePayrollBreakdown {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        days_worked: row.days_worked,
        days_in_month,
        overtime_hours: row.overtime_hours,
        earnings,
        deductions,
        full_month_gross,
        proration_factor,
        gross,
        bonus,
        adjustments,
        total_deductions,
        net,
        audit_steps,
    })
}

fn run_deduction(name: &str, component_type: &str, amount: Decimal) -> LineItem {
    LineItem {
        name: name.to_string(),
        payslip_label: name.to_string(),
        component_type: component_type.to_string(),
        category: ComponentCategory::Deductions,
        amount: round_money(amount),
        is_taxable: false,
        counts_for_epf: false,
        counts_for_esi: false,
    }
}

/// Builds a [`RowError`] from an engine error.
pub fn row_error(row_index: usize, employee_id: &str, error: &EngineError) -> RowError {
    RowError {
        row_index,
        employee_id: employee_id.to_string(),
        code: error.code().to_string(),
        message: error.to_string(),
    }
}

/// Folds per-row outcomes into a run summary, keeping request order.
pub fn summarize_run(
    month: u32,
    year: i32,
    outcomes: Vec<Result<EmployeePayrollBreakdown, RowError>>,
) -> RunSummary {
    let mut summary = RunSummary {
        month,
        year,
        total_employees: 0,
        total_gross: Decimal::ZERO,
        total_deductions: Decimal::ZERO,
        total_net: Decimal::ZERO,
        per_employee_breakdown: Vec::new(),
        errors: Vec::new(),
    };

    for outcome in outcomes {
        match outcome {
            Ok(breakdown) => {
                summary.total_employees += 1;
                summary.total_gross += breakdown.gross;
                summary.total_deductions += breakdown.total_deductions;
                summary.total_net += breakdown.net;
                summary.per_employee_breakdown.push(breakdown);
            }
            Err(error) => summary.errors.push(error),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::resolve_components;
    use crate::config::{ConfigLoader, LegacyMappingTable};
    use crate::models::{EmployeeStatus, LegacySalaryFields, SalaryStructure, TenantId};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn mappings() -> LegacyMappingTable {
        ConfigLoader::load("./config/default")
            .expect("Failed to load config")
            .legacy_mappings()
            .clone()
    }

    fn employee(fields: LegacySalaryFields) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            tenant_id: TenantId::new("acme"),
            name: "Asha Rao".to_string(),
            status: EmployeeStatus::Active,
            date_of_joining: None,
            custom_casual_leave_per_month: None,
            custom_sick_leave_per_year: None,
            custom_annual_leave_per_year: None,
            salary: SalaryStructure::legacy(fields),
        }
    }

    fn row(days_worked: &str) -> PayrollRunRow {
        PayrollRunRow {
            employee_id: "emp_001".to_string(),
            days_worked: dec(days_worked),
            overtime_hours: Decimal::ZERO,
            bonus: Decimal::ZERO,
            adjustments: Decimal::ZERO,
            loan_deductions: Decimal::ZERO,
            tds: Decimal::ZERO,
        }
    }

    fn compute(fields: LegacySalaryFields, row: &PayrollRunRow, dim: u32) -> EmployeePayrollBreakdown {
        let emp = employee(fields);
        let resolved = resolve_components(&emp, &[], &mappings(), 1).unwrap();
        compute_employee_payroll(&emp, resolved, row, dim).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2, 2024).unwrap(), 29);
        assert_eq!(days_in_month(2, 2025).unwrap(), 28);
        assert_eq!(days_in_month(4, 2025).unwrap(), 30);
        assert_eq!(days_in_month(12, 2025).unwrap(), 31);
    }

    #[test]
    fn test_month_out_of_range_is_rejected() {
        assert!(matches!(
            days_in_month(13, 2025),
            Err(EngineError::Validation { .. })
        ));
        assert!(validate_period(0, 2025).is_err());
    }

    #[test]
    fn test_full_month_prorates_to_full_gross() {
        let fields = LegacySalaryFields {
            basic: dec("30000"),
            hra: dec("12000"),
            employee_pf: dec("1800"),
            ..Default::default()
        };
        let breakdown = compute(fields, &row("30"), 30);

        assert_eq!(breakdown.gross, dec("42000"));
        assert_eq!(breakdown.total_deductions, dec("1800"));
        assert_eq!(breakdown.net, dec("40200"));
        assert_eq!(breakdown.audit_steps.len(), 3);
    }

    #[test]
    fn test_partial_month_prorates_earnings_only() {
        let fields = LegacySalaryFields {
            basic: dec("31000"),
            professional_tax: dec("200"),
            ..Default::default()
        };
        let mut input = row("15.5");
        input.bonus = dec("1000");
        input.adjustments = dec("-250");
        let breakdown = compute(fields, &input, 31);

        assert_eq!(breakdown.full_month_gross, dec("31000"));
        assert_eq!(breakdown.gross, dec("15500"));
        assert_eq!(breakdown.total_deductions, dec("200"));
        assert_eq!(breakdown.net, dec("16050"));
    }

    #[test]
    fn test_row_loan_deduction_overrides_stored_value() {
        let fields = LegacySalaryFields {
            basic: dec("30000"),
            loan_deductions: dec("5000"),
            ..Default::default()
        };
        let mut input = row("30");
        input.loan_deductions = dec("2000");
        input.tds = dec("1200");
        let breakdown = compute(fields, &input, 30);

        assert_eq!(breakdown.total_deductions, dec("3200"));
        assert_eq!(
            breakdown
                .deductions
                .iter()
                .filter(|d| d.component_type == LOAN_DEDUCTION_COMPONENT_TYPE)
                .count(),
            1
        );
    }

    #[test]
    fn test_zero_days_worked() {
        let fields = LegacySalaryFields {
            basic: dec("30000"),
            ..Default::default()
        };
        let breakdown = compute(fields, &row("0"), 30);
        assert_eq!(breakdown.gross, Decimal::ZERO);
        assert_eq!(breakdown.net, Decimal::ZERO);
    }

    #[test]
    fn test_proration_rounds_to_cents() {
        let fields = LegacySalaryFields {
            basic: dec("10000"),
            ..Default::default()
        };
        let breakdown = compute(fields, &row("10"), 31);
        assert_eq!(breakdown.gross, dec("3225.81"));
    }

    #[test]
    fn test_validate_rejects_days_over_month_length() {
        let request = PayrollRunRequest {
            month: 2,
            year: 2025,
            rows: vec![row("29")],
        };
        assert!(matches!(
            validate_run_request(&request),
            Err(EngineError::Validation { field, .. }) if field == "rows[0].days_worked"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_amounts_but_not_adjustments() {
        let mut bad = row("20");
        bad.bonus = dec("-1");
        let request = PayrollRunRequest {
            month: 1,
            year: 2025,
            rows: vec![bad],
        };
        assert!(validate_run_request(&request).is_err());

        let mut ok = row("20");
        ok.adjustments = dec("-500");
        let request = PayrollRunRequest {
            month: 1,
            year: 2025,
            rows: vec![ok],
        };
        assert!(validate_run_request(&request).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_duplicate_rows() {
        let empty = PayrollRunRequest {
            month: 1,
            year: 2025,
            rows: vec![],
        };
        assert!(validate_run_request(&empty).is_err());

        let duplicate = PayrollRunRequest {
            month: 1,
            year: 2025,
            rows: vec![row("20"), row("21")],
        };
        assert!(validate_run_request(&duplicate).is_err());
    }

    #[test]
    fn test_summary_totals_skip_failed_rows() {
        let fields = LegacySalaryFields {
            basic: dec("30000"),
            ..Default::default()
        };
        let ok = compute(fields, &row("30"), 30);
        let failed = row_error(
            1,
            "emp_404",
            &EngineError::NotFound {
                entity: "employee",
                id: "emp_404".to_string(),
            },
        );

        let summary = summarize_run(6, 2025, vec![Ok(ok), Err(failed)]);
        assert_eq!(summary.total_employees, 1);
        assert_eq!(summary.total_gross, dec("30000"));
        assert_eq!(summary.total_net, dec("30000"));
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].code, "NOT_FOUND");
    }
}
