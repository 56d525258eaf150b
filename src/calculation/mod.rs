//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: salary component
//! resolution and the legacy migration, payroll run proration, payslip
//! figures, loan EMIs and repayment, leave entitlement and monthly leave
//! summaries, and the performance rating. None of them touch the store.

mod leave;
mod loan;
mod migration;
mod payroll_run;
mod payslip;
mod rating;
mod rounding;
mod salary_components;

pub use leave::{
    carry_forward_amount, compute_entitlement, days_within, leave_days, monthly_leave_summary,
    months_of_service, new_leave_request, overlaps, transition_leave,
};
pub use loan::{
    apply_repayment, approve_loan, calculate_emi, disburse_loan, monthly_rate, new_loan_request,
    reject_loan,
};
pub use migration::{migrate_structure, missing_definitions, StructureMigration};
pub use payroll_run::{
    LOAN_DEDUCTION_COMPONENT_TYPE, MAX_PAYROLL_YEAR, MIN_PAYROLL_YEAR, compute_employee_payroll,
    days_in_month, month_bounds, row_error, summarize_run, validate_period, validate_run_request,
};
pub use payslip::compute_payslip_figures;
pub use rating::{RatingInputs, calculate_rating, unknown_employee_rating};
pub use rounding::{round_money, round_to_unit};
pub use salary_components::{ResolvedComponents, resolve_components};
