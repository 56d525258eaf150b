//! Loan amortization and lifecycle transitions.
//!
//! EMIs use the standard reducing-balance formula
//! `P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate, rounded
//! to the whole currency unit. A zero rate degrades to `P / n`.
//!
//! Repayments split each installment into interest on the outstanding
//! principal and a principal portion; the final installment clears whatever
//! principal is left.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use uuid::Uuid;

use crate::config::LoanTypeTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    LoanApplication, LoanRepayment, LoanRequest, LoanStatus, RepaymentOutcome, TenantId,
};

use super::payroll_run::validate_period;
use super::rounding::{round_money, round_to_unit};

/// Converts an annual percentage rate to a monthly fraction.
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / Decimal::from(1200)
}

/// Calculates the equated monthly installment of a loan.
///
/// # Errors
///
/// - [`EngineError::Computation`] if the tenure is zero or the formula overflows
/// - [`EngineError::Validation`] if the principal is not positive or the rate is negative
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_emi;
/// use rust_decimal::Decimal;
///
/// let emi = calculate_emi(Decimal::from(100_000), 12, Decimal::from(12)).unwrap();
/// assert_eq!(emi, Decimal::from(8885));
/// ```
pub fn calculate_emi(
    principal: Decimal,
    tenure_months: u32,
    annual_rate: Decimal,
) -> EngineResult<Decimal> {
    if tenure_months == 0 {
        return Err(EngineError::computation(
            "tenure_months must be greater than zero",
        ));
    }
    if principal <= Decimal::ZERO {
        return Err(EngineError::validation("amount", "must be greater than zero"));
    }
    if annual_rate < Decimal::ZERO {
        return Err(EngineError::validation(
            "interest_rate",
            "must not be negative",
        ));
    }

    let months = Decimal::from(tenure_months);
    if annual_rate.is_zero() {
        return Ok(round_to_unit(principal / months));
    }

    let rate = monthly_rate(annual_rate);
    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(tenure_months))
        .ok_or_else(|| EngineError::computation("EMI growth factor overflowed"))?;
    let emi = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or_else(|| EngineError::computation("EMI could not be computed"))?;

    Ok(round_to_unit(emi))
}

/// Builds a pending loan request from an application.
///
/// The interest rate defaults to the loan type's configured rate.
pub fn new_loan_request(
    tenant_id: &TenantId,
    application: LoanApplication,
    loan_types: &LoanTypeTable,
    now: DateTime<Utc>,
) -> EngineResult<LoanRequest> {
    if application.employee_id.trim().is_empty() {
        return Err(EngineError::validation(
            "employee_id",
            "employee id must not be empty",
        ));
    }
    let interest_rate = match application.interest_rate {
        Some(rate) => rate,
        None => loan_types.rate_for(&application.loan_type)?,
    };
    let monthly_emi = calculate_emi(
        application.amount,
        application.tenure_months,
        interest_rate,
    )?;

    Ok(LoanRequest {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.clone(),
        employee_id: application.employee_id,
        loan_type: application.loan_type,
        amount: application.amount,
        tenure_months: application.tenure_months,
        interest_rate,
        monthly_emi,
        purpose: application.purpose,
        status: LoanStatus::Pending,
        disbursed_amount: None,
        outstanding_amount: Decimal::ZERO,
        paid_emis: 0,
        remaining_emis: application.tenure_months,
        repayments: Vec::new(),
        rejection_reason: None,
        created_date: now,
        approved_date: None,
        disbursed_date: None,
        rejected_date: None,
    })
}

fn require_status(loan: &LoanRequest, expected: LoanStatus, to: LoanStatus) -> EngineResult<()> {
    if loan.status == expected {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition {
            entity: "loan",
            id: loan.id.to_string(),
            from: loan.status.to_string(),
            to: to.to_string(),
        })
    }
}

/// Approves a pending loan and initialises its repayment ledger.
///
/// The disbursed amount defaults to the requested amount. A smaller
/// disbursal recomputes the EMI on the amount actually lent.
pub fn approve_loan(
    loan: &mut LoanRequest,
    disbursed_amount: Option<Decimal>,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    require_status(loan, LoanStatus::Pending, LoanStatus::Approved)?;

    let disbursed = disbursed_amount.unwrap_or(loan.amount);
    if disbursed <= Decimal::ZERO || disbursed > loan.amount {
        return Err(EngineError::validation(
            "disbursed_amount",
            format!("must be greater than zero and at most {}", loan.amount),
        ));
    }
    if disbursed != loan.amount {
        loan.monthly_emi = calculate_emi(disbursed, loan.tenure_months, loan.interest_rate)?;
    }

    loan.status = LoanStatus::Approved;
    loan.disbursed_amount = Some(disbursed);
    loan.outstanding_amount = disbursed;
    loan.paid_emis = 0;
    loan.remaining_emis = loan.tenure_months;
    loan.approved_date = Some(now);
    Ok(())
}

/// Rejects a pending loan.
pub fn reject_loan(
    loan: &mut LoanRequest,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    require_status(loan, LoanStatus::Pending, LoanStatus::Rejected)?;
    loan.status = LoanStatus::Rejected;
    loan.rejection_reason = reason;
    loan.rejected_date = Some(now);
    Ok(())
}

/// Marks an approved loan as paid out.
pub fn disburse_loan(loan: &mut LoanRequest, now: DateTime<Utc>) -> EngineResult<()> {
    require_status(loan, LoanStatus::Approved, LoanStatus::Disbursed)?;
    loan.status = LoanStatus::Disbursed;
    loan.disbursed_date = Some(now);
    Ok(())
}

/// Applies the installment for a payroll period to a disbursed loan.
///
/// At most one repayment is recorded per (month, year); a second call for
/// the same period returns [`RepaymentOutcome::AlreadyRecorded`] and leaves
/// the loan unchanged. The loan closes when no installments remain or the
/// outstanding principal reaches zero.
pub fn apply_repayment(
    loan: &mut LoanRequest,
    month: u32,
    year: i32,
    now: DateTime<Utc>,
) -> EngineResult<RepaymentOutcome> {
    validate_period(month, year)?;
    if loan.repayment_for(month, year).is_some() {
        return Ok(RepaymentOutcome::AlreadyRecorded);
    }
    require_status(loan, LoanStatus::Disbursed, LoanStatus::Disbursed)?;
    if loan.remaining_emis == 0 || loan.outstanding_amount <= Decimal::ZERO {
        return Err(EngineError::computation(format!(
            "loan {} has nothing left to repay",
            loan.id
        )));
    }

    let interest = round_money(loan.outstanding_amount * monthly_rate(loan.interest_rate));
    let principal = if loan.remaining_emis == 1 {
        loan.outstanding_amount
    } else {
        (loan.monthly_emi - interest)
            .max(Decimal::ZERO)
            .min(loan.outstanding_amount)
    };

    loan.outstanding_amount -= principal;
    loan.paid_emis += 1;
    loan.remaining_emis -= 1;
    loan.repayments.push(LoanRepayment {
        month,
        year,
        amount: interest + principal,
        interest,
        principal,
        recorded_at: now,
    });
    if loan.remaining_emis == 0 || loan.outstanding_amount.is_zero() {
        loan.status = LoanStatus::Closed;
    }
    Ok(RepaymentOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn loan_types() -> LoanTypeTable {
        LoanTypeTable::new(HashMap::from([
            ("Personal Loan".to_string(), dec("12")),
            ("Advance Salary".to_string(), dec("0")),
        ]))
    }

    fn application(loan_type: &str, amount: &str, tenure: u32) -> LoanApplication {
        LoanApplication {
            employee_id: "emp_001".to_string(),
            loan_type: loan_type.to_string(),
            amount: dec(amount),
            tenure_months: tenure,
            interest_rate: None,
            purpose: Some("Home repair".to_string()),
        }
    }

    fn disbursed(loan_type: &str, amount: &str, tenure: u32) -> LoanRequest {
        let now = Utc::now();
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application(loan_type, amount, tenure),
            &loan_types(),
            now,
        )
        .unwrap();
        approve_loan(&mut loan, None, now).unwrap();
        disburse_loan(&mut loan, now).unwrap();
        loan
    }

    #[test]
    fn test_emi_standard_case() {
        assert_eq!(
            calculate_emi(dec("100000"), 12, dec("12")).unwrap(),
            dec("8885")
        );
    }

    #[test]
    fn test_emi_zero_rate() {
        assert_eq!(calculate_emi(dec("24000"), 12, dec("0")).unwrap(), dec("2000"));
        assert_eq!(calculate_emi(dec("25000"), 3, dec("0")).unwrap(), dec("8333"));
    }

    #[test]
    fn test_emi_zero_tenure_is_computation_error() {
        assert!(matches!(
            calculate_emi(dec("10000"), 0, dec("12")),
            Err(EngineError::Computation { .. })
        ));
    }

    #[test]
    fn test_emi_rejects_non_positive_principal() {
        assert!(matches!(
            calculate_emi(dec("0"), 12, dec("12")),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn test_new_loan_uses_loan_type_rate() {
        let loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(loan.status, LoanStatus::Pending);
        assert_eq!(loan.interest_rate, dec("12"));
        assert_eq!(loan.monthly_emi, dec("8885"));
        assert_eq!(loan.remaining_emis, 12);
    }

    #[test]
    fn test_new_loan_unknown_type_is_rejected() {
        let result = new_loan_request(
            &TenantId::new("acme"),
            application("Yacht Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_explicit_rate_overrides_type_rate() {
        let mut app = application("Personal Loan", "100000", 12);
        app.interest_rate = Some(dec("0"));
        let loan =
            new_loan_request(&TenantId::new("acme"), app, &loan_types(), Utc::now()).unwrap();
        assert_eq!(loan.monthly_emi, dec("8333"));
    }

    #[test]
    fn test_approve_initialises_ledger() {
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        )
        .unwrap();
        approve_loan(&mut loan, Some(dec("60000")), Utc::now()).unwrap();

        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(loan.outstanding_amount, dec("60000"));
        assert_eq!(loan.monthly_emi, dec("5331"));
        assert_eq!(loan.paid_emis + loan.remaining_emis, loan.tenure_months);
    }

    #[test]
    fn test_approve_rejects_disbursal_above_request() {
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        )
        .unwrap();
        assert!(approve_loan(&mut loan, Some(dec("100001")), Utc::now()).is_err());
        assert_eq!(loan.status, LoanStatus::Pending);
    }

    #[test]
    fn test_rejected_loan_cannot_be_approved() {
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        )
        .unwrap();
        reject_loan(&mut loan, Some("Budget".to_string()), Utc::now()).unwrap();

        let result = approve_loan(&mut loan, None, Utc::now());
        assert!(matches!(
            result,
            Err(EngineError::InvalidTransition { from, to, .. }) if from == "rejected" && to == "approved"
        ));
    }

    #[test]
    fn test_disburse_requires_approval() {
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            Utc::now(),
        )
        .unwrap();
        assert!(matches!(
            disburse_loan(&mut loan, Utc::now()),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_repayment_is_idempotent_per_period() {
        let mut loan = disbursed("Personal Loan", "100000", 12);

        assert_eq!(
            apply_repayment(&mut loan, 1, 2025, Utc::now()).unwrap(),
            RepaymentOutcome::Applied
        );
        let after_first = loan.clone();
        assert_eq!(
            apply_repayment(&mut loan, 1, 2025, Utc::now()).unwrap(),
            RepaymentOutcome::AlreadyRecorded
        );
        assert_eq!(loan, after_first);

        // 1% of 100000 is interest; the rest of the EMI reduces principal.
        let repayment = &loan.repayments[0];
        assert_eq!(repayment.interest, dec("1000"));
        assert_eq!(repayment.principal, dec("7885"));
        assert_eq!(loan.outstanding_amount, dec("92115"));
        assert_eq!(loan.paid_emis, 1);
        assert_eq!(loan.remaining_emis, 11);
    }

    #[test]
    fn test_loan_closes_after_final_installment() {
        let mut loan = disbursed("Advance Salary", "25000", 3);

        apply_repayment(&mut loan, 1, 2025, Utc::now()).unwrap();
        apply_repayment(&mut loan, 2, 2025, Utc::now()).unwrap();
        assert_eq!(loan.outstanding_amount, dec("8334"));
        apply_repayment(&mut loan, 3, 2025, Utc::now()).unwrap();

        assert_eq!(loan.status, LoanStatus::Closed);
        assert_eq!(loan.outstanding_amount, Decimal::ZERO);
        assert_eq!(loan.repayments[2].amount, dec("8334"));
        assert_eq!(loan.paid_emis, 3);
        assert_eq!(loan.remaining_emis, 0);

        assert!(apply_repayment(&mut loan, 4, 2025, Utc::now()).is_err());
    }

    #[test]
    fn test_full_schedule_repays_principal() {
        let mut loan = disbursed("Personal Loan", "100000", 12);
        for month in 1..=12 {
            apply_repayment(&mut loan, month, 2025, Utc::now()).unwrap();
            assert!(loan.outstanding_amount >= Decimal::ZERO);
        }
        assert_eq!(loan.status, LoanStatus::Closed);
        let principal: Decimal = loan.repayments.iter().map(|r| r.principal).sum();
        assert_eq!(principal, dec("100000"));
    }

    #[test]
    fn test_repayment_requires_disbursal() {
        let now = Utc::now();
        let mut loan = new_loan_request(
            &TenantId::new("acme"),
            application("Personal Loan", "100000", 12),
            &loan_types(),
            now,
        )
        .unwrap();
        approve_loan(&mut loan, None, now).unwrap();
        assert!(matches!(
            apply_repayment(&mut loan, 1, 2025, now),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_emi_increases_with_rate(
            principal in 1_000u32..10_000_000,
            tenure in 1u32..360,
            low in 0u32..2_000,
            step in 1u32..500,
        ) {
            let principal = Decimal::from(principal);
            let low_rate = Decimal::new(i64::from(low), 2);
            let high_rate = Decimal::new(i64::from(low + step), 2);
            let low_emi = calculate_emi(principal, tenure, low_rate).unwrap();
            let high_emi = calculate_emi(principal, tenure, high_rate).unwrap();
            prop_assert!(low_emi <= high_emi);
        }

        #[test]
        fn prop_emi_covers_principal(
            principal in 1_000u32..10_000_000,
            tenure in 1u32..360,
            rate in 0u32..3_000,
        ) {
            let principal = Decimal::from(principal);
            let emi = calculate_emi(principal, tenure, Decimal::new(i64::from(rate), 2)).unwrap();
            // Rounding to the unit can shave at most half a unit per installment.
            let paid = emi * Decimal::from(tenure);
            prop_assert!(paid + Decimal::from(tenure) >= principal);
        }
    }
}
