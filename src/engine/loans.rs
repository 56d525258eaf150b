//! Loan lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{
    apply_repayment, approve_loan, disburse_loan, new_loan_request, reject_loan,
};
use crate::error::EngineResult;
use crate::models::{LoanApplication, LoanRequest, RepaymentOutcome, TenantId};

use super::PayrollEngine;

impl PayrollEngine {
    /// Creates a pending loan request for an employee of the tenant.
    pub fn create_loan(
        &self,
        tenant: &TenantId,
        application: LoanApplication,
        now: DateTime<Utc>,
    ) -> EngineResult<LoanRequest> {
        let scope = self.scope(tenant);
        scope.employee(&application.employee_id)?;

        let loan = new_loan_request(tenant, application, self.config.loan_types(), now)?;
        scope.insert_loan(loan.clone());

        info!(
            tenant_id = %tenant,
            loan_id = %loan.id,
            employee_id = %loan.employee_id,
            loan_type = %loan.loan_type,
            amount = %loan.amount,
            monthly_emi = %loan.monthly_emi,
            "Loan requested"
        );
        Ok(loan)
    }

    /// Gets a loan by id.
    pub fn loan(&self, tenant: &TenantId, loan_id: Uuid) -> EngineResult<LoanRequest> {
        self.scope(tenant).loan(loan_id)
    }

    /// Lists an employee's loans.
    pub fn loans_for(&self, tenant: &TenantId, employee_id: &str) -> Vec<LoanRequest> {
        self.scope(tenant).loans_for(employee_id)
    }

    /// Approves a pending loan.
    pub fn approve_loan(
        &self,
        tenant: &TenantId,
        loan_id: Uuid,
        disbursed_amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> EngineResult<LoanRequest> {
        self.update_loan(tenant, loan_id, "approved", |loan| {
            approve_loan(loan, disbursed_amount, now)
        })
    }

    /// Rejects a pending loan.
    pub fn reject_loan(
        &self,
        tenant: &TenantId,
        loan_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LoanRequest> {
        self.update_loan(tenant, loan_id, "rejected", |loan| {
            reject_loan(loan, reason, now)
        })
    }

    /// Marks an approved loan as disbursed.
    pub fn disburse_loan(
        &self,
        tenant: &TenantId,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<LoanRequest> {
        self.update_loan(tenant, loan_id, "disbursed", |loan| disburse_loan(loan, now))
    }

    /// Records the installment of a payroll period against a disbursed loan.
    ///
    /// Recording the same period twice leaves the loan unchanged.
    pub fn record_repayment(
        &self,
        tenant: &TenantId,
        loan_id: Uuid,
        month: u32,
        year: i32,
        now: DateTime<Utc>,
    ) -> EngineResult<(LoanRequest, RepaymentOutcome)> {
        let (loan, outcome) = self
            .scope(tenant)
            .update_loan(loan_id, |loan| apply_repayment(loan, month, year, now))?;

        info!(
            tenant_id = %tenant,
            loan_id = %loan.id,
            month,
            year,
            outcome = ?outcome,
            outstanding = %loan.outstanding_amount,
            remaining_emis = loan.remaining_emis,
            "Loan repayment recorded"
        );
        Ok((loan, outcome))
    }

    fn update_loan<F>(
        &self,
        tenant: &TenantId,
        loan_id: Uuid,
        action: &str,
        apply: F,
    ) -> EngineResult<LoanRequest>
    where
        F: FnOnce(&mut LoanRequest) -> EngineResult<()>,
    {
        let (loan, ()) = self.scope(tenant).update_loan(loan_id, apply)?;

        info!(
            tenant_id = %tenant,
            loan_id = %loan.id,
            status = %loan.status,
            "Loan {}",
            action
        );
        Ok(loan)
    }
}
