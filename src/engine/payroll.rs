//! Payroll runs.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    compute_employee_payroll, days_in_month, resolve_components, row_error, summarize_run,
    validate_run_request,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeePayrollBreakdown, PayrollRunRecord, PayrollRunRequest, RowError, TenantId,
};

use super::PayrollEngine;

impl PayrollEngine {
    /// Runs payroll for a month and persists the run summary.
    ///
    /// The request is validated as a whole first; any malformed field or an
    /// employee id owned by another tenant rejects the run before anything
    /// is computed. Unknown employees and rows whose salary cannot be
    /// resolved become row errors while the rest of the batch completes.
    /// Payslips are not written.
    pub fn run_payroll(
        &self,
        tenant: &TenantId,
        request: PayrollRunRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<PayrollRunRecord> {
        validate_run_request(&request)?;
        let scope = self.scope(tenant);
        let days = days_in_month(request.month, request.year)?;

        let mut employees = Vec::with_capacity(request.rows.len());
        for row in &request.rows {
            match scope.employee(&row.employee_id) {
                Ok(employee) => employees.push(Ok(employee)),
                Err(error @ EngineError::NotFound { .. }) => employees.push(Err(error)),
                Err(error) => {
                    warn!(
                        tenant_id = %tenant,
                        employee_id = %row.employee_id,
                        error = %error,
                        "Payroll run rejected"
                    );
                    return Err(error);
                }
            }
        }

        let catalog = scope.salary_components();
        let mappings = self.config.legacy_mappings();

        let outcomes: Vec<Result<EmployeePayrollBreakdown, RowError>> = request
            .rows
            .par_iter()
            .zip(employees.par_iter())
            .enumerate()
            .map(|(index, (row, employee))| {
                let employee = employee
                    .as_ref()
                    .map_err(|error| row_error(index, &row.employee_id, error))?;
                resolve_components(employee, &catalog, mappings, 1)
                    .and_then(|resolved| compute_employee_payroll(employee, resolved, row, days))
                    .map_err(|error| row_error(index, &row.employee_id, &error))
            })
            .collect();

        for outcome in &outcomes {
            match outcome {
                Ok(breakdown) => debug!(
                    tenant_id = %tenant,
                    employee_id = %breakdown.employee_id,
                    gross = %breakdown.gross,
                    net = %breakdown.net,
                    "Payroll row computed"
                ),
                Err(error) => warn!(
                    tenant_id = %tenant,
                    employee_id = %error.employee_id,
                    row_index = error.row_index,
                    code = %error.code,
                    "Payroll row failed: {}",
                    error.message
                ),
            }
        }

        let summary = summarize_run(request.month, request.year, outcomes);
        let record = PayrollRunRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant.clone(),
            processed_at: now,
            summary,
        };
        scope.insert_payroll_run(record.clone());

        info!(
            tenant_id = %tenant,
            run_id = %record.id,
            month = record.summary.month,
            year = record.summary.year,
            employees = record.summary.total_employees,
            errors = record.summary.errors.len(),
            total_net = %record.summary.total_net,
            "Payroll run completed"
        );
        Ok(record)
    }

    /// Lists the tenant's stored payroll runs, oldest first.
    pub fn payroll_runs(&self, tenant: &TenantId) -> Vec<PayrollRunRecord> {
        self.scope(tenant).payroll_runs()
    }
}
