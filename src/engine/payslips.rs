//! Payslip generation and maintenance.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{compute_payslip_figures, resolve_components, validate_period};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DeleteSummary, Employee, Payslip, PayslipDraft, PayslipGenerationSummary, PayslipStatus,
    SkippedEmployee, TenantId, UpsertOutcome,
};

use super::PayrollEngine;

impl PayrollEngine {
    /// Generates or refreshes payslips for a month.
    ///
    /// Without `employee_ids` every active employee is included. An explicit
    /// list overrides the status filter; ids that do not exist are skipped
    /// and counted, ids owned by another tenant reject the whole call.
    /// Payslips are upserted on (employee, month, year), so calling this
    /// twice overwrites instead of duplicating.
    pub fn generate_payslips(
        &self,
        tenant: &TenantId,
        month: u32,
        year: i32,
        employee_ids: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> EngineResult<PayslipGenerationSummary> {
        validate_period(month, year)?;
        let scope = self.scope(tenant);
        let mut summary = PayslipGenerationSummary::default();

        let candidates: Vec<Employee> = match employee_ids {
            Some(ids) => {
                let mut seen = HashSet::new();
                let mut found = Vec::new();
                for id in ids.into_iter().filter(|id| seen.insert(id.clone())) {
                    match scope.employee(&id) {
                        Ok(employee) => found.push(employee),
                        Err(EngineError::NotFound { .. }) => summary.skipped.push(SkippedEmployee {
                            employee_id: id,
                            reason: "employee not found".to_string(),
                        }),
                        Err(error) => return Err(error),
                    }
                }
                found
            }
            None => scope
                .employees()
                .into_iter()
                .filter(Employee::is_active)
                .collect(),
        };
        summary.total_employees = candidates.len() + summary.skipped.len();

        let catalog = scope.salary_components();
        let mappings = self.config.legacy_mappings();
        let drafts: Vec<Result<PayslipDraft, SkippedEmployee>> = candidates
            .par_iter()
            .map(|employee| {
                resolve_components(employee, &catalog, mappings, 1)
                    .map(|resolved| PayslipDraft {
                        employee_id: employee.id.clone(),
                        employee_name: employee.name.clone(),
                        month,
                        year,
                        figures: compute_payslip_figures(&resolved),
                    })
                    .map_err(|error| SkippedEmployee {
                        employee_id: employee.id.clone(),
                        reason: error.to_string(),
                    })
            })
            .collect();

        for draft in drafts {
            let draft = match draft {
                Ok(draft) => draft,
                Err(skipped) => {
                    summary.skipped.push(skipped);
                    continue;
                }
            };
            // The employee may have been removed while the batch was computing.
            if scope.employee(&draft.employee_id).is_err() {
                summary.skipped.push(SkippedEmployee {
                    employee_id: draft.employee_id,
                    reason: "employee no longer exists".to_string(),
                });
                continue;
            }
            match scope.upsert_payslip(draft, now).1 {
                UpsertOutcome::Inserted => summary.generated_count += 1,
                UpsertOutcome::Updated => summary.updated_count += 1,
            }
        }
        summary.skipped_count = summary.skipped.len();

        for skipped in &summary.skipped {
            warn!(
                tenant_id = %tenant,
                employee_id = %skipped.employee_id,
                "Payslip skipped: {}",
                skipped.reason
            );
        }
        info!(
            tenant_id = %tenant,
            month,
            year,
            generated = summary.generated_count,
            updated = summary.updated_count,
            skipped = summary.skipped_count,
            total = summary.total_employees,
            "Payslip generation completed"
        );
        Ok(summary)
    }

    /// Recomputes one payslip in place from the employee's current salary.
    pub fn regenerate_payslip(
        &self,
        tenant: &TenantId,
        payslip_id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<Payslip> {
        let scope = self.scope(tenant);
        let mut payslip = scope.payslip(payslip_id)?;
        let employee = scope.employee(&payslip.employee_id)?;
        let resolved = resolve_components(
            &employee,
            &scope.salary_components(),
            self.config.legacy_mappings(),
            1,
        )?;

        payslip.employee_name = employee.name;
        payslip.figures = compute_payslip_figures(&resolved);
        payslip.status = PayslipStatus::Regenerated;
        payslip.updated_date = Some(now);
        scope.save_payslip(payslip.clone())?;

        info!(
            tenant_id = %tenant,
            payslip_id = %payslip.id,
            employee_id = %payslip.employee_id,
            net = %payslip.figures.net_salary,
            "Payslip regenerated"
        );
        Ok(payslip)
    }

    /// Deletes one payslip.
    pub fn delete_payslip(&self, tenant: &TenantId, payslip_id: Uuid) -> EngineResult<Payslip> {
        let removed = self.scope(tenant).delete_payslip(payslip_id)?;
        info!(tenant_id = %tenant, payslip_id = %payslip_id, "Payslip deleted");
        Ok(removed)
    }

    /// Deletes every payslip of the tenant.
    pub fn delete_all_payslips(&self, tenant: &TenantId) -> DeleteSummary {
        let deleted_count = self.scope(tenant).delete_all_payslips();
        info!(tenant_id = %tenant, deleted_count, "All payslips deleted");
        DeleteSummary { deleted_count }
    }

    /// Lists the tenant's payslips, optionally filtered by month and year.
    pub fn payslips(&self, tenant: &TenantId, month: Option<u32>, year: Option<i32>) -> Vec<Payslip> {
        self.scope(tenant).payslips(month, year)
    }
}
