//! Leave requests, entitlements and the year-end carry-forward.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    carry_forward_amount, compute_entitlement, days_within, month_bounds, monthly_leave_summary,
    new_leave_request, overlaps, transition_leave, validate_period,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CarryForwardSummary, LeaveApplication, LeaveBalance, LeaveEntitlementResponse, LeaveRequest,
    LeaveStatus, LeaveTransition, MonthlyLeaveSummary, TenantId,
};

use super::PayrollEngine;

impl PayrollEngine {
    /// Computes an employee's leave entitlement as of a date.
    ///
    /// Read-only; carried-forward leave comes from the stored balance of the
    /// `as_of` year. Use [`PayrollEngine::refresh_leave_balance`] to persist
    /// the result.
    pub fn leave_entitlement(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        as_of: NaiveDate,
    ) -> EngineResult<LeaveEntitlementResponse> {
        let scope = self.scope(tenant);
        let employee = scope.employee(employee_id)?;
        let carried_forward = scope
            .leave_balance(employee_id, as_of.year())
            .map_or(Decimal::ZERO, |b| b.carried_forward_leaves);

        Ok(compute_entitlement(
            &employee,
            &scope.leave_requests_for(employee_id),
            carried_forward,
            self.config.leave_policy(),
            as_of,
        ))
    }

    /// Re-evaluates an employee's entitlement as of a date and stores it as
    /// the balance of that year. Carried-forward leave is kept.
    pub fn refresh_leave_balance(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        as_of: NaiveDate,
    ) -> EngineResult<LeaveBalance> {
        let entitlement = self.leave_entitlement(tenant, employee_id, as_of)?;
        let scope = self.scope(tenant);
        let mut balance = scope
            .leave_balance(employee_id, entitlement.year)
            .unwrap_or_else(|| LeaveBalance::empty(tenant.clone(), employee_id, entitlement.year));

        balance.casual_accrued = entitlement.casual_leave_accrued;
        balance.casual_used = entitlement.casual_leave_used;
        balance.casual_balance = entitlement.casual_leave_balance;
        balance.sick_total = entitlement.sick_leave_total;
        balance.sick_used = entitlement.sick_leave_used;
        balance.sick_balance = entitlement.sick_leave_balance;
        balance.last_accrual_date = Some(as_of);
        scope.put_leave_balance(balance.clone());

        info!(
            tenant_id = %tenant,
            employee_id,
            year = balance.year,
            casual_balance = %balance.casual_balance,
            sick_balance = %balance.sick_balance,
            "Leave balance refreshed"
        );
        Ok(balance)
    }

    /// Summarises approved leave per employee for a month.
    ///
    /// Only employees with approved leave overlapping the month appear.
    pub fn approved_leaves_by_month(
        &self,
        tenant: &TenantId,
        month: u32,
        year: i32,
    ) -> EngineResult<BTreeMap<String, MonthlyLeaveSummary>> {
        let (first, last) = month_bounds(month, year)?;
        let scope = self.scope(tenant);

        let mut by_employee: BTreeMap<String, Vec<LeaveRequest>> = BTreeMap::new();
        for request in scope.leave_requests() {
            if request.status == LeaveStatus::Approved
                && days_within(&request, first, last) > Decimal::ZERO
            {
                by_employee
                    .entry(request.employee_id.clone())
                    .or_default()
                    .push(request);
            }
        }

        let policy = self.config.leave_policy();
        by_employee
            .into_iter()
            .map(|(employee_id, requests)| {
                let employee = scope.employee(&employee_id).ok();
                let refs: Vec<&LeaveRequest> = requests.iter().collect();
                monthly_leave_summary(employee.as_ref(), &refs, policy, month, year)
                    .map(|summary| (employee_id, summary))
            })
            .collect()
    }

    /// Files a pending leave request.
    ///
    /// Rejects requests overlapping another pending or approved request of
    /// the same employee.
    pub fn create_leave_request(
        &self,
        tenant: &TenantId,
        application: LeaveApplication,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        let scope = self.scope(tenant);
        scope.employee(&application.employee_id)?;

        let request = new_leave_request(tenant, application, now)?;
        scope.insert_leave_request(request.clone(), |existing, new| {
            matches!(existing.status, LeaveStatus::Pending | LeaveStatus::Approved)
                && overlaps(existing, new)
        })?;
        info!(
            tenant_id = %tenant,
            leave_id = %request.id,
            employee_id = %request.employee_id,
            days = %request.days,
            "Leave requested"
        );
        Ok(request)
    }

    /// Approves a pending leave request.
    pub fn approve_leave(
        &self,
        tenant: &TenantId,
        leave_id: Uuid,
        actor: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        self.update_leave_status(tenant, leave_id, LeaveStatus::Approved, actor, reason, now)
    }

    /// Rejects a pending leave request.
    pub fn reject_leave(
        &self,
        tenant: &TenantId,
        leave_id: Uuid,
        actor: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        self.update_leave_status(tenant, leave_id, LeaveStatus::Rejected, actor, reason, now)
    }

    /// Cancels a pending or approved leave request.
    pub fn cancel_leave(
        &self,
        tenant: &TenantId,
        leave_id: Uuid,
        actor: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        self.update_leave_status(tenant, leave_id, LeaveStatus::Cancelled, actor, reason, now)
    }

    fn update_leave_status(
        &self,
        tenant: &TenantId,
        leave_id: Uuid,
        to: LeaveStatus,
        actor: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> EngineResult<LeaveRequest> {
        if actor.trim().is_empty() {
            return Err(EngineError::validation("actor", "actor must not be empty"));
        }
        let transition = LeaveTransition {
            actor: actor.to_string(),
            at: now,
            reason,
        };
        let (request, from) = self.scope(tenant).update_leave_request(leave_id, |request| {
            let from = request.status;
            transition_leave(request, to, transition)?;
            Ok(from)
        })?;

        info!(
            tenant_id = %tenant,
            leave_id = %leave_id,
            from = %from,
            to = %to,
            actor,
            "Leave request updated"
        );
        Ok(request)
    }

    /// Carries each active employee's unused casual leave into the next year,
    /// capped by policy. Re-running for the same year overwrites the same
    /// values.
    pub fn carry_forward(
        &self,
        tenant: &TenantId,
        from_year: i32,
    ) -> EngineResult<CarryForwardSummary> {
        validate_period(12, from_year)?;
        validate_period(1, from_year + 1)?;
        let year_end = NaiveDate::from_ymd_opt(from_year, 12, 31)
            .ok_or_else(|| EngineError::validation("from_year", "invalid year"))?;
        let scope = self.scope(tenant);
        let policy = self.config.leave_policy();

        let mut summary = CarryForwardSummary {
            from_year,
            to_year: from_year + 1,
            employees_processed: 0,
            total_carried: Decimal::ZERO,
        };
        for employee in scope.employees().into_iter().filter(|e| e.is_active()) {
            let carried_in = scope
                .leave_balance(&employee.id, from_year)
                .map_or(Decimal::ZERO, |b| b.carried_forward_leaves);
            let entitlement = compute_entitlement(
                &employee,
                &scope.leave_requests_for(&employee.id),
                carried_in,
                policy,
                year_end,
            );
            let carried = carry_forward_amount(entitlement.casual_leave_balance, policy);

            let mut next = scope
                .leave_balance(&employee.id, from_year + 1)
                .unwrap_or_else(|| LeaveBalance::empty(tenant.clone(), &employee.id, from_year + 1));
            next.carried_forward_leaves = carried;
            scope.put_leave_balance(next);

            summary.employees_processed += 1;
            summary.total_carried += carried;
        }

        if summary.employees_processed == 0 {
            warn!(tenant_id = %tenant, from_year, "Carry-forward found no active employees");
        }
        info!(
            tenant_id = %tenant,
            from_year,
            employees = summary.employees_processed,
            total_carried = %summary.total_carried,
            "Leave carry-forward completed"
        );
        Ok(summary)
    }
}
