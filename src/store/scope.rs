//! Tenant-confined access to the store.
//!
//! Every by-id lookup distinguishes a record that does not exist
//! ([`EngineError::NotFound`]) from one that exists under another tenant
//! ([`EngineError::Forbidden`]). Listing operations only ever see the
//! scope's own tenant.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, ComponentCategory, Employee, LateArrival, LeaveBalance, LeaveRequest,
    LoanRequest, OvertimeLog, OvertimeStatus, PayrollRunRecord, Payslip, PayslipDraft,
    PayslipStatus, SalaryComponentDefinition, TenantId, Tenanted, UpsertOutcome,
};

use super::InMemoryStore;

/// A view of the store confined to one tenant.
#[derive(Debug, Clone)]
pub struct TenantScope<'a> {
    store: &'a InMemoryStore,
    tenant: TenantId,
}

/// Resolves a by-id lookup against the scope's tenant.
fn owned<'r, T: Tenanted>(
    tenant: &TenantId,
    record: Option<&'r T>,
    entity: &'static str,
    id: &str,
) -> EngineResult<&'r T> {
    match record {
        None => Err(EngineError::NotFound {
            entity,
            id: id.to_string(),
        }),
        Some(record) if record.tenant_id() != tenant => Err(EngineError::Forbidden {
            entity,
            id: id.to_string(),
        }),
        Some(record) => Ok(record),
    }
}

/// Fails if a record with the same key already belongs to another tenant.
fn not_foreign<T: Tenanted>(
    tenant: &TenantId,
    existing: Option<&T>,
    entity: &'static str,
    id: &str,
) -> EngineResult<()> {
    match existing {
        Some(record) if record.tenant_id() != tenant => Err(EngineError::Forbidden {
            entity,
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}

fn in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date <= end
}

impl<'a> TenantScope<'a> {
    pub(crate) fn new(store: &'a InMemoryStore, tenant: TenantId) -> Self {
        Self { store, tenant }
    }

    /// The tenant this scope is confined to.
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    // ---------------------------------------------------------------------
    // Employees
    // ---------------------------------------------------------------------

    /// Gets an employee by id.
    pub fn employee(&self, id: &str) -> EngineResult<Employee> {
        let data = self.store.read();
        owned(&self.tenant, data.employees.get(id), "employee", id).cloned()
    }

    /// Lists the tenant's employees ordered by id.
    pub fn employees(&self) -> Vec<Employee> {
        let data = self.store.read();
        data.employees
            .values()
            .filter(|e| e.tenant_id == self.tenant)
            .cloned()
            .collect()
    }

    /// Inserts or replaces an employee, stamping it with the scope's tenant.
    pub fn save_employee(&self, mut employee: Employee) -> EngineResult<()> {
        let mut data = self.store.write();
        not_foreign(
            &self.tenant,
            data.employees.get(&employee.id),
            "employee",
            &employee.id,
        )?;
        employee.tenant_id = self.tenant.clone();
        data.employees.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Removes an employee.
    pub fn remove_employee(&self, id: &str) -> EngineResult<Employee> {
        let mut data = self.store.write();
        owned(&self.tenant, data.employees.get(id), "employee", id)?;
        data.employees.remove(id).ok_or_else(|| EngineError::NotFound {
            entity: "employee",
            id: id.to_string(),
        })
    }

    // ---------------------------------------------------------------------
    // Salary component catalog
    // ---------------------------------------------------------------------

    /// Lists the tenant's catalog, active and disabled.
    pub fn salary_components(&self) -> Vec<SalaryComponentDefinition> {
        let data = self.store.read();
        let mut components: Vec<_> = data
            .salary_components
            .values()
            .filter(|c| c.tenant_id == self.tenant)
            .cloned()
            .collect();
        components.sort_by(|a, b| a.created_date.cmp(&b.created_date).then(a.id.cmp(&b.id)));
        components
    }

    /// Finds the catalog entry for a (category, component type) pair.
    pub fn find_component(
        &self,
        category: ComponentCategory,
        component_type: &str,
    ) -> Option<SalaryComponentDefinition> {
        let data = self.store.read();
        data.salary_components
            .values()
            .find(|c| {
                c.tenant_id == self.tenant
                    && c.category == category
                    && c.component_type == component_type
            })
            .cloned()
    }

    /// Gets a catalog entry by id.
    pub fn component(&self, id: Uuid) -> EngineResult<SalaryComponentDefinition> {
        let data = self.store.read();
        owned(
            &self.tenant,
            data.salary_components.get(&id),
            "salary component",
            &id.to_string(),
        )
        .cloned()
    }

    /// Adds a catalog entry. (category, component type) must be unique per tenant.
    pub fn insert_component(&self, mut component: SalaryComponentDefinition) -> EngineResult<()> {
        let mut data = self.store.write();
        not_foreign(
            &self.tenant,
            data.salary_components.get(&component.id),
            "salary component",
            &component.id.to_string(),
        )?;
        let duplicate = data.salary_components.values().any(|c| {
            c.tenant_id == self.tenant
                && c.id != component.id
                && c.category == component.category
                && c.component_type == component.component_type
        });
        if duplicate {
            return Err(EngineError::validation(
                "component_type",
                format!(
                    "a {} component of type '{}' already exists",
                    component.category, component.component_type
                ),
            ));
        }
        component.tenant_id = self.tenant.clone();
        data.salary_components.insert(component.id, component);
        Ok(())
    }

    /// Enables or disables a catalog entry. Definitions are never deleted.
    pub fn set_component_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> EngineResult<SalaryComponentDefinition> {
        let mut data = self.store.write();
        owned(
            &self.tenant,
            data.salary_components.get(&id),
            "salary component",
            &id.to_string(),
        )?;
        let component = data
            .salary_components
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "salary component",
                id: id.to_string(),
            })?;
        component.is_active = is_active;
        component.updated_date = Some(now);
        Ok(component.clone())
    }

    // ---------------------------------------------------------------------
    // Payroll runs
    // ---------------------------------------------------------------------

    /// Persists a payroll run summary.
    pub fn insert_payroll_run(&self, mut record: PayrollRunRecord) {
        record.tenant_id = self.tenant.clone();
        self.store.write().payroll_runs.push(record);
    }

    /// Lists the tenant's payroll runs, oldest first.
    pub fn payroll_runs(&self) -> Vec<PayrollRunRecord> {
        let data = self.store.read();
        data.payroll_runs
            .iter()
            .filter(|r| r.tenant_id == self.tenant)
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Payslips
    // ---------------------------------------------------------------------

    /// Inserts or overwrites the payslip for (employee, month, year).
    ///
    /// The existence check and the write happen under one lock, so two
    /// concurrent upserts for the same key never produce two documents.
    pub fn upsert_payslip(
        &self,
        draft: PayslipDraft,
        now: DateTime<Utc>,
    ) -> (Payslip, UpsertOutcome) {
        let mut data = self.store.write();
        let key = (
            self.tenant.clone(),
            draft.employee_id.clone(),
            draft.month,
            draft.year,
        );

        let existing = data.payslip_index.get(&key).copied();
        if let Some(id) = existing {
            if let Some(payslip) = data.payslips.get_mut(&id) {
                payslip.employee_name = draft.employee_name;
                payslip.figures = draft.figures;
                payslip.status = PayslipStatus::Generated;
                payslip.updated_date = Some(now);
                return (payslip.clone(), UpsertOutcome::Updated);
            }
        }

        let payslip = Payslip {
            id: Uuid::new_v4(),
            tenant_id: self.tenant.clone(),
            employee_id: draft.employee_id,
            employee_name: draft.employee_name,
            month: draft.month,
            year: draft.year,
            figures: draft.figures,
            status: PayslipStatus::Generated,
            generated_date: now,
            updated_date: None,
        };
        data.payslip_index.insert(key, payslip.id);
        data.payslips.insert(payslip.id, payslip.clone());
        (payslip, UpsertOutcome::Inserted)
    }

    /// Gets a payslip by id.
    pub fn payslip(&self, id: Uuid) -> EngineResult<Payslip> {
        let data = self.store.read();
        owned(&self.tenant, data.payslips.get(&id), "payslip", &id.to_string()).cloned()
    }

    /// Replaces an existing payslip in place.
    pub fn save_payslip(&self, payslip: Payslip) -> EngineResult<()> {
        let mut data = self.store.write();
        owned(
            &self.tenant,
            data.payslips.get(&payslip.id),
            "payslip",
            &payslip.id.to_string(),
        )?;
        data.payslips.insert(payslip.id, payslip);
        Ok(())
    }

    /// Deletes one payslip.
    pub fn delete_payslip(&self, id: Uuid) -> EngineResult<Payslip> {
        let mut data = self.store.write();
        owned(&self.tenant, data.payslips.get(&id), "payslip", &id.to_string())?;
        let payslip = data
            .payslips
            .remove(&id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "payslip",
                id: id.to_string(),
            })?;
        data.payslip_index.remove(&(
            payslip.tenant_id.clone(),
            payslip.employee_id.clone(),
            payslip.month,
            payslip.year,
        ));
        Ok(payslip)
    }

    /// Deletes every payslip of the tenant and returns how many were removed.
    pub fn delete_all_payslips(&self) -> usize {
        let mut data = self.store.write();
        let before = data.payslips.len();
        let tenant = &self.tenant;
        data.payslips.retain(|_, p| &p.tenant_id != tenant);
        data.payslip_index.retain(|(t, ..), _| t != tenant);
        before - data.payslips.len()
    }

    /// Lists payslips, optionally filtered by month and year.
    pub fn payslips(&self, month: Option<u32>, year: Option<i32>) -> Vec<Payslip> {
        let data = self.store.read();
        let mut payslips: Vec<_> = data
            .payslips
            .values()
            .filter(|p| p.tenant_id == self.tenant)
            .filter(|p| month.is_none_or(|m| p.month == m))
            .filter(|p| year.is_none_or(|y| p.year == y))
            .cloned()
            .collect();
        payslips.sort_by(|a, b| {
            (a.year, a.month, &a.employee_id).cmp(&(b.year, b.month, &b.employee_id))
        });
        payslips
    }

    // ---------------------------------------------------------------------
    // Loans
    // ---------------------------------------------------------------------

    /// Persists a new loan request.
    pub fn insert_loan(&self, mut loan: LoanRequest) {
        loan.tenant_id = self.tenant.clone();
        self.store.write().loan_requests.insert(loan.id, loan);
    }

    /// Gets a loan request by id.
    pub fn loan(&self, id: Uuid) -> EngineResult<LoanRequest> {
        let data = self.store.read();
        owned(&self.tenant, data.loan_requests.get(&id), "loan", &id.to_string()).cloned()
    }

    /// Changes a loan in place.
    ///
    /// The lookup, the change and the write share one write lock, so
    /// concurrent updates of the same loan apply one after the other. When
    /// `apply` fails the stored loan is left as it was.
    pub fn update_loan<T, F>(&self, id: Uuid, apply: F) -> EngineResult<(LoanRequest, T)>
    where
        F: FnOnce(&mut LoanRequest) -> EngineResult<T>,
    {
        let mut data = self.store.write();
        let mut loan =
            owned(&self.tenant, data.loan_requests.get(&id), "loan", &id.to_string())?.clone();
        let value = apply(&mut loan)?;
        data.loan_requests.insert(id, loan.clone());
        Ok((loan, value))
    }

    /// Lists an employee's loans, oldest first.
    pub fn loans_for(&self, employee_id: &str) -> Vec<LoanRequest> {
        let data = self.store.read();
        let mut loans: Vec<_> = data
            .loan_requests
            .values()
            .filter(|l| l.tenant_id == self.tenant && l.employee_id == employee_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.created_date);
        loans
    }

    // ---------------------------------------------------------------------
    // Leave
    // ---------------------------------------------------------------------

    /// Persists a new leave request unless it clashes with another request
    /// of the same employee. The check and the insert share one write lock.
    pub fn insert_leave_request<F>(&self, mut request: LeaveRequest, clashes: F) -> EngineResult<()>
    where
        F: Fn(&LeaveRequest, &LeaveRequest) -> bool,
    {
        let mut data = self.store.write();
        request.tenant_id = self.tenant.clone();
        let clash = data
            .leave_requests
            .values()
            .filter(|r| r.tenant_id == self.tenant && r.employee_id == request.employee_id)
            .find(|r| clashes(r, &request));
        if let Some(existing) = clash {
            return Err(EngineError::validation(
                "start_date",
                format!("overlaps leave request {}", existing.id),
            ));
        }
        data.leave_requests.insert(request.id, request);
        Ok(())
    }

    /// Changes a leave request in place under one write lock. When `apply`
    /// fails the stored request is left as it was.
    pub fn update_leave_request<T, F>(&self, id: Uuid, apply: F) -> EngineResult<(LeaveRequest, T)>
    where
        F: FnOnce(&mut LeaveRequest) -> EngineResult<T>,
    {
        let mut data = self.store.write();
        let mut request = owned(
            &self.tenant,
            data.leave_requests.get(&id),
            "leave request",
            &id.to_string(),
        )?
        .clone();
        let value = apply(&mut request)?;
        data.leave_requests.insert(id, request.clone());
        Ok((request, value))
    }

    /// Lists the tenant's leave requests ordered by start date.
    pub fn leave_requests(&self) -> Vec<LeaveRequest> {
        let data = self.store.read();
        let mut requests: Vec<_> = data
            .leave_requests
            .values()
            .filter(|r| r.tenant_id == self.tenant)
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            (a.start_date, &a.employee_id, a.id).cmp(&(b.start_date, &b.employee_id, b.id))
        });
        requests
    }

    /// Lists one employee's leave requests ordered by start date.
    pub fn leave_requests_for(&self, employee_id: &str) -> Vec<LeaveRequest> {
        self.leave_requests()
            .into_iter()
            .filter(|r| r.employee_id == employee_id)
            .collect()
    }

    /// Gets the stored leave balance of an employee for a year.
    pub fn leave_balance(&self, employee_id: &str, year: i32) -> Option<LeaveBalance> {
        let data = self.store.read();
        data.leave_balances
            .get(&(self.tenant.clone(), employee_id.to_string(), year))
            .cloned()
    }

    /// Inserts or replaces a leave balance.
    pub fn put_leave_balance(&self, mut balance: LeaveBalance) {
        balance.tenant_id = self.tenant.clone();
        let key = (
            self.tenant.clone(),
            balance.employee_id.clone(),
            balance.year,
        );
        self.store.write().leave_balances.insert(key, balance);
    }

    // ---------------------------------------------------------------------
    // Attendance signals (read-only inputs owned by collaborators)
    // ---------------------------------------------------------------------

    /// Records a late arrival.
    pub fn insert_late_arrival(&self, mut record: LateArrival) {
        record.tenant_id = self.tenant.clone();
        self.store.write().late_arrivals.push(record);
    }

    /// Records an overtime log.
    pub fn insert_ot_log(&self, mut record: OvertimeLog) {
        record.tenant_id = self.tenant.clone();
        self.store.write().ot_logs.push(record);
    }

    /// Records a daily attendance entry.
    pub fn insert_attendance(&self, mut record: AttendanceRecord) {
        record.tenant_id = self.tenant.clone();
        self.store.write().attendance.push(record);
    }

    /// Counts late arrivals of an employee within an inclusive date range.
    pub fn late_arrival_count(&self, employee_id: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        let data = self.store.read();
        let count = data
            .late_arrivals
            .iter()
            .filter(|r| {
                r.tenant_id == self.tenant
                    && r.employee_id == employee_id
                    && in_range(r.date, start, end)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Sums approved overtime hours of an employee within an inclusive date range.
    pub fn approved_ot_hours(&self, employee_id: &str, start: NaiveDate, end: NaiveDate) -> Decimal {
        let data = self.store.read();
        data.ot_logs
            .iter()
            .filter(|r| {
                r.tenant_id == self.tenant
                    && r.employee_id == employee_id
                    && r.status == OvertimeStatus::Approved
                    && in_range(r.date, start, end)
            })
            .map(|r| r.hours)
            .sum()
    }

    /// Counts days an employee was present within an inclusive date range.
    pub fn attendance_days(&self, employee_id: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        let data = self.store.read();
        let count = data
            .attendance
            .iter()
            .filter(|r| {
                r.tenant_id == self.tenant
                    && r.employee_id == employee_id
                    && r.present
                    && in_range(r.date, start, end)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
