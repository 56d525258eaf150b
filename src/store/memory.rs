//! In-memory storage of all engine collections.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::models::{
    AttendanceRecord, Employee, LateArrival, LeaveBalance, LeaveRequest, LoanRequest,
    OvertimeLog, PayrollRunRecord, Payslip, SalaryComponentDefinition, TenantId,
};

use super::TenantScope;

/// Unique key of a payslip: (tenant, employee, month, year).
pub(crate) type PayslipKey = (TenantId, String, u32, i32);

/// Unique key of a leave balance: (tenant, employee, year).
pub(crate) type LeaveBalanceKey = (TenantId, String, i32);

/// The logical collections.
#[derive(Debug, Default)]
pub(crate) struct Collections {
    pub(crate) salary_components: HashMap<Uuid, SalaryComponentDefinition>,
    pub(crate) employees: BTreeMap<String, Employee>,
    pub(crate) payroll_runs: Vec<PayrollRunRecord>,
    pub(crate) payslips: HashMap<Uuid, Payslip>,
    pub(crate) payslip_index: HashMap<PayslipKey, Uuid>,
    pub(crate) loan_requests: HashMap<Uuid, LoanRequest>,
    pub(crate) leave_requests: HashMap<Uuid, LeaveRequest>,
    pub(crate) leave_balances: HashMap<LeaveBalanceKey, LeaveBalance>,
    pub(crate) attendance: Vec<AttendanceRecord>,
    pub(crate) late_arrivals: Vec<LateArrival>,
    pub(crate) ot_logs: Vec<OvertimeLog>,
}

/// Thread-safe in-memory store.
///
/// All access goes through a [`TenantScope`], obtained with [`InMemoryStore::scope`].
/// A single lock guards every collection, so compound operations such as the
/// payslip upsert are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Collections>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle through which all reads and writes are confined to `tenant`.
    pub fn scope(&self, tenant: TenantId) -> TenantScope<'_> {
        TenantScope::new(self, tenant)
    }

    /// Lists every tenant that owns employees or catalog entries.
    pub fn tenants(&self) -> Vec<TenantId> {
        let data = self.read();
        let tenants: BTreeSet<TenantId> = data
            .employees
            .values()
            .map(|e| e.tenant_id.clone())
            .chain(
                data.salary_components
                    .values()
                    .map(|c| c.tenant_id.clone()),
            )
            .collect();
        tenants.into_iter().collect()
    }

    // Every mutation is a single insert, replace or retain, so the data behind
    // a poisoned lock is still consistent.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}
