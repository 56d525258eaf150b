//! Tenant-scoped persistence for the payroll engine.
//!
//! The engine reads and writes the logical collections (`salary_components`,
//! `employees`, `payroll_runs`, `payslips`, `loan_requests`,
//! `leave_requests`, `leave_balances`) and reads the collaborator-owned
//! `attendance`, `late_arrivals` and `ot_logs`. All access is confined to a
//! single tenant through [`TenantScope`].

mod memory;
mod scope;

pub use memory::InMemoryStore;
pub use scope::TenantScope;
