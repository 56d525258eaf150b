//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod employee;
mod leave;
mod loan;
mod payroll_run;
mod payslip;
mod salary_component;
mod tenant;

pub use attendance::{
    AttendanceRecord, LateArrival, OvertimeLog, OvertimeStatus, RatingDetails, RatingResult,
};
pub use audit::AuditStep;
pub use employee::{
    Employee, EmployeeStatus, LegacyField, LegacySalaryFields, SalaryComponentAssignment,
    SalaryRepresentation, SalaryStructure,
};
pub use leave::{
    CarryForwardSummary, LeaveApplication, LeaveBalance, LeaveEntitlementResponse, LeaveRequest,
    LeaveStatus, LeaveTransition, LeaveType, MonthlyLeaveSummary,
};
pub use loan::{LoanApplication, LoanRepayment, LoanRequest, LoanStatus, RepaymentOutcome};
pub use payroll_run::{
    EmployeePayrollBreakdown, PayrollRunRecord, PayrollRunRequest, PayrollRunRow, RowError,
    RunSummary,
};
pub use payslip::{
    DeleteSummary, Payslip, PayslipDraft, PayslipFigures, PayslipGenerationSummary,
    PayslipStatus, SkippedEmployee, UpsertOutcome,
};
pub use salary_component::{
    BASIC_COMPONENT_TYPE, CalculationMode, ComponentCategory, LineItem, MigrationReport,
    SalaryComponentDefinition,
};
pub use tenant::{TenantId, Tenanted};
