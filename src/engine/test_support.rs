//! Fixtures shared by the engine tests.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::config::ConfigLoader;
use crate::models::{
    Employee, EmployeeStatus, LegacySalaryFields, SalaryStructure, TenantId,
};
use crate::store::InMemoryStore;

use super::PayrollEngine;

pub(crate) fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

pub(crate) fn acme() -> TenantId {
    TenantId::new("acme")
}

pub(crate) fn globex() -> TenantId {
    TenantId::new("globex")
}

pub(crate) fn engine() -> PayrollEngine {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    PayrollEngine::new(Arc::new(InMemoryStore::new()), Arc::new(config))
}

pub(crate) fn legacy_employee(tenant: &TenantId, id: &str, basic: &str, hra: &str) -> Employee {
    Employee {
        id: id.to_string(),
        tenant_id: tenant.clone(),
        name: format!("Employee {}", id),
        status: EmployeeStatus::Active,
        date_of_joining: Some(date(2024, 1, 1)),
        custom_casual_leave_per_month: None,
        custom_sick_leave_per_year: None,
        custom_annual_leave_per_year: None,
        salary: SalaryStructure::legacy(LegacySalaryFields {
            basic: dec(basic),
            hra: dec(hra),
            employee_pf: dec("1800"),
            ..Default::default()
        }),
    }
}

/// An engine with two acme employees (one inactive) and one globex employee.
pub(crate) fn seeded_engine() -> PayrollEngine {
    let engine = engine();
    let acme_scope = engine.scope(&acme());
    acme_scope
        .save_employee(legacy_employee(&acme(), "emp_001", "30000", "12000"))
        .unwrap();
    acme_scope
        .save_employee(legacy_employee(&acme(), "emp_002", "20000", "8000"))
        .unwrap();
    let mut inactive = legacy_employee(&acme(), "emp_003", "25000", "10000");
    inactive.status = EmployeeStatus::Inactive;
    acme_scope.save_employee(inactive).unwrap();

    engine
        .scope(&globex())
        .save_employee(legacy_employee(&globex(), "gx_001", "50000", "20000"))
        .unwrap();
    engine
}
