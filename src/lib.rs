//! Multi-tenant payroll and employee-entitlements engine
//!
//! This crate resolves salary components, runs monthly payroll, generates
//! payslips, amortizes employee loans, tracks leave entitlements and rates
//! employee performance. All money is handled as [`rust_decimal::Decimal`]
//! and every operation is scoped to the calling tenant.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
