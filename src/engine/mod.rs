//! The payroll engine service.
//!
//! [`PayrollEngine`] ties the pure calculations to the store and the loaded
//! configuration. Every operation takes the calling tenant and works through
//! a [`TenantScope`], so no operation can read or write another tenant's data.
//! Timestamps and "today" are passed in by the caller.

mod leave;
mod loans;
mod migration;
mod payroll;
mod payslips;
mod rating;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::models::TenantId;
use crate::store::{InMemoryStore, TenantScope};

/// Entry point for every payroll, payslip, loan, leave and rating operation.
///
/// Cloning is cheap; clones share the same store and configuration.
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    store: Arc<InMemoryStore>,
    config: Arc<ConfigLoader>,
}

impl PayrollEngine {
    /// Creates an engine over a store and a loaded configuration.
    pub fn new(store: Arc<InMemoryStore>, config: Arc<ConfigLoader>) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// A store handle confined to `tenant`.
    pub fn scope(&self, tenant: &TenantId) -> TenantScope<'_> {
        self.store.scope(tenant.clone())
    }
}
