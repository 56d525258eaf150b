//! Legacy salary migration.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::calculation::{migrate_structure, missing_definitions, StructureMigration};
use crate::error::EngineResult;
use crate::models::{MigrationReport, TenantId};

use super::PayrollEngine;

impl PayrollEngine {
    /// Migrates one tenant's legacy salary structures to catalog assignments.
    ///
    /// Seeds the catalog entries the legacy mapping needs, then converts
    /// every employee still on the legacy path. Safe to re-run: seeded
    /// entries and already migrated employees are left alone. Employees paid
    /// a component whose catalog entry is disabled stay on the legacy path
    /// and are counted as blocked.
    pub fn migrate_salary_structure(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> EngineResult<MigrationReport> {
        let scope = self.scope(tenant);
        let mappings = self.config.legacy_mappings();
        let mut report = MigrationReport {
            tenants_processed: 1,
            ..Default::default()
        };

        for definition in missing_definitions(tenant, mappings, &scope.salary_components(), now) {
            scope.insert_component(definition)?;
            report.definitions_created += 1;
        }

        let catalog = scope.salary_components();
        for mut employee in scope.employees() {
            match migrate_structure(&employee.salary, mappings, &catalog) {
                StructureMigration::Migrated(structure) => {
                    report.assignments_created += structure.components.len();
                    report.employees_migrated += 1;
                    employee.salary = structure;
                    scope.save_employee(employee)?;
                }
                StructureMigration::Blocked { component_types } => {
                    warn!(
                        tenant_id = %tenant,
                        employee_id = %employee.id,
                        component_types = ?component_types,
                        "Employee kept on legacy salary: catalog components disabled"
                    );
                    report.employees_blocked += 1;
                }
                StructureMigration::Unchanged => report.employees_skipped += 1,
            }
        }

        info!(
            tenant_id = %tenant,
            definitions_created = report.definitions_created,
            employees_migrated = report.employees_migrated,
            assignments_created = report.assignments_created,
            employees_skipped = report.employees_skipped,
            employees_blocked = report.employees_blocked,
            "Salary structure migration completed"
        );
        Ok(report)
    }

    /// Runs the migration for every tenant in the store.
    pub fn migrate_all_tenants(&self, now: DateTime<Utc>) -> EngineResult<MigrationReport> {
        let mut total = MigrationReport::default();
        for tenant in self.store.tenants() {
            let report = self.migrate_salary_structure(&tenant, now)?;
            total.tenants_processed += report.tenants_processed;
            total.definitions_created += report.definitions_created;
            total.employees_migrated += report.employees_migrated;
            total.assignments_created += report.assignments_created;
            total.employees_skipped += report.employees_skipped;
            total.employees_blocked += report.employees_blocked;
        }
        Ok(total)
    }
}
